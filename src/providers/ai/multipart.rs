//! Hand-built `multipart/form-data` bodies for transcription uploads.

use crate::http::RequestBody;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone)]
enum Part {
    File {
        name: String,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
    Field {
        name: String,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    /// New body with a random `----ProviderHubBoundary<hex>` boundary
    pub fn new() -> Self {
        Self::with_boundary(format!(
            "----ProviderHubBoundary{}",
            uuid::Uuid::new_v4().simple()
        ))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(Part::File {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serialise parts in insertion order, closed by the final boundary.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{}", self.boundary).as_bytes());
            out.extend_from_slice(CRLF);
            match part {
                Part::File {
                    name,
                    filename,
                    content_type,
                    bytes,
                } => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                            name, filename
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(format!("Content-Type: {}", content_type).as_bytes());
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(bytes);
                }
                Part::Field { name, value } => {
                    out.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"", name).as_bytes(),
                    );
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(value.as_bytes());
                }
            }
            out.extend_from_slice(CRLF);
        }
        out.extend_from_slice(format!("--{}--", self.boundary).as_bytes());
        out.extend_from_slice(CRLF);
        out
    }

    pub fn into_request_body(self) -> RequestBody {
        RequestBody::Raw {
            content_type: self.content_type(),
            bytes: self.to_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_file_then_model() {
        let body = MultipartBody::with_boundary("XYZ")
            .file("file", "voice.ogg", "audio/ogg", b"OGG".to_vec())
            .field("model", "whisper-1");

        let expected = "--XYZ\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"voice.ogg\"\r\n\
Content-Type: audio/ogg\r\n\
\r\n\
OGG\r\n\
--XYZ\r\n\
Content-Disposition: form-data; name=\"model\"\r\n\
\r\n\
whisper-1\r\n\
--XYZ--\r\n";
        assert_eq!(String::from_utf8(body.to_bytes()).unwrap(), expected);
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn test_random_boundary_prefix() {
        let a = MultipartBody::new();
        let b = MultipartBody::new();
        assert!(a.boundary().starts_with("----ProviderHubBoundary"));
        assert_eq!(a.boundary().len(), "----ProviderHubBoundary".len() + 32);
        assert_ne!(a.boundary(), b.boundary());
    }

    #[test]
    fn test_into_request_body() {
        let body = MultipartBody::with_boundary("B").field("model", "m");
        match body.into_request_body() {
            RequestBody::Raw { content_type, bytes } => {
                assert_eq!(content_type, "multipart/form-data; boundary=B");
                assert!(bytes.ends_with(b"--B--\r\n"));
            }
            other => panic!("expected raw body, got {:?}", other),
        }
    }
}
