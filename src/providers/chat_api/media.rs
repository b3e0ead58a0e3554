//! Media classification from URLs.

use serde::Serialize;
use std::fmt;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "webm", "mkv", "3gp"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "oga", "m4a", "aac", "opus", "flac", "amr"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Text,
    Image,
    Video,
    Audio,
    Document,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Text => "text",
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
            MediaType::Document => "document",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path of `url` without query string or fragment
fn path_of(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Last path segment of `url`, if it is not empty
pub fn file_name_of(url: &str) -> Option<&str> {
    let path = path_of(url.trim());
    let name = match path.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p)?.rsplit('/').next()?,
        None => path.rsplit('/').next()?,
    };
    (!name.is_empty()).then_some(name)
}

/// Lower-cased extension of the last path segment
pub fn extension_of(url: &str) -> Option<String> {
    let path = path_of(url.trim());
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = segment.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Classify `url` by extension: empty is `Text`, unknown is `Document`.
pub fn detect_media_type(url: &str) -> MediaType {
    if url.trim().is_empty() {
        return MediaType::Text;
    }
    match extension_of(url) {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => MediaType::Image,
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaType::Video,
        Some(ext) if AUDIO_EXTENSIONS.contains(&ext.as_str()) => MediaType::Audio,
        _ => MediaType::Document,
    }
}

pub fn get_mime_type(extension: &str) -> &'static str {
    match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "3gp" => "video/3gpp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "opus" => "audio/opus",
        "flac" => "audio/flac",
        "amr" => "audio/amr",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// What the messaging vendor needs to know about an outgoing attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaDescriptor {
    pub media_type: MediaType,
    pub mime_type: String,
    pub filename: String,
}

impl MediaDescriptor {
    /// Describe `url`. Audio gets a generated `{name|audio}-{unix}.{ext}`
    /// filename; other media keep `filename`, else the URL's last segment.
    pub fn from_url(url: &str, filename: Option<&str>, unix_time: i64) -> Self {
        let media_type = detect_media_type(url);
        let ext = extension_of(url);
        let mime_type = ext
            .as_deref()
            .map(get_mime_type)
            .unwrap_or("application/octet-stream")
            .to_string();

        let filename = match media_type {
            MediaType::Text => String::new(),
            MediaType::Audio => {
                let stem = filename
                    .map(|f| f.rsplit_once('.').map(|(s, _)| s).unwrap_or(f).trim())
                    .filter(|s| !s.is_empty())
                    .unwrap_or("audio");
                format!("{}-{}.{}", stem, unix_time, ext.as_deref().unwrap_or("mp3"))
            }
            _ => filename
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .or_else(|| file_name_of(url).map(str::to_string))
                .unwrap_or_else(|| match &ext {
                    Some(ext) => format!("file.{}", ext),
                    None => "file".to_string(),
                }),
        };

        Self {
            media_type,
            mime_type,
            filename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.jpg", MediaType::Image)]
    #[case("a.mp4", MediaType::Video)]
    #[case("a.mp3", MediaType::Audio)]
    #[case("a.pdf", MediaType::Document)]
    #[case("", MediaType::Text)]
    #[case("a.xyz", MediaType::Document)]
    #[case("https://cdn.test/photos/IMG.JPEG?size=large#top", MediaType::Image)]
    #[case("https://cdn.test/voice.opus", MediaType::Audio)]
    #[case("https://cdn.test/clip.3gp", MediaType::Video)]
    #[case("https://cdn.test/download", MediaType::Document)]
    fn test_detect_media_type(#[case] url: &str, #[case] expected: MediaType) {
        assert_eq!(detect_media_type(url), expected);
    }

    #[rstest]
    #[case("jpg", "image/jpeg")]
    #[case(".PNG", "image/png")]
    #[case("ogg", "audio/ogg")]
    #[case("pdf", "application/pdf")]
    #[case("weird", "application/octet-stream")]
    fn test_get_mime_type(#[case] ext: &str, #[case] expected: &str) {
        assert_eq!(get_mime_type(ext), expected);
    }

    #[test]
    fn test_extension_of_ignores_dotted_hosts() {
        assert_eq!(extension_of("https://cdn.example.com/file"), None);
        assert_eq!(extension_of("https://cdn.example.com/a.b/c.PDF"), Some("pdf".into()));
    }

    #[test]
    fn test_audio_descriptor_generates_filename() {
        let d = MediaDescriptor::from_url("https://cdn.test/v/note.ogg", Some("greeting.wav"), 1700000000);
        assert_eq!(d.media_type, MediaType::Audio);
        assert_eq!(d.mime_type, "audio/ogg");
        assert_eq!(d.filename, "greeting-1700000000.ogg");

        let d = MediaDescriptor::from_url("https://cdn.test/v/note.mp3", None, 42);
        assert_eq!(d.filename, "audio-42.mp3");
    }

    #[test]
    fn test_document_descriptor_uses_url_name() {
        let d = MediaDescriptor::from_url("https://cdn.test/files/report.pdf?x=1", None, 1);
        assert_eq!(d.media_type, MediaType::Document);
        assert_eq!(d.mime_type, "application/pdf");
        assert_eq!(d.filename, "report.pdf");

        let d = MediaDescriptor::from_url("https://cdn.test/files/report.pdf", Some("Q3.pdf"), 1);
        assert_eq!(d.filename, "Q3.pdf");
    }
}
