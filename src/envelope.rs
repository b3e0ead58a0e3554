//! Uniform response envelope
//!
//! Every provider operation returns exactly one [`Envelope`]. Callers branch
//! on [`Envelope::success`], never on `Err`.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Provider families sharing one capability contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Ai,
    ChatApi,
    Ads,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Ai => "ai",
            Family::ChatApi => "chat_api",
            Family::Ads => "ads",
        }
    }

    /// JSON key naming the source provider in this family's envelopes.
    pub fn tag_key(&self) -> &'static str {
        match self {
            Family::ChatApi => "api",
            Family::Ai | Family::Ads => "provider",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RESERVED_KEYS: &[&str] = &["success", "provider", "api", "timestamp", "error", "error_code"];

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub family: Family,
    /// Name of the provider that produced this envelope
    pub source: String,
    /// Unix seconds
    pub timestamp: i64,
    pub error: Option<String>,
    pub error_code: Option<String>,
    /// Family-specific fields (response, message_id, totals, ...)
    pub data: Map<String, Value>,
}

impl Envelope {
    /// Build a success envelope. Object fields of `data` are merged in;
    /// reserved keys are dropped, any other value lands under `data`.
    pub fn ok(family: Family, source: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            family,
            source: source.into(),
            timestamp: chrono::Utc::now().timestamp(),
            error: None,
            error_code: None,
            data: merge_fields(data),
        }
    }

    /// Build an error envelope. An empty message is replaced so `error` is
    /// never blank.
    pub fn err(
        family: Family,
        source: impl Into<String>,
        message: impl Into<String>,
        code: Option<&str>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "Unknown error".to_string();
        }
        Self {
            success: false,
            family,
            source: source.into(),
            timestamp: chrono::Utc::now().timestamp(),
            error: Some(message),
            error_code: code.map(str::to_string),
            data: Map::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Flat JSON representation, as handed to API responses.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("success".into(), Value::Bool(self.success));
        out.insert(
            self.family.tag_key().into(),
            Value::String(self.source.clone()),
        );
        out.insert("timestamp".into(), Value::from(self.timestamp));
        if let Some(error) = &self.error {
            out.insert("error".into(), Value::String(error.clone()));
        }
        if let Some(code) = &self.error_code {
            out.insert("error_code".into(), Value::String(code.clone()));
        }
        for (k, v) in &self.data {
            out.insert(k.clone(), v.clone());
        }
        Value::Object(out)
    }
}

impl Serialize for Envelope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

fn merge_fields(data: Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map
            .into_iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .collect(),
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".into(), other);
            map
        }
    }
}
