//! Per-provider configuration map
//!
//! A [`ProviderConfig`] is the flat key/value table handed to a provider at
//! construction: credential (under one of several aliases), instance
//! identifier, base URL and vendor flags. It is never mutated once a
//! provider owns it.

use super::secrets::SecretString;
use crate::utils::{is_sensitive_key, redact_vendor_body};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfig {
    values: BTreeMap<String, Value>,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Trimmed, non-empty string value. Numbers are accepted and rendered.
    pub fn get_str(&self, key: &str) -> Option<String> {
        let raw = match self.values.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!raw.is_empty()).then_some(raw)
    }

    /// Boolean flag; `"true"`, `"1"`, `"yes"` and `"on"` count as true.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            Value::String(s) => parse_flag(s),
            _ => None,
        }
    }

    /// Unsigned integer; numeric strings accepted.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.values.get(key)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// First non-empty value among `keys`, wrapped as a secret.
    pub fn first_secret(&self, keys: &[&str]) -> Option<SecretString> {
        keys.iter()
            .filter_map(|k| self.get_str(k))
            .map(SecretString::new)
            .find(|s| !s.is_empty())
    }

    /// First non-empty plain value among `keys`.
    pub fn first_str(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.get_str(k))
    }

    /// Overlay `other` on top of `self`. Blank strings in `other` never
    /// replace an existing value.
    pub fn merge(&mut self, other: &ProviderConfig) {
        for (k, v) in &other.values {
            if matches!(v, Value::String(s) if s.trim().is_empty()) && self.values.contains_key(k)
            {
                continue;
            }
            self.values.insert(k.clone(), v.clone());
        }
    }

    fn as_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProviderConfig({})", redact_vendor_body(&self.as_json()))
    }
}

/// Credentials are left out entirely; they belong in `keys.toml` or the
/// environment, never in a saved `config.toml`.
impl Serialize for ProviderConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let public: BTreeMap<&String, &Value> = self
            .values
            .iter()
            .filter(|(k, _)| !is_sensitive_key(k))
            .collect();
        public.serialize(serializer)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ProviderConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = ProviderConfig::new();
        for (k, v) in iter {
            config.set(k, v);
        }
        config
    }
}

/// Loose boolean parsing shared by config values and environment flags
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_secret_skips_blank_aliases() {
        let config = ProviderConfig::new()
            .with("credential_value", "  ")
            .with("api_key", "sk-real")
            .with("openai_api_key", "sk-other");
        let secret = config
            .first_secret(&["credential_value", "api_key", "openai_api_key"])
            .unwrap();
        assert_eq!(secret.expose_secret(), "sk-real");
    }

    #[test]
    fn test_first_secret_none_when_all_empty() {
        let config = ProviderConfig::new().with("api_key", "");
        assert!(config.first_secret(&["credential_value", "api_key"]).is_none());
    }

    #[test]
    fn test_typed_getters() {
        let config = ProviderConfig::new()
            .with("latency_ms", "250")
            .with("simulate_error", "yes")
            .with("instance", 42);
        assert_eq!(config.get_u64("latency_ms"), Some(250));
        assert_eq!(config.get_bool("simulate_error"), Some(true));
        assert_eq!(config.get_str("instance").as_deref(), Some("42"));
        assert_eq!(config.get_bool("missing"), None);
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = ProviderConfig::new()
            .with("apikey", "evo-secret")
            .with("instance", "main");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("evo-secret"));
        assert!(printed.contains("main"));
    }

    #[test]
    fn test_serialize_omits_credentials() {
        let config = ProviderConfig::new()
            .with("api_key", "sk-live")
            .with("base_url", "https://api.openai.com/v1");
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value, json!({"base_url": "https://api.openai.com/v1"}));
    }

    #[test]
    fn test_merge_keeps_existing_on_blank() {
        let mut base = ProviderConfig::new().with("api_key", "sk-1").with("model", "a");
        let overlay = ProviderConfig::new().with("api_key", " ").with("model", "b");
        base.merge(&overlay);
        assert_eq!(base.get_str("api_key").as_deref(), Some("sk-1"));
        assert_eq!(base.get_str("model").as_deref(), Some("b"));
    }
}
