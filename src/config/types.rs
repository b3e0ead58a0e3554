//! Configuration types, defaults, loading, and validation.

use super::credentials::CredentialSource;
use super::provider::{ProviderConfig, parse_flag};
use crate::envelope::Family;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix for per-provider environment overrides:
/// `PROVIDER_HUB__<FAMILY>__<PROVIDER>__<KEY>`
const PROVIDER_ENV_PREFIX: &str = "PROVIDER_HUB__";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// AI completion providers
    #[serde(default)]
    pub ai: FamilyConfig,

    /// Messaging providers
    #[serde(default)]
    pub chat_api: FamilyConfig,

    /// Ad metrics providers
    #[serde(default)]
    pub ads: FamilyConfig,
}

/// One provider family: the default provider name plus per-provider tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Provider used when a call names none
    #[serde(default)]
    pub default: Option<String>,

    /// `[<family>.providers.<name>]` tables
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,

    /// Log to file (rotated daily)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One config file as written on disk. Unlike [`Config`], absent logging
/// fields stay `None` so a later file only overrides what it sets.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    logging: LoggingOverlay,
    #[serde(default)]
    ai: FamilyConfig,
    #[serde(default)]
    chat_api: FamilyConfig,
    #[serde(default)]
    ads: FamilyConfig,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingOverlay {
    level: Option<String>,
    json: Option<bool>,
    file: Option<PathBuf>,
}

impl ConfigFile {
    fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Provider table keys are matched the way orchestrators name providers
fn provider_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// `keys.toml`: credentials kept apart from `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
struct KeysFile {
    #[serde(default)]
    ai: BTreeMap<String, ProviderConfig>,
    #[serde(default)]
    chat_api: BTreeMap<String, ProviderConfig>,
    #[serde(default)]
    ads: BTreeMap<String, ProviderConfig>,
}

/// Expand leading `~` or `~/` in a path to the actual home directory.
fn expand_tilde(p: &Path) -> PathBuf {
    if let Ok(rest) = p.strip_prefix("~") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        p.to_path_buf()
    }
}

/// Base directory: `~/.provider-hub/`
pub fn provider_hub_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".provider-hub")
}

/// Get path to keys.toml - separate file for provider credentials
pub fn keys_path() -> PathBuf {
    provider_hub_home().join("keys.toml")
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.provider-hub/config.toml
    /// 3. Local config: ./provider-hub.toml
    /// 4. Credentials: ~/.provider-hub/keys.toml
    /// 5. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        let system_config_path = Self::system_config_path();
        if system_config_path.exists() {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::merge_from_file(config, &system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::merge_from_file(config, &local_config_path)?;
        }

        let keys_path = keys_path();
        if keys_path.exists() {
            config.merge_keys_from_file(&keys_path)?;
        }

        config.apply_env_overrides(std::env::vars());
        config.logging.file = config.logging.file.as_deref().map(expand_tilde);

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Custom config file (specified path)
    /// 3. Environment variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        let mut config = Self::merge_from_file(Self::default(), path)?;

        config.apply_env_overrides(std::env::vars());
        config.logging.file = config.logging.file.as_deref().map(expand_tilde);

        tracing::debug!("Configuration loaded successfully from custom path");
        Ok(config)
    }

    /// Parse a TOML document (no file system, no environment)
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file = ConfigFile::parse(contents).context("Failed to parse config")?;
        Ok(Self::merge(Self::default(), file))
    }

    /// Get the system config path: ~/.provider-hub/config.toml
    pub fn system_config_path() -> PathBuf {
        provider_hub_home().join("config.toml")
    }

    /// Get the local config path: ./provider-hub.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./provider-hub.toml")
    }

    /// Load and merge configuration from a TOML file
    fn merge_from_file(base: Self, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let file_config = ConfigFile::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(Self::merge(base, file_config))
    }

    /// Overlay a later config file. Values present in `overlay` win;
    /// provider tables merge key by key so a local file can override a
    /// single value.
    fn merge(mut base: Self, overlay: ConfigFile) -> Self {
        let logging = overlay.logging;
        if let Some(level) = logging.level {
            base.logging.level = level;
        }
        if let Some(json) = logging.json {
            base.logging.json = json;
        }
        if logging.file.is_some() {
            base.logging.file = logging.file;
        }
        for (family, section) in [
            (Family::Ai, overlay.ai),
            (Family::ChatApi, overlay.chat_api),
            (Family::Ads, overlay.ads),
        ] {
            let target = base.family_mut(family);
            if section.default.is_some() {
                target.default = section.default;
            }
            for (name, provider) in section.providers {
                target
                    .providers
                    .entry(provider_key(&name))
                    .or_default()
                    .merge(&provider);
            }
        }
        base
    }

    /// Merge credentials from keys.toml (overrides config.toml values)
    fn merge_keys_from_file(&mut self, path: &Path) -> Result<()> {
        tracing::debug!("Loading keys from: {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read keys file: {:?}", path))?;
        let keys: KeysFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse keys file: {:?}", path))?;

        for (family, providers) in [
            (Family::Ai, keys.ai),
            (Family::ChatApi, keys.chat_api),
            (Family::Ads, keys.ads),
        ] {
            let target = self.family_mut(family);
            for (name, provider) in providers {
                target
                    .providers
                    .entry(provider_key(&name))
                    .or_default()
                    .merge(&provider);
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides from `vars`
    pub fn apply_env_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "PROVIDER_HUB_LOG_LEVEL" => self.logging.level = value,
                "PROVIDER_HUB_LOG_FILE" => self.logging.file = Some(PathBuf::from(value)),
                "PROVIDER_HUB_LOG_JSON" => match parse_flag(&value) {
                    Some(json) => self.logging.json = json,
                    None => tracing::warn!("Ignoring PROVIDER_HUB_LOG_JSON={:?}: not a boolean", value),
                },
                "PROVIDER_HUB_DEFAULT_AI" => self.ai.default = Some(value),
                "PROVIDER_HUB_DEFAULT_CHAT_API" => self.chat_api.default = Some(value),
                "PROVIDER_HUB_DEFAULT_ADS" => self.ads.default = Some(value),
                _ => {
                    if let Some(rest) = key.strip_prefix(PROVIDER_ENV_PREFIX) {
                        self.apply_provider_env(rest, value);
                    }
                }
            }
        }
    }

    /// `AI__OPENAI__API_KEY=sk-...` -> `[ai.providers.openai] api_key`
    fn apply_provider_env(&mut self, path: &str, value: String) {
        let parts: Vec<&str> = path.splitn(3, "__").collect();
        let [family, provider, field] = parts.as_slice() else {
            tracing::warn!("Ignoring malformed provider override: {}{}", PROVIDER_ENV_PREFIX, path);
            return;
        };
        let family = match family.to_ascii_lowercase().as_str() {
            "ai" => Family::Ai,
            "chat_api" => Family::ChatApi,
            "ads" => Family::Ads,
            other => {
                tracing::warn!("Ignoring provider override for unknown family: {}", other);
                return;
            }
        };
        self.family_mut(family)
            .providers
            .entry(provider_key(provider))
            .or_default()
            .set(field.to_ascii_lowercase(), value);
    }

    pub fn family(&self, family: Family) -> &FamilyConfig {
        match family {
            Family::Ai => &self.ai,
            Family::ChatApi => &self.chat_api,
            Family::Ads => &self.ads,
        }
    }

    pub fn family_mut(&mut self, family: Family) -> &mut FamilyConfig {
        match family {
            Family::Ai => &mut self.ai,
            Family::ChatApi => &mut self.chat_api,
            Family::Ads => &mut self.ads,
        }
    }

    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        for family in [Family::Ai, Family::ChatApi, Family::Ads] {
            if let Some(default) = &self.family(family).default
                && default.trim().is_empty()
            {
                anyhow::bail!("Default provider for [{}] is empty", family);
            }
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file. Credentials are not written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}

impl CredentialSource for Config {
    fn credentials(&self, family: Family, name: &str) -> Option<ProviderConfig> {
        let providers = &self.family(family).providers;
        providers
            .get(name)
            .or_else(|| {
                providers
                    .iter()
                    .find(|(key, _)| key.trim().eq_ignore_ascii_case(name.trim()))
                    .map(|(_, provider)| provider)
            })
            .cloned()
    }
}
