//! TOML-based application configuration.
//!
//! Stores:
//! - Daily reflection target
//! - Rhythm lookback window
//! - Dashboard fetch settings
//! - Chat companion endpoint, model and persona
//!
//! Configuration is stored at `~/.config/stillwater/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::reflection::DEFAULT_DAILY_TARGET;
use crate::rhythm::DEFAULT_LOOKBACK_DAYS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionConfig {
    #[serde(default = "default_daily_target")]
    pub daily_target: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhythmConfig {
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Entries fetched per refresh.
    #[serde(default = "default_recent_entry_limit")]
    pub recent_entry_limit: usize,
    /// How long a refresh waits for the user identity before giving up quietly.
    #[serde(default = "default_user_retry_delay_ms")]
    pub user_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    /// Prior messages sent along with each request.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/stillwater/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reflection: ReflectionConfig,
    #[serde(default)]
    pub rhythm: RhythmConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

fn default_daily_target() -> u32 {
    DEFAULT_DAILY_TARGET
}
fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}
fn default_recent_entry_limit() -> usize {
    100
}
fn default_user_retry_delay_ms() -> u64 {
    500
}
fn default_chat_base_url() -> String {
    "https://api.openai.com/v1/".into()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn default_max_history() -> usize {
    20
}
fn default_system_prompt() -> String {
    indoc::indoc! {"
        You are a warm, steady journaling companion. Listen first, reflect back
        what you hear, and ask at most one gentle question at a time. Keep
        replies short. You are not a therapist; if someone mentions being in
        danger, encourage them to contact local emergency services.
    "}
    .trim()
    .to_string()
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            daily_target: default_daily_target(),
        }
    }
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_entry_limit: default_recent_entry_limit(),
            user_retry_delay_ms: default_user_retry_delay_ms(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_base_url(),
            model: default_chat_model(),
            max_history: default_max_history(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("not a leaf value".into()));
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value in memory by dot-separated key. Does not persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.reflection.daily_target, 4);
        assert_eq!(parsed.rhythm.lookback_days, 7);
        assert_eq!(parsed.chat.system_prompt, cfg.chat.system_prompt);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[chat]\nmodel = \"local\"\n").unwrap();
        assert_eq!(parsed.chat.model, "local");
        assert_eq!(parsed.chat.max_history, 20);
        assert_eq!(parsed.dashboard.user_retry_delay_ms, 500);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("reflection.daily_target").as_deref(), Some("4"));
        assert_eq!(cfg.get("chat.model").as_deref(), Some("gpt-4o-mini"));
        assert!(cfg.get("chat.missing_key").is_none());
    }

    #[test]
    fn set_updates_number_and_string() {
        let mut cfg = Config::default();
        cfg.set("dashboard.recent_entry_limit", "50").unwrap();
        cfg.set("chat.base_url", "http://localhost:8080/v1/").unwrap();
        assert_eq!(cfg.dashboard.recent_entry_limit, 50);
        assert_eq!(cfg.chat.base_url, "http://localhost:8080/v1/");
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_number() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("chat.nonexistent", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("reflection.daily_target", "four"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(cfg.set("chat", "x"), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.reflection.daily_target, 4);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.set("reflection.daily_target", "6").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().reflection.daily_target, 6);
    }
}
