//! SirenHub configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SirenError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SirenConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_log_level() -> String { "info".into() }

impl Default for SirenConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            sms: SmsConfig::default(),
            scheduler: SchedulerConfig::default(),
            dispatch: DispatchConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl SirenConfig {
    /// Load config from the default path (~/.sirenhub/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SirenError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SirenError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| SirenError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the SirenHub home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sirenhub")
    }
}

/// SMS gateway configuration (HTTP API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    #[serde(default = "default_sms_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_campaign_id")]
    pub campaign_id: String,
    #[serde(default = "default_route_id")]
    pub route_id: String,
    #[serde(default = "default_sender_id")]
    pub sender_id: String,
    /// Per-send timeout; a slow gateway counts as a failed send.
    #[serde(default = "default_sms_timeout")]
    pub timeout_secs: u64,
}

fn default_sms_url() -> String { "https://sms.kaichogroup.com/smsapi/index.php".into() }
fn default_campaign_id() -> String { "9148".into() }
fn default_route_id() -> String { "130".into() }
fn default_sender_id() -> String { "SMSBit".into() }
fn default_sms_timeout() -> u64 { 30 }

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_url: default_sms_url(),
            api_key: String::new(),
            campaign_id: default_campaign_id(),
            route_id: default_route_id(),
            sender_id: default_sender_id(),
            timeout_secs: default_sms_timeout(),
        }
    }
}

/// Deferred-task scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Prefer the durable SQLite queue; false forces the in-process fallback.
    #[serde(default = "bool_true")]
    pub durable: bool,
    #[serde(default = "default_queue_path")]
    pub queue_path: String,
    /// Worker poll interval for ready tasks.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

fn bool_true() -> bool { true }
fn default_queue_path() -> String { "~/.sirenhub/queue.db".into() }
fn default_tick_secs() -> u64 { 5 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            durable: true,
            queue_path: default_queue_path(),
            tick_secs: default_tick_secs(),
        }
    }
}

/// Dispatch behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Append a Google Maps directions link to contact messages.
    #[serde(default)]
    pub maps_link: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { maps_link: false }
    }
}

/// File-backed store and spool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding contacts.json and buzzers.json.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Outbox directory watched for incoming alert-event files.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: String,
    /// Spool poll interval.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

fn default_data_dir() -> String { "~/.sirenhub".into() }
fn default_spool_dir() -> String { "~/.sirenhub/spool".into() }
fn default_poll_secs() -> u64 { 2 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            spool_dir: default_spool_dir(),
            poll_secs: default_poll_secs(),
        }
    }
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_path(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        PathBuf::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SirenConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.sms.timeout_secs, 30);
        assert!(config.scheduler.durable);
        assert!(!config.dispatch.maps_link);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
            log_level = "debug"

            [sms]
            api_key = "K123"

            [scheduler]
            durable = false
        "#;
        let config: SirenConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.sms.api_key, "K123");
        assert_eq!(config.sms.sender_id, "SMSBit");
        assert!(!config.scheduler.durable);
        assert_eq!(config.scheduler.tick_secs, 5);
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/tmp/x"), PathBuf::from("/tmp/x"));
        assert!(expand_path("~/queue.db").ends_with("queue.db"));
    }
}
