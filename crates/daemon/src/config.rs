//! Daemon configuration management
//!
//! Runtime knobs only: log level, hostname hint, queue sizing, transmit
//! readiness policy. Network addressing is not configurable; it is the
//! compile-time wire contract in `frame::lease`.

use anyhow::{Context, Result};
use bridge::BridgeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub daemon: DaemonSettings,
    #[serde(default)]
    pub relay: RelaySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonSettings {
    pub log_level: String,
    /// Hostname hint advertised with the gadget identity.
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    #[serde(default = "RelaySettings::default_queue_capacity")]
    pub tx_queue_capacity: usize,
    #[serde(default = "RelaySettings::default_queue_capacity")]
    pub rx_queue_capacity: usize,
    /// Transmit readiness re-check interval in milliseconds.
    #[serde(default = "RelaySettings::default_readiness_poll_ms")]
    pub readiness_poll_ms: u64,
    /// Upper bound on the per-frame readiness wait in milliseconds.
    #[serde(default = "RelaySettings::default_readiness_timeout_ms")]
    pub readiness_timeout_ms: u64,
}

impl RelaySettings {
    fn default_queue_capacity() -> usize {
        8
    }

    fn default_readiness_poll_ms() -> u64 {
        2
    }

    fn default_readiness_timeout_ms() -> u64 {
        100
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            tx_queue_capacity: Self::default_queue_capacity(),
            rx_queue_capacity: Self::default_queue_capacity(),
            readiness_poll_ms: Self::default_readiness_poll_ms(),
            readiness_timeout_ms: Self::default_readiness_timeout_ms(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            daemon: DaemonSettings {
                log_level: "info".to_string(),
                hostname: Some("usb-ncm-gadget".to_string()),
            },
            relay: RelaySettings::default(),
        }
    }
}

impl DaemonConfig {
    /// Default config location: `~/.config/usb-ncm-bridge/daemon.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("usb-ncm-bridge")
            .join("daemon.toml")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from the default path, falling back to built-in defaults when
    /// no file exists.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            tx_queue_capacity: self.relay.tx_queue_capacity,
            rx_queue_capacity: self.relay.rx_queue_capacity,
            readiness_poll: Duration::from_millis(self.relay.readiness_poll_ms),
            readiness_timeout: Duration::from_millis(self.relay.readiness_timeout_ms),
            ..BridgeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bridge_defaults() {
        let cfg = DaemonConfig::default().bridge_config();
        let def = BridgeConfig::default();
        assert_eq!(cfg.tx_queue_capacity, def.tx_queue_capacity);
        assert_eq!(cfg.rx_queue_capacity, def.rx_queue_capacity);
        assert_eq!(cfg.readiness_poll, def.readiness_poll);
        assert_eq!(cfg.readiness_timeout, def.readiness_timeout);
    }

    #[test]
    fn save_and_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daemon.toml");

        let mut cfg = DaemonConfig::default();
        cfg.daemon.log_level = "debug".to_string();
        cfg.relay.rx_queue_capacity = 16;
        cfg.save(&path).unwrap();

        let loaded = DaemonConfig::load(&path).unwrap();
        assert_eq!(loaded.daemon.log_level, "debug");
        assert_eq!(loaded.relay.rx_queue_capacity, 16);
        assert_eq!(loaded.relay.tx_queue_capacity, 8);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: DaemonConfig = toml::from_str(
            r#"
            [daemon]
            log_level = "warn"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.daemon.log_level, "warn");
        assert_eq!(cfg.daemon.hostname, None);
        assert_eq!(cfg.relay.readiness_timeout_ms, 100);
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daemon.toml");
        fs::write(&path, "not valid toml [").unwrap();
        assert!(DaemonConfig::load(&path).is_err());
    }
}
