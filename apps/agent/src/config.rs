//! Agent configuration.
//!
//! Stored as TOML at `$SYSFACTS_CONFIG` when set, otherwise:
//! - Linux/macOS/BSD: `~/.config/sysfacts/agent.toml`
//! - Windows: `%APPDATA%/sysfacts/agent.toml`
//!
//! A missing file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sysfacts_telemetry::CollectorConfig;

/// Agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pretty-print the snapshot JSON.
    #[serde(default)]
    pub pretty: bool,

    #[serde(flatten)]
    pub collector: CollectorConfig,
}

impl Config {
    /// Loads the configuration from its platform location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

/// Returns the configuration file path.
fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("SYSFACTS_CONFIG") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("sysfacts").join("agent.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("sysfacts")
            .join("agent.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysfacts_protocol::{FactKind, PlatformFamily};

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&tmp.path().join("agent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.pretty);
        assert_eq!(config.collector.facts.len(), 8);
    }

    #[test]
    fn collector_keys_sit_at_top_level() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("agent.toml");
        std::fs::write(
            &path,
            "pretty = true\nplatform = \"darwin\"\nfacts = [\"usb\", \"printers\"]\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.pretty);
        assert_eq!(config.collector.platform, Some(PlatformFamily::Darwin));
        assert_eq!(config.collector.facts, vec![FactKind::Usb, FactKind::Printers]);
        assert_eq!(config.collector.vboxmanage, "VBoxManage");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("agent.toml");
        std::fs::write(&path, "facts = [\"toaster\"]\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
