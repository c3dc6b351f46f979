//! Collector configuration.
//!
//! Stored as TOML. Every key is optional:
//!
//! ```toml
//! root = "/"
//! powershell = "powershell.exe"
//! vboxmanage = "VBoxManage"
//! platform = "linux"
//! facts = ["battery", "system", "usb"]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sysfacts_protocol::{FactKind, PlatformFamily};

use crate::catalog::SourceCatalog;
use crate::platform::detect_platform;

/// Errors reading a collector configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Collector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Prefix for every filesystem source (`/sys`, `/proc`, `/etc/cups`).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// PowerShell executable used for WMI queries on Windows.
    #[serde(default = "default_powershell")]
    pub powershell: String,

    /// VirtualBox management CLI.
    #[serde(default = "default_vboxmanage")]
    pub vboxmanage: String,

    /// Platform family override; detected from the build target when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformFamily>,

    /// Facts to collect.
    #[serde(default = "default_facts")]
    pub facts: Vec<FactKind>,
}

fn default_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_powershell() -> String {
    "powershell.exe".into()
}

fn default_vboxmanage() -> String {
    "VBoxManage".into()
}

fn default_facts() -> Vec<FactKind> {
    FactKind::ALL.to_vec()
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            powershell: default_powershell(),
            vboxmanage: default_vboxmanage(),
            platform: None,
            facts: default_facts(),
        }
    }
}

impl CollectorConfig {
    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The configured platform, or the build target's.
    pub fn platform(&self) -> PlatformFamily {
        self.platform.unwrap_or_else(detect_platform)
    }

    /// Source catalog for this configuration.
    pub fn catalog(&self) -> SourceCatalog {
        SourceCatalog::new(&self.root, &self.powershell, &self.vboxmanage)
    }
}
