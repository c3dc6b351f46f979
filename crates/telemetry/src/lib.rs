//! Hardware and peripheral facts for sysfacts.
//!
//! Runs platform-native tools and files (sysfs, `dmidecode`, `ioreg`, WMI
//! through PowerShell, CUPS, `VBoxManage`), parses their text into partial
//! records, merges fallback sources in priority order and assembles one
//! [`Snapshot`](sysfacts_protocol::Snapshot) concurrently.

pub mod catalog;
pub mod collector;
pub mod config;
pub mod error;
pub mod facts;
pub mod grammar;
pub mod merge;
pub mod normalize;
pub mod platform;
pub mod probe;

pub use catalog::{SourceCatalog, SourceId};
pub use collector::{Collector, Countdown};
pub use config::{CollectorConfig, ConfigError};
pub use error::{CountdownError, ProbeError};
pub use platform::{applicable_count, detect_platform, is_applicable};
pub use probe::{Probe, RawProbeResult, Source, SourceKind, SystemProbe};
