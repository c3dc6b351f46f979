use serde::{Deserialize, Serialize};

/// One attached USB device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsbDeviceRecord {
    pub bus: Option<u32>,
    pub device_id: Option<String>,
    /// `vendor:product` on Linux, registry address or index elsewhere.
    pub id: String,
    pub name: String,
    /// Canonical tag such as `"Hub"`, `"Storage"` or `"Keyboard"`.
    #[serde(rename = "type")]
    pub device_type: String,
    pub removable: Option<bool>,
    pub vendor: String,
    pub manufacturer: String,
    pub max_power: String,
    pub serial_number: Option<String>,
}

/// One configured printer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrinterRecord {
    pub id: Option<u32>,
    pub name: String,
    pub model: String,
    pub uri: Option<String>,
    pub uuid: Option<String>,
    pub status: Option<String>,
    pub local: bool,
    pub default: Option<bool>,
    pub shared: bool,
    /// Print system, e.g. `"CUPS"`; empty when unknown.
    pub engine: String,
    pub engine_version: String,
}
