use serde::{Deserialize, Serialize};

/// Machine identity (SMBIOS type 1 or the platform equivalent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemRecord {
    pub manufacturer: String,
    pub model: String,
    pub version: String,
    pub serial: String,
    pub uuid: String,
    pub sku: String,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub virtual_host: String,
    pub raspberry: Option<RaspberryInfo>,
}

impl SystemRecord {
    pub const DEFAULT_MODEL: &'static str = "Computer";
    pub const UNKNOWN: &'static str = "-";
}

impl Default for SystemRecord {
    fn default() -> Self {
        Self {
            manufacturer: String::new(),
            model: Self::DEFAULT_MODEL.into(),
            version: String::new(),
            serial: Self::UNKNOWN.into(),
            uuid: Self::UNKNOWN.into(),
            sku: Self::UNKNOWN.into(),
            is_virtual: false,
            virtual_host: String::new(),
            raspberry: None,
        }
    }
}

/// Board details decoded from a Raspberry Pi revision code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RaspberryInfo {
    pub manufacturer: String,
    pub processor: String,
    #[serde(rename = "type")]
    pub board_type: String,
    pub revision: String,
}

/// Firmware vendor, version and capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BiosRecord {
    pub vendor: String,
    pub version: String,
    /// `YYYY-MM-DD` when the source date could be understood, raw otherwise.
    pub release_date: String,
    pub revision: String,
    pub serial: String,
    pub language: String,
    pub features: Vec<String>,
}

/// Mainboard identity plus memory array capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseboardRecord {
    pub manufacturer: String,
    pub model: String,
    pub version: String,
    pub serial: String,
    pub asset_tag: String,
    /// Bytes.
    pub mem_max: Option<u64>,
    pub mem_slots: Option<u32>,
}

impl Default for BaseboardRecord {
    fn default() -> Self {
        Self {
            manufacturer: String::new(),
            model: String::new(),
            version: String::new(),
            serial: SystemRecord::UNKNOWN.into(),
            asset_tag: SystemRecord::UNKNOWN.into(),
            mem_max: None,
            mem_slots: None,
        }
    }
}

/// Enclosure identity (SMBIOS type 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChassisRecord {
    pub manufacturer: String,
    pub model: String,
    #[serde(rename = "type")]
    pub chassis_type: String,
    pub version: String,
    pub serial: String,
    pub asset_tag: String,
    pub sku: String,
}

impl Default for ChassisRecord {
    fn default() -> Self {
        Self {
            manufacturer: String::new(),
            model: String::new(),
            chassis_type: String::new(),
            version: String::new(),
            serial: SystemRecord::UNKNOWN.into(),
            asset_tag: SystemRecord::UNKNOWN.into(),
            sku: String::new(),
        }
    }
}
