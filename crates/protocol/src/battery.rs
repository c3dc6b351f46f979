use serde::{Deserialize, Serialize};

/// Normalized battery state.
///
/// Capacities are in `capacity_unit` (`"mWh"` when a voltage was reported,
/// `"mAh"` otherwise). `None` on a capacity, cycle count or percent means the
/// source cannot know the value at all, which is distinct from `Some(0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatteryRecord {
    pub has_battery: bool,
    pub cycle_count: Option<u32>,
    pub is_charging: bool,
    pub designed_capacity: u64,
    pub max_capacity: Option<u64>,
    pub current_capacity: Option<u64>,
    /// Volts.
    pub voltage: f64,
    pub capacity_unit: String,
    pub percent: Option<u32>,
    /// Minutes; `None` when neither power draw nor current is known.
    pub time_remaining: Option<i64>,
    pub ac_connected: bool,
    #[serde(rename = "type")]
    pub battery_type: String,
    pub model: String,
    pub manufacturer: String,
    pub serial: String,
    pub additional_batteries: Vec<BatteryRecord>,
}

impl Default for BatteryRecord {
    fn default() -> Self {
        Self {
            has_battery: false,
            cycle_count: Some(0),
            is_charging: false,
            designed_capacity: 0,
            max_capacity: Some(0),
            current_capacity: Some(0),
            voltage: 0.0,
            capacity_unit: String::new(),
            percent: Some(0),
            time_remaining: None,
            // No detectable battery means the machine runs on AC.
            ac_connected: true,
            battery_type: String::new(),
            model: String::new(),
            manufacturer: String::new(),
            serial: String::new(),
            additional_batteries: Vec::new(),
        }
    }
}
