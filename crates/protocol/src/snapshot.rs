use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::battery::BatteryRecord;
use crate::peripherals::{PrinterRecord, UsbDeviceRecord};
use crate::system::{BaseboardRecord, BiosRecord, ChassisRecord, SystemRecord};
use crate::types::{FactKind, PlatformFamily};
use crate::virtualbox::VirtualMachineRecord;

/// Point-in-time aggregate of every collected fact.
///
/// A slot is `None` only when the fact does not apply to `platform` or was
/// not requested; applicable slots are always filled, with defaults if every
/// source failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub time: DateTime<Utc>,
    pub platform: PlatformFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<BatteryRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bios: Option<BiosRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseboard: Option<BaseboardRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chassis: Option<ChassisRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usb: Option<Vec<UsbDeviceRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printers: Option<Vec<PrinterRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_machines: Option<Vec<VirtualMachineRecord>>,
}

impl Snapshot {
    /// Creates a snapshot with every slot empty.
    pub fn empty(time: DateTime<Utc>, platform: PlatformFamily) -> Self {
        Self {
            time,
            platform,
            battery: None,
            system: None,
            bios: None,
            baseboard: None,
            chassis: None,
            usb: None,
            printers: None,
            virtual_machines: None,
        }
    }

    /// Stores a resolved fact in its slot, replacing any previous value.
    pub fn set(&mut self, value: FactValue) {
        match value {
            FactValue::Battery(v) => self.battery = Some(v),
            FactValue::System(v) => self.system = Some(v),
            FactValue::Bios(v) => self.bios = Some(v),
            FactValue::Baseboard(v) => self.baseboard = Some(v),
            FactValue::Chassis(v) => self.chassis = Some(v),
            FactValue::Usb(v) => self.usb = Some(v),
            FactValue::Printers(v) => self.printers = Some(v),
            FactValue::VirtualMachines(v) => self.virtual_machines = Some(v),
        }
    }

    /// Returns `true` if the slot for `kind` holds a value.
    pub fn has(&self, kind: FactKind) -> bool {
        match kind {
            FactKind::Battery => self.battery.is_some(),
            FactKind::System => self.system.is_some(),
            FactKind::Bios => self.bios.is_some(),
            FactKind::Baseboard => self.baseboard.is_some(),
            FactKind::Chassis => self.chassis.is_some(),
            FactKind::Usb => self.usb.is_some(),
            FactKind::Printers => self.printers.is_some(),
            FactKind::VirtualMachines => self.virtual_machines.is_some(),
        }
    }
}

/// A resolved fact tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FactValue {
    Battery(BatteryRecord),
    System(SystemRecord),
    Bios(BiosRecord),
    Baseboard(BaseboardRecord),
    Chassis(ChassisRecord),
    Usb(Vec<UsbDeviceRecord>),
    Printers(Vec<PrinterRecord>),
    VirtualMachines(Vec<VirtualMachineRecord>),
}

impl FactValue {
    pub fn kind(&self) -> FactKind {
        match self {
            FactValue::Battery(_) => FactKind::Battery,
            FactValue::System(_) => FactKind::System,
            FactValue::Bios(_) => FactKind::Bios,
            FactValue::Baseboard(_) => FactKind::Baseboard,
            FactValue::Chassis(_) => FactKind::Chassis,
            FactValue::Usb(_) => FactKind::Usb,
            FactValue::Printers(_) => FactKind::Printers,
            FactValue::VirtualMachines(_) => FactKind::VirtualMachines,
        }
    }

    /// The value reported when no source produced anything.
    pub fn default_for(kind: FactKind) -> Self {
        match kind {
            FactKind::Battery => FactValue::Battery(BatteryRecord::default()),
            FactKind::System => FactValue::System(SystemRecord::default()),
            FactKind::Bios => FactValue::Bios(BiosRecord::default()),
            FactKind::Baseboard => FactValue::Baseboard(BaseboardRecord::default()),
            FactKind::Chassis => FactValue::Chassis(ChassisRecord::default()),
            FactKind::Usb => FactValue::Usb(Vec::new()),
            FactKind::Printers => FactValue::Printers(Vec::new()),
            FactKind::VirtualMachines => FactValue::VirtualMachines(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn default_for_matches_kind() {
        for kind in FactKind::ALL {
            assert_eq!(FactValue::default_for(kind).kind(), kind);
        }
    }

    #[test]
    fn empty_slots_are_omitted() {
        let mut snap = Snapshot::empty(fixed_time(), PlatformFamily::SunOs);
        snap.set(FactValue::default_for(FactKind::System));
        let json = serde_json::to_value(&snap).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("system"));
        assert!(!obj.contains_key("battery"));
        assert!(!obj.contains_key("virtualMachines"));
        assert_eq!(obj["platform"], "sunos");
        assert_eq!(obj["time"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn set_fills_every_slot() {
        let mut snap = Snapshot::empty(fixed_time(), PlatformFamily::Linux);
        for kind in FactKind::ALL {
            assert!(!snap.has(kind));
            snap.set(FactValue::default_for(kind));
            assert!(snap.has(kind));
        }
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["usb"], serde_json::json!([]));
    }
}
