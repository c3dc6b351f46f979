//! Wire types for sysfacts snapshots.
//!
//! Every record serializes all of its fields with camelCase names; absent
//! knowledge is expressed through defaults or `null`, never by omitting a key.

pub mod battery;
pub mod peripherals;
pub mod snapshot;
pub mod system;
pub mod types;
pub mod virtualbox;

// Re-export primary types for convenience.
pub use battery::BatteryRecord;
pub use peripherals::{PrinterRecord, UsbDeviceRecord};
pub use snapshot::{FactValue, Snapshot};
pub use system::{BaseboardRecord, BiosRecord, ChassisRecord, RaspberryInfo, SystemRecord};
pub use types::{FactKind, PlatformFamily};
pub use virtualbox::VirtualMachineRecord;
