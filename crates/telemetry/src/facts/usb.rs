//! USB device lists.
//!
//! Each platform has its own classification table mapping product names or
//! WMI classes to a canonical tag. Rules are substring checks applied in
//! order; the first hit wins.

use sysfacts_protocol::UsbDeviceRecord;

use super::{FactContext, first_non_empty};
use crate::catalog::SourceId;
use crate::grammar::{Delimiter, KvLines, split_blank_lines, split_on_marker};
use crate::normalize::parse_int_prefix;
use crate::probe::RawProbeResult;

const LINUX_RULES: &[(&str, &str)] = &[
    ("camera", "Camera"),
    ("hub", "Hub"),
    ("keybrd", "Keyboard"),
    ("keyboard", "Keyboard"),
    ("mouse", "Mouse"),
    ("stora", "Storage"),
    ("mic", "Microphone"),
    ("headset", "Audio"),
    ("audio", "Audio"),
];

const DARWIN_RULES: &[(&str, &str)] = &[
    ("camera", "Camera"),
    ("touch bar", "Touch Bar"),
    ("controller", "Controller"),
    ("headset", "Audio"),
    ("keyboard", "Keyboard"),
    ("trackpad", "Trackpad"),
    ("sensor", "Sensor"),
    ("bthusb", "Bluetooth"),
    ("bth", "Bluetooth"),
    ("rfcomm", "Bluetooth"),
    ("usbhub", "Hub"),
    (" hub", "Hub"),
    ("mouse", "Mouse"),
    ("mic", "Microphone"),
    ("removable", "Storage"),
];

const WINDOWS_CLASS_RULES: &[(&str, &str)] = &[
    ("usbhub", "Hub"),
    ("storage", "Storage"),
    ("usbcontroller", "Controller"),
    ("keyboard", "Keyboard"),
    ("pointing", "Mouse"),
    ("disk", "Storage"),
];

fn classify(rules: &[(&str, &'static str)], haystack: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|(needle, _)| haystack.contains(needle))
        .map(|(_, tag)| *tag)
}

pub fn resolve(_ctx: &FactContext, raws: &[RawProbeResult]) -> Vec<UsbDeviceRecord> {
    first_non_empty(raws, |id, text| match id {
        SourceId::Lsusb => parse_lsusb(text),
        SourceId::IoregUsb => parse_ioreg(text),
        SourceId::WinUsb => parse_windows(text),
        _ => Vec::new(),
    })
}

/// Text after the first whitespace-separated token.
fn after_first_token(value: &str) -> &str {
    value
        .trim()
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default()
}

/// Hex id of an `idVendor`/`idProduct` value such as `0x8087 Intel Corp.`.
fn hex_id(value: &str) -> &str {
    value
        .split_whitespace()
        .next()
        .and_then(|token| token.strip_prefix("0x"))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Linux
// ---------------------------------------------------------------------------

/// `lsusb -v`: one block per device, starting at its `Bus` line.
pub fn parse_lsusb(text: &str) -> Vec<UsbDeviceRecord> {
    split_on_marker(text, |l| l.starts_with("Bus "))
        .iter()
        .map(|block| parse_lsusb_device(block))
        .collect()
}

fn parse_lsusb_device(block: &[&str]) -> UsbDeviceRecord {
    // Bus 001 Device 002: ID 8087:0024 Intel Corp. Integrated Rate Matching Hub
    let header: Vec<&str> = block[0].split_whitespace().collect();
    let bus = header.get(1).and_then(|b| b.parse().ok());
    let device_id = header
        .get(3)
        .and_then(|d| parse_int_prefix(d))
        .map(|d| d.to_string());

    let kv = KvLines::from_lines(block[1..].iter().copied(), &[Delimiter::Whitespace]);
    let id_vendor = kv.get("idVendor").unwrap_or_default();
    let id_product = kv.get("idProduct").unwrap_or_default();
    let name = after_first_token(id_product).to_string();
    let raw_type = after_first_token(kv.get("bInterfaceClass").unwrap_or_default());

    let haystack = format!("{name} {raw_type}").to_ascii_lowercase();
    let device_type = classify(LINUX_RULES, &haystack).unwrap_or(raw_type);

    UsbDeviceRecord {
        bus,
        device_id,
        id: format!("{}:{}", hex_id(id_vendor), hex_id(id_product)),
        device_type: device_type.to_string(),
        removable: None,
        vendor: after_first_token(id_vendor).to_string(),
        manufacturer: after_first_token(kv.get("iManufacturer").unwrap_or_default()).to_string(),
        max_power: kv.string("MaxPower").unwrap_or_default(),
        serial_number: None,
        name,
    }
}

// ---------------------------------------------------------------------------
// macOS
// ---------------------------------------------------------------------------

/// `ioreg -p IOUSB -l -w0`: one block per nested `+-o` node. Nodes without
/// a product name (controllers, the root) are skipped.
pub fn parse_ioreg(text: &str) -> Vec<UsbDeviceRecord> {
    split_on_marker(text, |l| l.contains(" +-o "))
        .iter()
        .filter_map(|block| parse_ioreg_device(block))
        .collect()
}

fn parse_ioreg_device(block: &[&str]) -> Option<UsbDeviceRecord> {
    let cleaned: Vec<String> = block[1..]
        .iter()
        .map(|l| l.replace(['"', '|'], ""))
        .collect();
    let kv = KvLines::from_lines(cleaned.iter().map(String::as_str), &[Delimiter::Equals]);

    let name = kv.first_of(&["kUSBProductString", "USB Product Name"])?;
    let non_removable = kv.get("non-removable").map(str::to_ascii_lowercase);
    let built_in = kv
        .get("Built-In")
        .is_some_and(|v| v.eq_ignore_ascii_case("yes"));
    let removable = non_removable.as_deref().map(|v| v == "no");
    let removable_drive = !built_in && removable == Some(true);

    let mut haystack = name.to_ascii_lowercase();
    if removable_drive {
        haystack.push_str(" removable");
    }
    let vendor = kv
        .first_of(&["kUSBVendorString", "USB Vendor Name"])
        .unwrap_or_default();

    Some(UsbDeviceRecord {
        bus: None,
        device_id: None,
        id: kv.string("USB Address").unwrap_or_default(),
        name: name.to_string(),
        device_type: classify(DARWIN_RULES, &haystack).unwrap_or_default().to_string(),
        removable,
        vendor: vendor.to_string(),
        manufacturer: vendor.to_string(),
        max_power: String::new(),
        serial_number: kv.string("kUSBSerialNumberString"),
    })
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// `CIM_LogicalDevice` entries mentioning USB. Entries whose class maps to no
/// known tag are dropped.
pub fn parse_windows(text: &str) -> Vec<UsbDeviceRecord> {
    split_blank_lines(text)
        .iter()
        .enumerate()
        .filter_map(|(i, block)| parse_windows_device(i, block))
        .collect()
}

fn parse_windows_device(index: usize, block: &[&str]) -> Option<UsbDeviceRecord> {
    let kv = KvLines::from_lines(block.iter().copied(), &[Delimiter::Colon]);
    let name = kv.get("Name").unwrap_or_default();
    let class = kv
        .get("CreationClassName")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let lower_name = name.to_ascii_lowercase();

    let device_type = if lower_name.contains("storage") || lower_name.contains("speicher") {
        "Storage"
    } else {
        classify(WINDOWS_CLASS_RULES, &class)?
    };

    Some(UsbDeviceRecord {
        bus: None,
        device_id: kv.string("DeviceID"),
        id: index.to_string(),
        name: name.to_string(),
        device_type: device_type.to_string(),
        removable: None,
        vendor: String::new(),
        manufacturer: kv.string("Manufacturer").unwrap_or_default(),
        max_power: String::new(),
        serial_number: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::test_support::{ctx, failed, ok};
    use sysfacts_protocol::PlatformFamily;

    const LSUSB: &str = "\

Bus 002 Device 001: ID 1d6b:0003 Linux Foundation 3.0 root hub
Device Descriptor:
  bLength                18
  bDeviceClass            9 Hub
  idVendor           0x1d6b Linux Foundation
  idProduct          0x0003 3.0 root hub
  iManufacturer           3 Linux 6.8.0 xhci-hcd
  iProduct                2 xHCI Host Controller
  Configuration Descriptor:
    MaxPower                0mA
    Interface Descriptor:
      bInterfaceClass         9 Hub

Bus 001 Device 004: ID 046d:c52b Logitech, Inc. Unifying Receiver
Device Descriptor:
  idVendor           0x046d Logitech, Inc.
  idProduct          0xc52b Unifying Receiver
  iManufacturer           1 Logitech
  Configuration Descriptor:
    MaxPower               98mA
    Interface Descriptor:
      bInterfaceClass         3 Human Interface Device

Bus 001 Device 005: ID 0781:5581 SanDisk Corp. Ultra
Device Descriptor:
  idVendor           0x0781 SanDisk Corp.
  idProduct          0x5581 Ultra
  iManufacturer           1  USB
  Configuration Descriptor:
    MaxPower              224mA
    Interface Descriptor:
      bInterfaceClass         8 Mass Storage
";

    #[test]
    fn lsusb_devices_in_report_order() {
        let list = resolve(&ctx(PlatformFamily::Linux), &[ok(SourceId::Lsusb, LSUSB)]);
        assert_eq!(list.len(), 3);

        assert_eq!(list[0].bus, Some(2));
        assert_eq!(list[0].device_id.as_deref(), Some("1"));
        assert_eq!(list[0].id, "1d6b:0003");
        assert_eq!(list[0].name, "3.0 root hub");
        assert_eq!(list[0].device_type, "Hub");
        assert_eq!(list[0].vendor, "Linux Foundation");
        assert_eq!(list[0].manufacturer, "Linux 6.8.0 xhci-hcd");
        assert_eq!(list[0].max_power, "0mA");

        assert_eq!(list[1].device_type, "Human Interface Device");
        assert_eq!(list[1].max_power, "98mA");
        assert_eq!(list[2].device_type, "Storage");
        assert_eq!(list[2].removable, None);
    }

    #[test]
    fn lsusb_failure_is_empty() {
        let list = resolve(&ctx(PlatformFamily::Linux), &[failed(SourceId::Lsusb)]);
        assert!(list.is_empty());
    }

    const IOREG: &str = r#"+-o Root  <class IORegistryEntry, id 0x100000100, retain 27>
  +-o AppleT8103USBXHCI@00000000  <class AppleT8103USBXHCI, id 0x100000318, registered, matched, active, busy 0 (0 ms), retain 68>
  | +-o Magic Keyboard@00100000  <class IOUSBHostDevice, id 0x100000a51, registered, matched, active, busy 0 (0 ms), retain 31>
  |   {
  |     "USB Product Name" = "Magic Keyboard"
  |     "kUSBProductString" = "Magic Keyboard"
  |     "USB Address" = 1
  |     "Built-In" = No
  |     "non-removable" = "yes"
  |     "kUSBVendorString" = "Apple Inc."
  |     "kUSBSerialNumberString" = "F0T123"
  |   }
  |
  +-o Flash Drive@00200000  <class IOUSBHostDevice, id 0x100000b12, registered, matched, active, busy 0 (0 ms), retain 29>
      {
        "USB Product Name" = "Flash Drive"
        "USB Address" = 2
        "Built-In" = No
        "non-removable" = "no"
        "USB Vendor Name" = "Samsung"
      }
"#;

    #[test]
    fn ioreg_devices() {
        let list = resolve(&ctx(PlatformFamily::Darwin), &[ok(SourceId::IoregUsb, IOREG)]);
        assert_eq!(list.len(), 2);

        assert_eq!(list[0].name, "Magic Keyboard");
        assert_eq!(list[0].device_type, "Keyboard");
        assert_eq!(list[0].id, "1");
        assert_eq!(list[0].removable, Some(false));
        assert_eq!(list[0].vendor, "Apple Inc.");
        assert_eq!(list[0].serial_number.as_deref(), Some("F0T123"));

        assert_eq!(list[1].name, "Flash Drive");
        assert_eq!(list[1].device_type, "Storage");
        assert_eq!(list[1].removable, Some(true));
        assert_eq!(list[1].manufacturer, "Samsung");
        assert_eq!(list[1].serial_number, None);
    }

    #[test]
    fn windows_devices() {
        let text = "\r\nName              : USB Root Hub (USB 3.0)\r\nCreationClassName : Win32_USBHub\r\nDeviceID          : USB\\ROOT_HUB30\\4&1234\r\nManufacturer      : (Standard USB HUBs)\r\n\r\nName              : USB Composite Device\r\nCreationClassName : Win32_PnPEntity\r\nDeviceID          : USB\\VID_046D\r\nManufacturer      : (Standard USB Host Controller)\r\n\r\nName              : USB-Massenspeichergerät\r\nCreationClassName : Win32_PnPEntity\r\nDeviceID          : USB\\VID_0781\r\nManufacturer      : Compatible USB storage device\r\n";
        let list = resolve(&ctx(PlatformFamily::Windows), &[ok(SourceId::WinUsb, text)]);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].device_type, "Hub");
        assert_eq!(list[0].id, "0");
        assert_eq!(list[0].device_id.as_deref(), Some("USB\\ROOT_HUB30\\4&1234"));
        assert_eq!(list[1].device_type, "Storage");
        assert_eq!(list[1].id, "2");
    }
}
