fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use sysfacts_protocol::{
        BaseboardRecord, BatteryRecord, BiosRecord, ChassisRecord, FactKind, PlatformFamily,
        PrinterRecord, Snapshot, SystemRecord, UsbDeviceRecord, VirtualMachineRecord,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Normalizes JSON numbers so that `0` and `0.0` compare equal.
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => serde_json::json!(f),
                None => v.clone(),
            },
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect(),
            ),
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture, re-serializes it, and compares the JSON values
    /// (order-independent, number-normalized).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&reserialized),
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  rust:    {reserialized}"
        );
        parsed
    }

    /// Asserts that the default record serializes exactly as the fixture.
    fn default_test<T>(name: &str)
    where
        T: Default + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let actual = serde_json::to_value(T::default()).unwrap();
        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&actual),
            "default mismatch for {name}:\n  fixture: {fixture}\n  rust:    {actual}"
        );
    }

    // --- Default records ---

    #[test]
    fn default_battery() {
        default_test::<BatteryRecord>("battery_default.json");
    }

    #[test]
    fn default_system() {
        default_test::<SystemRecord>("system_default.json");
    }

    #[test]
    fn default_bios() {
        default_test::<BiosRecord>("bios_default.json");
    }

    #[test]
    fn default_baseboard() {
        default_test::<BaseboardRecord>("baseboard_default.json");
    }

    #[test]
    fn default_chassis() {
        default_test::<ChassisRecord>("chassis_default.json");
    }

    // --- Populated records ---

    #[test]
    fn fixture_battery_laptop() {
        let b = roundtrip_test::<BatteryRecord>("battery_laptop.json");
        assert_eq!(b.time_remaining, Some(142));
        assert_eq!(b.additional_batteries.len(), 1);
        assert_eq!(b.additional_batteries[0].time_remaining, None);
    }

    #[test]
    fn fixture_system_raspberry() {
        let s = roundtrip_test::<SystemRecord>("system_raspberry.json");
        let pi = s.raspberry.unwrap();
        assert_eq!(pi.board_type, "4B");
        assert_eq!(pi.processor, "BCM2711");
    }

    #[test]
    fn fixture_system_virtual() {
        let s = roundtrip_test::<SystemRecord>("system_virtual.json");
        assert!(s.is_virtual);
        assert_eq!(s.virtual_host, "QEMU");
    }

    #[test]
    fn fixture_bios_dmi() {
        let b = roundtrip_test::<BiosRecord>("bios_dmi.json");
        assert_eq!(b.release_date, "2023-08-14");
        assert_eq!(b.features.len(), 5);
    }

    #[test]
    fn fixture_baseboard_dmi() {
        let b = roundtrip_test::<BaseboardRecord>("baseboard_dmi.json");
        assert_eq!(b.mem_max, Some(64 * 1024 * 1024 * 1024));
        assert_eq!(b.mem_slots, Some(2));
    }

    #[test]
    fn fixture_chassis_notebook() {
        let c = roundtrip_test::<ChassisRecord>("chassis_notebook.json");
        assert_eq!(c.chassis_type, "Notebook");
    }

    #[test]
    fn fixture_usb_device() {
        let u = roundtrip_test::<UsbDeviceRecord>("usb_device.json");
        assert_eq!(u.bus, Some(1));
        assert_eq!(u.removable, None);
    }

    #[test]
    fn fixture_printer_cups() {
        let p = roundtrip_test::<PrinterRecord>("printer_cups.json");
        assert_eq!(p.default, Some(true));
        assert_eq!(p.engine_version, "2.4.2");
    }

    #[test]
    fn fixture_virtual_machine() {
        let vm = roundtrip_test::<VirtualMachineRecord>("virtual_machine.json");
        assert_eq!(vm.guest_os, "Ubuntu (64-bit)");
        assert!(vm.x2_apic);
        assert_eq!(vm.cpu_exec_cap, "100%");
    }

    // --- Snapshots ---

    #[test]
    fn fixture_snapshot_linux() {
        let snap = roundtrip_test::<Snapshot>("snapshot_linux.json");
        assert_eq!(snap.platform, PlatformFamily::Linux);
        assert!(snap.has(FactKind::Battery));
        assert!(snap.has(FactKind::Printers));
        assert!(!snap.has(FactKind::Bios));
        assert_eq!(snap.virtual_machines.unwrap()[0].running_since, 7200);
    }

    #[test]
    fn fixture_snapshot_sunos() {
        let snap = roundtrip_test::<Snapshot>("snapshot_sunos.json");
        assert_eq!(snap.platform, PlatformFamily::SunOs);
        let present = FactKind::ALL.into_iter().filter(|k| snap.has(*k)).count();
        assert_eq!(present, 4);
        assert_eq!(snap.bios.unwrap().vendor, "Sun Microsystems");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"vendor":"Dell Inc.","futureField":42}"#;
        let bios: BiosRecord = serde_json::from_str(json).unwrap();
        assert_eq!(bios.vendor, "Dell Inc.");
        assert!(bios.features.is_empty());
    }
}
