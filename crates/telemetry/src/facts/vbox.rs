//! VirtualBox guests from `VBoxManage list vms --long`.

use chrono::{DateTime, NaiveDateTime, Utc};
use sysfacts_protocol::VirtualMachineRecord;

use super::{FactContext, text_of};
use crate::catalog::SourceId;
use crate::grammar::{Delimiter, KvLines, split_on_marker};
use crate::normalize::parse_int_prefix;
use crate::probe::RawProbeResult;

pub fn resolve(ctx: &FactContext, raws: &[RawProbeResult]) -> Vec<VirtualMachineRecord> {
    text_of(raws, SourceId::VBoxList)
        .map(|text| parse_vms(text, ctx.now))
        .unwrap_or_default()
}

/// Parses every VM block. Durations are measured against `now`.
///
/// Blocks without a `UUID` (such as shared-folder lines that happen to start
/// with `Name:`) are dropped.
pub fn parse_vms(text: &str, now: DateTime<Utc>) -> Vec<VirtualMachineRecord> {
    split_on_marker(text, |l| l.starts_with("Name:"))
        .iter()
        .filter_map(|block| parse_vm(block, now))
        .collect()
}

fn parse_vm(block: &[&str], now: DateTime<Utc>) -> Option<VirtualMachineRecord> {
    // Older releases print `Memory size:`; newer ones drop the colon and pad
    // with spaces instead.
    let kv = KvLines::from_lines(block.iter().copied(), &[Delimiter::Colon, Delimiter::WideGap]);
    let id = kv.string("UUID")?;

    let text = |key: &str| kv.string(key).unwrap_or_default();
    let enabled = |key: &str| {
        kv.get(key)
            .is_some_and(|v| v.eq_ignore_ascii_case("enabled") || v.eq_ignore_ascii_case("on"))
    };
    let size = |key: &str| {
        kv.get(key)
            .and_then(parse_int_prefix)
            .and_then(|v| u64::try_from(v).ok())
    };

    let state = kv.get("State").unwrap_or_default();
    let running = state.starts_with("running");
    let since = since_text(state).unwrap_or_default().to_string();
    let elapsed = elapsed_seconds(&since, now);
    let (started, running_since, stopped, stopped_since) = if running {
        (since, elapsed, String::new(), 0)
    } else {
        (String::new(), 0, since, elapsed)
    };

    Some(VirtualMachineRecord {
        id,
        name: text("Name"),
        running,
        started,
        running_since,
        stopped,
        stopped_since,
        guest_os: text("Guest OS"),
        hardware_uuid: text("Hardware UUID"),
        memory: size("Memory size"),
        vram: size("VRAM size"),
        cpus: size("Number of CPUs").and_then(|n| u32::try_from(n).ok()),
        cpu_exec_cap: text("CPU exec cap"),
        cpu_profile: text("CPUProfile"),
        chipset: text("Chipset"),
        firmware: text("Firmware"),
        page_fusion: enabled("Page Fusion"),
        config_file: text("Config file"),
        snapshot_folder: text("Snapshot folder"),
        log_folder: text("Log folder"),
        hpet: enabled("HPET"),
        pae: enabled("PAE"),
        long_mode: enabled("Long Mode"),
        triple_fault_reset: enabled("Triple Fault Reset"),
        apic: enabled("APIC"),
        x2_apic: enabled("X2APIC"),
        acpi: enabled("ACPI"),
        io_apic: enabled("IOAPIC"),
        bios_apic_mode: text("BIOS APIC mode"),
        boot_menu_mode: text("Boot menu mode"),
        boot_device1: text("Boot Device 1"),
        boot_device2: text("Boot Device 2"),
        boot_device3: text("Boot Device 3"),
        boot_device4: text("Boot Device 4"),
        time_offset: text("Time offset"),
        rtc: text("RTC"),
    })
}

/// `running (since 2024-05-01T10:00:00.000000000)` -> the timestamp.
fn since_text(state: &str) -> Option<&str> {
    let (_, rest) = state.split_once("(since ")?;
    Some(rest.trim_end().trim_end_matches(')').trim())
}

/// Whole seconds from a VirtualBox UTC timestamp to `now`; 0 when the
/// timestamp does not parse.
fn elapsed_seconds(since: &str, now: DateTime<Utc>) -> i64 {
    NaiveDateTime::parse_from_str(since, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|t| (now - t.and_utc()).num_seconds().max(0))
        .unwrap_or(0)
}
