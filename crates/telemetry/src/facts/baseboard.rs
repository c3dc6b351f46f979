use sysfacts_protocol::BaseboardRecord;

use super::raspberry;
use super::{FactContext, strip_ioreg, successes, text_of};
use crate::catalog::SourceId;
use crate::grammar::{Delimiter, KvLines};
use crate::merge::{impl_merge, merge_all};
use crate::normalize::{parse_count, parse_int_prefix, scrub};
use crate::probe::RawProbeResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseboardPartial {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub version: Option<String>,
    pub serial: Option<String>,
    pub asset_tag: Option<String>,
    pub mem_max: Option<u64>,
    pub mem_slots: Option<u32>,
}

impl_merge!(BaseboardPartial {
    manufacturer,
    model,
    version,
    serial,
    asset_tag,
    mem_max,
    mem_slots,
});

impl BaseboardPartial {
    pub fn into_record(self) -> BaseboardRecord {
        let defaults = BaseboardRecord::default();
        BaseboardRecord {
            manufacturer: scrub(self.manufacturer).unwrap_or(defaults.manufacturer),
            model: scrub(self.model).unwrap_or(defaults.model),
            version: scrub(self.version).unwrap_or(defaults.version),
            serial: scrub(self.serial).unwrap_or(defaults.serial),
            asset_tag: scrub(self.asset_tag).unwrap_or(defaults.asset_tag),
            mem_max: self.mem_max,
            mem_slots: self.mem_slots,
        }
    }
}

pub fn resolve(_ctx: &FactContext, raws: &[RawProbeResult]) -> BaseboardRecord {
    // A Pi has no SMBIOS; its cpuinfo describes the board better than
    // whatever dmidecode guesses.
    let pi = text_of(raws, SourceId::CpuInfo)
        .and_then(raspberry::decode_cpuinfo)
        .map(|board| BaseboardPartial {
            manufacturer: Some(board.manufacturer.clone()),
            model: Some("Raspberry Pi".into()),
            version: Some(format!("{} - {}", board.board_type, board.revision)),
            serial: Some(board.serial.clone()),
            asset_tag: None,
            mem_max: text_of(raws, SourceId::MemInfo).and_then(mem_total),
            mem_slots: Some(0),
        });

    let parsed = successes(raws).filter_map(|(id, text)| match id {
        SourceId::DmidecodeBaseboard => Some(parse_dmidecode(text)),
        SourceId::SysfsDmi => Some(parse_sysfs(text)),
        SourceId::DmidecodeMemory => Some(parse_dmidecode_memory(text)),
        SourceId::IoregPlatform => Some(parse_ioreg(text)),
        SourceId::MemoryProfile => Some(parse_memory_profile(text)),
        SourceId::WinBaseboard => Some(parse_win_baseboard(text)),
        SourceId::WinMemoryArray => Some(parse_win_memory_array(text)),
        _ => None,
    });

    merge_all(pi.into_iter().chain(parsed)).into_record()
}

/// `dmidecode -t 2`.
pub fn parse_dmidecode(text: &str) -> BaseboardPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    BaseboardPartial {
        manufacturer: kv.string("Manufacturer"),
        model: kv.string("Product Name"),
        version: kv.string("Version"),
        serial: kv.string("Serial Number"),
        asset_tag: kv.string("Asset Tag"),
        ..BaseboardPartial::default()
    }
}

pub fn parse_sysfs(text: &str) -> BaseboardPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    BaseboardPartial {
        manufacturer: kv.string("board_vendor"),
        model: kv.string("board_name"),
        version: kv.string("board_version"),
        serial: kv.string("board_serial"),
        asset_tag: kv.string("board_asset_tag"),
        ..BaseboardPartial::default()
    }
}

/// `dmidecode -t memory`: the first physical memory array. Zero reads as
/// unknown.
pub fn parse_dmidecode_memory(text: &str) -> BaseboardPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    BaseboardPartial {
        mem_max: kv
            .get("Maximum Capacity")
            .and_then(capacity_bytes)
            .filter(|b| *b > 0),
        mem_slots: kv
            .get("Number Of Devices")
            .and_then(parse_count)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0),
        ..BaseboardPartial::default()
    }
}

/// `"32 GB"` in bytes. A bare number is taken as GB.
fn capacity_bytes(value: &str) -> Option<u64> {
    let amount = parse_count(value)?;
    let unit = value.trim_start_matches(|c: char| c.is_ascii_digit() || c.is_whitespace());
    let shift = match unit.trim().to_ascii_uppercase().as_str() {
        "KB" => 10,
        "MB" => 20,
        "TB" => 40,
        _ => 30,
    };
    amount.checked_mul(1 << shift)
}

/// `MemTotal` of `/proc/meminfo` in bytes.
fn mem_total(text: &str) -> Option<u64> {
    KvLines::parse(text, Delimiter::Colon)
        .get("MemTotal")
        .and_then(parse_count)
        .and_then(|kb| kb.checked_mul(1024))
}

pub fn parse_ioreg(text: &str) -> BaseboardPartial {
    let cleaned = strip_ioreg(text);
    let kv = KvLines::parse(&cleaned, Delimiter::Equals);
    BaseboardPartial {
        manufacturer: kv.string("manufacturer"),
        model: kv.string("model"),
        version: kv.string("version"),
        serial: kv.string("IOPlatformSerialNumber"),
        asset_tag: kv.string("board-id"),
        ..BaseboardPartial::default()
    }
}

/// `system_profiler SPMemoryDataType`: one indented `BANK` (or `DIMM`)
/// section per slot.
pub fn parse_memory_profile(text: &str) -> BaseboardPartial {
    let mut slots = text.matches("        BANK ").count();
    if slots == 0 {
        slots = text.matches("        DIMM").count();
    }
    BaseboardPartial {
        mem_slots: u32::try_from(slots).ok(),
        ..BaseboardPartial::default()
    }
}

/// `Win32_BaseBoard`.
pub fn parse_win_baseboard(text: &str) -> BaseboardPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    BaseboardPartial {
        manufacturer: kv.string("Manufacturer"),
        model: kv.first_of(&["Model", "Product"]).map(str::to_string),
        version: kv.string("Version"),
        serial: kv.string("SerialNumber"),
        asset_tag: kv.first_of(&["PartNumber", "SKU"]).map(str::to_string),
        ..BaseboardPartial::default()
    }
}

/// `Win32_PhysicalMemoryArray`; `MaxCapacity` is in KiB.
pub fn parse_win_memory_array(text: &str) -> BaseboardPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    BaseboardPartial {
        mem_max: kv
            .get("MaxCapacity")
            .and_then(parse_count)
            .filter(|kb| *kb > 0)
            .and_then(|kb| kb.checked_mul(1024)),
        mem_slots: kv
            .get("MemoryDevices")
            .and_then(parse_int_prefix)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0),
        ..BaseboardPartial::default()
    }
}
