use sysfacts_protocol::ChassisRecord;

use super::{FactContext, strip_ioreg, successes};
use crate::catalog::SourceId;
use crate::grammar::{Delimiter, KvLines};
use crate::merge::{impl_merge, merge_all};
use crate::normalize::{chassis_type_name, parse_digits, scrub};
use crate::probe::RawProbeResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChassisPartial {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub chassis_type: Option<String>,
    pub version: Option<String>,
    pub serial: Option<String>,
    pub asset_tag: Option<String>,
    pub sku: Option<String>,
}

impl_merge!(ChassisPartial {
    manufacturer,
    model,
    chassis_type,
    version,
    serial,
    asset_tag,
    sku,
});

impl ChassisPartial {
    pub fn into_record(self) -> ChassisRecord {
        let defaults = ChassisRecord::default();
        ChassisRecord {
            manufacturer: scrub(self.manufacturer).unwrap_or(defaults.manufacturer),
            model: scrub(self.model).unwrap_or(defaults.model),
            chassis_type: self.chassis_type.unwrap_or(defaults.chassis_type),
            version: scrub(self.version).unwrap_or(defaults.version),
            serial: scrub(self.serial).unwrap_or(defaults.serial),
            asset_tag: scrub(self.asset_tag).unwrap_or(defaults.asset_tag),
            sku: scrub(self.sku).unwrap_or(defaults.sku),
        }
    }
}

pub fn resolve(_ctx: &FactContext, raws: &[RawProbeResult]) -> ChassisRecord {
    let parsed = successes(raws).filter_map(|(id, text)| match id {
        SourceId::SysfsDmi => Some(parse_sysfs(text)),
        SourceId::IoregPlatform => Some(parse_ioreg(text)),
        SourceId::WinSystemEnclosure => Some(parse_win_enclosure(text)),
        _ => None,
    });
    merge_all(parsed).into_record()
}

/// Maps the first code of a chassis type value (`"10"`, `"{10}"`, `"{3, 4}"`).
fn type_name(raw: &str) -> Option<String> {
    let first = raw.trim_matches(|c| c == '{' || c == '}').split(',').next()?;
    chassis_type_name(parse_digits(first)?).map(str::to_string)
}

pub fn parse_sysfs(text: &str) -> ChassisPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    ChassisPartial {
        manufacturer: kv.string("chassis_vendor"),
        model: None,
        chassis_type: kv.get("chassis_type").and_then(type_name),
        version: kv.string("chassis_version"),
        serial: kv.string("chassis_serial"),
        asset_tag: kv.string("chassis_asset_tag"),
        sku: None,
    }
}

pub fn parse_ioreg(text: &str) -> ChassisPartial {
    let cleaned = strip_ioreg(text);
    let kv = KvLines::parse(&cleaned, Delimiter::Equals);
    ChassisPartial {
        manufacturer: kv.string("manufacturer"),
        model: kv.string("model"),
        version: kv.string("version"),
        serial: kv.string("IOPlatformSerialNumber"),
        asset_tag: kv.string("board-id"),
        ..ChassisPartial::default()
    }
}

/// `Win32_SystemEnclosure`.
pub fn parse_win_enclosure(text: &str) -> ChassisPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    ChassisPartial {
        manufacturer: kv.string("Manufacturer"),
        model: kv.string("Model"),
        chassis_type: kv.get("ChassisTypes").and_then(type_name),
        version: kv.string("Version"),
        serial: kv.string("SerialNumber"),
        asset_tag: kv.string("PartNumber"),
        sku: kv.string("SKU"),
    }
}
