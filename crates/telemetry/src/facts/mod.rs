//! Per-fact parsers and fallback resolution.
//!
//! Each submodule turns the raw text of its sources into partial records,
//! merges them in catalog order and applies normalization and defaults.
//! Everything here is pure: the same raw results always give the same record.

pub mod baseboard;
pub mod battery;
pub mod bios;
pub mod chassis;
pub mod printer;
pub mod raspberry;
pub mod system;
pub mod usb;
pub mod vbox;
pub mod virt;

use chrono::{DateTime, Utc};
use sysfacts_protocol::{FactKind, FactValue, PlatformFamily};

use crate::catalog::SourceId;
use crate::probe::RawProbeResult;

/// Inputs to resolution besides the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactContext {
    pub platform: PlatformFamily,
    /// Capture time, used for durations such as VM uptime.
    pub now: DateTime<Utc>,
}

impl FactContext {
    pub fn new(platform: PlatformFamily, now: DateTime<Utc>) -> Self {
        Self { platform, now }
    }
}

/// Resolves `kind` from the raw results of its fallback chain.
///
/// Failed results contribute nothing; with no usable input the record is
/// fully default-filled.
pub fn resolve(kind: FactKind, ctx: &FactContext, raws: &[RawProbeResult]) -> FactValue {
    match kind {
        FactKind::Battery => FactValue::Battery(battery::resolve(ctx, raws)),
        FactKind::System => FactValue::System(system::resolve(ctx, raws)),
        FactKind::Bios => FactValue::Bios(bios::resolve(ctx, raws)),
        FactKind::Baseboard => FactValue::Baseboard(baseboard::resolve(ctx, raws)),
        FactKind::Chassis => FactValue::Chassis(chassis::resolve(ctx, raws)),
        FactKind::Usb => FactValue::Usb(usb::resolve(ctx, raws)),
        FactKind::Printers => FactValue::Printers(printer::resolve(ctx, raws)),
        FactKind::VirtualMachines => FactValue::VirtualMachines(vbox::resolve(ctx, raws)),
    }
}

/// Text of the first successful result from `id`.
pub(crate) fn text_of(raws: &[RawProbeResult], id: SourceId) -> Option<&str> {
    raws.iter()
        .filter(|r| r.source_id == id)
        .find_map(RawProbeResult::text)
}

/// Successful results with their ids, in input order.
pub(crate) fn successes(raws: &[RawProbeResult]) -> impl Iterator<Item = (SourceId, &str)> {
    raws.iter()
        .filter_map(|r| r.text().map(|text| (r.source_id, text)))
}

/// Drops the angle brackets, quotes and tree bars of `ioreg` output so its
/// `"key" = <"value">` lines parse as plain `key = value`.
pub(crate) fn strip_ioreg(text: &str) -> String {
    text.replace(['<', '>', '"', '|'], "")
}

/// First non-empty device list, in input order.
pub(crate) fn first_non_empty<T, F>(raws: &[RawProbeResult], mut parse: F) -> Vec<T>
where
    F: FnMut(SourceId, &str) -> Vec<T>,
{
    successes(raws)
        .map(|(id, text)| parse(id, text))
        .find(|list| !list.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::TimeZone;

    use super::*;
    use crate::error::ProbeError;

    pub fn ctx(platform: PlatformFamily) -> FactContext {
        FactContext::new(platform, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    pub fn ok(id: SourceId, text: &str) -> RawProbeResult {
        RawProbeResult::ok(id, text)
    }

    pub fn failed(id: SourceId) -> RawProbeResult {
        RawProbeResult::failed(
            id,
            ProbeError::ExitStatus {
                program: "fixture".into(),
                status: "exit status: 1".into(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn every_kind_resolves_to_defaults_without_input() {
        for platform in PlatformFamily::ALL {
            let ctx = ctx(platform);
            for kind in FactKind::ALL {
                let value = resolve(kind, &ctx, &[]);
                assert_eq!(value.kind(), kind);
                if platform != PlatformFamily::SunOs && platform != PlatformFamily::Darwin {
                    assert_eq!(value, FactValue::default_for(kind), "{platform} {kind}");
                }
            }
        }
    }

    #[test]
    fn default_records_serialize_every_field() {
        let ctx = ctx(PlatformFamily::Linux);
        let json = serde_json::to_value(match resolve(FactKind::Battery, &ctx, &[]) {
            FactValue::Battery(b) => b,
            other => panic!("unexpected {other:?}"),
        })
        .unwrap();
        assert_eq!(json.as_object().unwrap().len(), 16);
        assert_eq!(json["acConnected"], true);
        assert!(json["timeRemaining"].is_null());
    }

    #[test]
    fn failures_are_ignored() {
        let raws = [failed(SourceId::Lsusb)];
        assert_eq!(text_of(&raws, SourceId::Lsusb), None);
        let raws = [failed(SourceId::Lsusb), ok(SourceId::Lsusb, "x")];
        assert_eq!(text_of(&raws, SourceId::Lsusb), Some("x"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let raws = [
            ok(
                SourceId::DmidecodeSystem,
                "Manufacturer: LENOVO\nProduct Name: 20XW\nSerial Number: PF1\nUUID: ABC-DEF",
            ),
            ok(SourceId::SysfsDmi, "product_sku: LENOVO_MT_20XW\n"),
        ];
        let ctx = ctx(PlatformFamily::Linux);
        let render = || match resolve(FactKind::System, &ctx, &raws) {
            FactValue::System(record) => serde_json::to_string(&record).unwrap(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(render(), render());
    }
}
