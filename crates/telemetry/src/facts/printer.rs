use sysfacts_protocol::PrinterRecord;

use super::{FactContext, first_non_empty};
use crate::catalog::SourceId;
use crate::grammar::{Delimiter, KvLines, preamble, split_blank_lines, split_on_marker};
use crate::normalize::{parse_int_prefix, windows_printer_status};
use crate::probe::RawProbeResult;

pub fn resolve(_ctx: &FactContext, raws: &[RawProbeResult]) -> Vec<PrinterRecord> {
    first_non_empty(raws, |id, text| match id {
        SourceId::CupsPrinters => parse_cups(text),
        SourceId::Lpstat => parse_lpstat(text),
        SourceId::PrinterProfile => parse_printer_profile(text),
        SourceId::WinPrinters => parse_windows(text),
        _ => Vec::new(),
    })
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// ---------------------------------------------------------------------------
// CUPS
// ---------------------------------------------------------------------------

fn is_cups_printer(line: &str) -> bool {
    line.starts_with("<Printer ") || line.starts_with("<DefaultPrinter ")
}

/// `/etc/cups/printers.conf`. Printers without an `Info` line are skipped.
pub fn parse_cups(text: &str) -> Vec<PrinterRecord> {
    let version = preamble(text, is_cups_printer)
        .into_iter()
        .find_map(|line| line.split_once(" CUPS v"))
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default();

    split_on_marker(text, is_cups_printer)
        .iter()
        .filter_map(|block| {
            let kv = KvLines::from_lines(block[1..].iter().copied(), &[Delimiter::Whitespace]);
            let name = kv.string("Info")?;
            let model = block[0]
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .trim_end_matches('>');
            Some(PrinterRecord {
                id: kv
                    .get("PrinterId")
                    .and_then(parse_int_prefix)
                    .and_then(|id| u32::try_from(id).ok()),
                name,
                model: model.to_string(),
                uri: kv.string("DeviceURI"),
                uuid: kv.string("UUID"),
                status: kv.string("State"),
                local: kv
                    .get("Location")
                    .is_some_and(|l| starts_with_ignore_case(l, "local")),
                default: block[0].starts_with("<DefaultPrinter ").then_some(true),
                shared: kv
                    .get("Shared")
                    .is_some_and(|s| starts_with_ignore_case(s, "yes")),
                engine: "CUPS".into(),
                engine_version: version.clone(),
            })
        })
        .collect()
}

/// `lpstat -lp`, used when CUPS' config is unreadable.
pub fn parse_lpstat(text: &str) -> Vec<PrinterRecord> {
    split_on_marker(text, |l| l.starts_with("printer "))
        .iter()
        .enumerate()
        .map(|(i, block)| {
            // printer HP_LaserJet is idle.  enabled since ...
            let header = block[0];
            let kv = KvLines::from_lines(block[1..].iter().copied(), &[Delimiter::Colon]);
            let status = if header.contains(" idle") {
                "idle"
            } else if header.contains(" printing") {
                "printing"
            } else {
                "unknown"
            };
            PrinterRecord {
                id: u32::try_from(i + 1).ok(),
                name: kv.string("Description").unwrap_or_default(),
                model: header.split_whitespace().nth(1).unwrap_or_default().to_string(),
                uri: None,
                uuid: None,
                status: Some(status.into()),
                local: kv
                    .get("Location")
                    .is_some_and(|l| starts_with_ignore_case(l, "local")),
                default: None,
                shared: false,
                engine: String::new(),
                engine_version: String::new(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// macOS
// ---------------------------------------------------------------------------

/// `system_profiler SPPrintersDataType -json`.
pub fn parse_printer_profile(text: &str) -> Vec<PrinterRecord> {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(text) else {
        return Vec::new();
    };
    let Some(printers) = json["SPPrintersDataType"].as_array() else {
        return Vec::new();
    };
    printers
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let field = |key: &str| p[key].as_str().unwrap_or_default();
            let uri = field("uri");
            PrinterRecord {
                id: u32::try_from(i).ok(),
                name: field("_name").to_string(),
                model: uri.rsplit('/').next().unwrap_or_default().to_string(),
                uri: Some(uri.to_string()).filter(|u| !u.is_empty()),
                uuid: None,
                status: Some(field("status").to_string()).filter(|s| !s.is_empty()),
                local: field("printserver") == "local",
                default: Some(field("default") == "yes"),
                shared: field("shared") == "yes",
                engine: String::new(),
                engine_version: String::new(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// `Win32_Printer`. Entries with neither a name nor a driver are skipped.
pub fn parse_windows(text: &str) -> Vec<PrinterRecord> {
    split_blank_lines(text)
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            let kv = KvLines::from_lines(block.iter().copied(), &[Delimiter::Colon]);
            let name = kv.string("Name").unwrap_or_default();
            let model = kv.string("DriverName").unwrap_or_default();
            if name.is_empty() && model.is_empty() {
                return None;
            }
            let flag = |key: &str| kv.get(key).is_some_and(|v| v.eq_ignore_ascii_case("true"));
            Some(PrinterRecord {
                id: u32::try_from(i).ok(),
                name,
                model,
                uri: None,
                uuid: None,
                status: kv
                    .get("PrinterStatus")
                    .and_then(parse_int_prefix)
                    .and_then(windows_printer_status)
                    .map(str::to_string),
                local: flag("Local"),
                default: Some(flag("Default")),
                shared: flag("Shared"),
                engine: String::new(),
                engine_version: String::new(),
            })
        })
        .collect()
}
