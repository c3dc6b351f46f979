//! Raspberry Pi identification from `/proc/cpuinfo` revision codes.

use sysfacts_protocol::RaspberryInfo;

use crate::grammar::{Delimiter, KvLines};

/// A decoded Pi board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiBoard {
    /// The cpuinfo `Model` line, e.g. `Raspberry Pi 4 Model B Rev 1.4`.
    pub model: String,
    pub serial: String,
    /// Raw revision code as printed by the kernel.
    pub revision_code: String,
    pub memory_mb: u32,
    pub manufacturer: String,
    pub processor: String,
    pub board_type: String,
    pub revision: String,
}

impl PiBoard {
    pub fn info(&self) -> RaspberryInfo {
        RaspberryInfo {
            manufacturer: self.manufacturer.clone(),
            processor: self.processor.clone(),
            board_type: self.board_type.clone(),
            revision: self.revision.clone(),
        }
    }
}

const MANUFACTURERS: [&str; 6] = [
    "Sony UK",
    "Egoman",
    "Embest",
    "Sony Japan",
    "Embest",
    "Stadium",
];

const PROCESSORS: [&str; 5] = ["BCM2835", "BCM2836", "BCM2837", "BCM2711", "BCM2712"];

// Gaps are codes the foundation never assigned.
const TYPES: [&str; 27] = [
    "A", "B", "A+", "B+", "2B", "Alpha", "CM1", "", "3B", "Zero", "CM3", "", "Zero W", "3B+",
    "3A+", "Internal", "CM3+", "4B", "Zero 2 W", "400", "CM4", "CM4S", "", "5", "CM5", "500",
    "CM5 Lite",
];

/// Pre-2014 boards: (code, type, revision, memory MB, manufacturer).
const OLD_STYLE: [(&str, &str, &str, u32, &str); 17] = [
    ("0002", "B", "1.0", 256, "Egoman"),
    ("0003", "B", "1.0", 256, "Egoman"),
    ("0004", "B", "2.0", 256, "Sony UK"),
    ("0005", "B", "2.0", 256, "Qisda"),
    ("0006", "B", "2.0", 256, "Egoman"),
    ("0007", "A", "2.0", 256, "Egoman"),
    ("0008", "A", "2.0", 256, "Sony UK"),
    ("0009", "A", "2.0", 256, "Qisda"),
    ("000d", "B", "2.0", 512, "Egoman"),
    ("000e", "B", "2.0", 512, "Sony UK"),
    ("000f", "B", "2.0", 512, "Egoman"),
    ("0010", "B+", "1.0", 512, "Sony UK"),
    ("0011", "CM1", "1.0", 512, "Sony UK"),
    ("0012", "A+", "1.1", 256, "Sony UK"),
    ("0013", "B+", "1.2", 512, "Embest"),
    ("0014", "CM1", "1.0", 512, "Embest"),
    ("0015", "A+", "1.1", 256, "Embest"),
];

fn lookup(table: &[&'static str], index: u32) -> &'static str {
    table.get(index as usize).copied().unwrap_or_default()
}

/// Decodes `/proc/cpuinfo` when it describes a Raspberry Pi.
///
/// Requires a `Model` line naming a Raspberry Pi and a `Revision` line.
pub fn decode_cpuinfo(text: &str) -> Option<PiBoard> {
    let kv = KvLines::parse(text, Delimiter::Colon);
    let model = kv.get("model")?;
    if !model.to_ascii_lowercase().contains("raspberry") {
        return None;
    }
    let revision_code = kv.get("revision")?.to_ascii_lowercase();
    let mut board = decode_revision(&revision_code)?;
    board.model = model.to_string();
    board.serial = kv.string("serial").unwrap_or_default();
    Some(board)
}

/// Decodes a revision code in either the old 4-digit or the new bit-packed
/// scheme. Over-voltage warranty bits in old codes are ignored.
pub fn decode_revision(code: &str) -> Option<PiBoard> {
    let code = code.trim().to_ascii_lowercase();
    let value = u32::from_str_radix(&code, 16).ok()?;

    if value & (1 << 23) != 0 {
        return Some(PiBoard {
            model: String::new(),
            serial: String::new(),
            revision_code: code,
            memory_mb: 256 << ((value >> 20) & 0x7),
            manufacturer: lookup(&MANUFACTURERS, (value >> 16) & 0xF).into(),
            processor: lookup(&PROCESSORS, (value >> 12) & 0xF).into(),
            board_type: lookup(&TYPES, (value >> 4) & 0xFF).into(),
            revision: format!("1.{}", value & 0xF),
        });
    }

    let tail = &code[code.len().saturating_sub(4)..];
    let (_, board_type, revision, memory_mb, manufacturer) =
        OLD_STYLE.iter().find(|(c, ..)| *c == tail)?;
    Some(PiBoard {
        model: String::new(),
        serial: String::new(),
        revision_code: code.clone(),
        memory_mb: *memory_mb,
        manufacturer: (*manufacturer).into(),
        processor: "BCM2835".into(),
        board_type: (*board_type).into(),
        revision: (*revision).into(),
    })
}
