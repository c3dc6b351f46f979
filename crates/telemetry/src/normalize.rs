//! Value normalization rules shared by every platform.
//!
//! Each helper states its zero/absent behavior explicitly so callers never
//! lean on falsy-value tricks.

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Parses the leading integer of `s`, ignoring anything after it
/// (`"2048MB"` is 2048, `" -5 C"` is -5, `"MB"` is `None`).
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|v| v * sign)
}

/// Parses the leading decimal number of `s` (`"4.19.128-microsoft"` is 4.19).
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => seen_dot = true,
            '-' | '+' if i == 0 => {}
            _ => break,
        }
    }
    s[..end].parse().ok()
}

/// Keeps only the digits of `s` and parses them (`"{10}"` is 10).
pub fn parse_digits(s: &str) -> Option<u32> {
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Non-negative leading integer; negative or missing values are `None`.
pub fn parse_count(s: &str) -> Option<u64> {
    parse_int_prefix(s).and_then(|v| u64::try_from(v).ok())
}

/// Returns `primary` unless it is zero, in which case `fallback`.
pub fn prefer_nonzero(primary: f64, fallback: f64) -> f64 {
    if primary != 0.0 { primary } else { fallback }
}

// ---------------------------------------------------------------------------
// Battery
// ---------------------------------------------------------------------------

/// `"mWh"` when a voltage is known, `"mAh"` otherwise.
pub fn capacity_unit(voltage: f64) -> &'static str {
    if voltage > 0.0 { "mWh" } else { "mAh" }
}

/// Scales a raw capacity by `voltage` (1 when unknown) and rounds to whole
/// units. Negative or non-finite inputs clamp to zero.
pub fn scale_capacity(raw: f64, voltage: f64) -> u64 {
    let factor = if voltage > 0.0 { voltage } else { 1.0 };
    let scaled = (raw * factor).round();
    if scaled.is_finite() && scaled > 0.0 {
        scaled as u64
    } else {
        0
    }
}

/// Clamps any percent-like value into `[0, 100]`.
pub fn clamp_percent(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u32
}

/// `round(100 × current / max)`, or `None` when `max` is zero.
pub fn percent_from_capacity(current: u64, max: u64) -> Option<u32> {
    if max == 0 {
        return None;
    }
    Some(clamp_percent(100.0 * current as f64 / max as f64))
}

/// Minutes left on battery.
///
/// Uses `energy / power` when both are non-zero, otherwise
/// `current_capacity / current`, otherwise `None` (unknown, unlike `Some(0)`).
pub fn time_remaining(energy: u64, power: u64, current: u64, current_capacity: u64) -> Option<i64> {
    if energy > 0 && power > 0 {
        return Some((energy as f64 / power as f64 * 60.0).floor() as i64);
    }
    if current > 0 && current_capacity > 0 {
        return Some((current_capacity as f64 / current as f64 * 60.0).floor() as i64);
    }
    None
}

/// Charging state derived from a `Win32_Battery.BatteryStatus` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeState {
    pub is_charging: bool,
    pub ac_connected: bool,
}

/// Maps a Windows `BatteryStatus` code.
///
/// | code | meaning |
/// |---|---|
/// | 1 | discharging |
/// | 2 | on AC |
/// | 3 | fully charged |
/// | 4, 5 | low, critical |
/// | 6..=9 | charging (normal, high, low, critical) |
/// | 10 | undefined |
/// | 11 | partially charged |
///
/// Any code other than discharging or full also counts as charging while the
/// charge is below 100%.
pub fn windows_charge_state(status: i64, percent: u32) -> ChargeState {
    let is_charging =
        (6..=9).contains(&status) || status == 11 || (status != 1 && status != 3 && percent < 100);
    ChargeState {
        is_charging,
        ac_connected: is_charging || status == 2,
    }
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Vendor marker meaning "no data" in SMBIOS strings.
pub const PLACEHOLDER: &str = "o.e.m.";

pub fn is_placeholder(value: &str) -> bool {
    value.to_ascii_lowercase().contains(PLACEHOLDER)
}

/// Drops empty and placeholder strings so the field default applies.
pub fn scrub(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && !is_placeholder(v))
}

/// SMBIOS chassis type names, indexed by code - 1.
const CHASSIS_TYPES: [&str; 36] = [
    "Other",
    "Unknown",
    "Desktop",
    "Low Profile Desktop",
    "Pizza Box",
    "Mini Tower",
    "Tower",
    "Portable",
    "Laptop",
    "Notebook",
    "Hand Held",
    "Docking Station",
    "All in One",
    "Sub Notebook",
    "Space-Saving",
    "Lunch Box",
    "Main System Chassis",
    "Expansion Chassis",
    "SubChassis",
    "Bus Expansion Chassis",
    "Peripheral Chassis",
    "Storage Chassis",
    "Rack Mount Chassis",
    "Sealed-Case PC",
    "Multi-System Chassis",
    "Compact PCI",
    "Advanced TCA",
    "Blade",
    "Blade Enclosure",
    "Tablet",
    "Convertible",
    "Detachable",
    "IoT Gateway",
    "Embedded PC",
    "Mini PC",
    "Stick PC",
];

/// Name for an SMBIOS chassis type code (1..=36).
pub fn chassis_type_name(code: u32) -> Option<&'static str> {
    let index = usize::try_from(code).ok()?.checked_sub(1)?;
    CHASSIS_TYPES.get(index).copied()
}

/// Name for a `Win32_Printer.PrinterStatus` code (1..=7).
pub fn windows_printer_status(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Other"),
        2 => Some("Unknown"),
        3 => Some("Idle"),
        4 => Some("Printing"),
        5 => Some("Warmup"),
        6 => Some("Stopped Printing"),
        7 => Some("Offline"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Canonicalizes a firmware date to `YYYY-MM-DD`.
///
/// Understands `MM/DD/YYYY`, `MM/DD/YY`, `YYYY-MM-DD` and `DD.MM.YYYY`;
/// anything else is returned trimmed but otherwise unchanged.
pub fn canonical_date(raw: &str) -> String {
    let raw = raw.trim();
    let two_digit_year = raw
        .rsplit('/')
        .next()
        .is_some_and(|year| raw.contains('/') && year.len() == 2);
    let formats: &[&str] = if two_digit_year {
        &["%m/%d/%y"]
    } else {
        &["%m/%d/%Y", "%Y-%m-%d", "%d.%m.%Y"]
    };
    formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Converts a CIM datetime (`20200101000000.000000+000`) to `YYYY-MM-DD`.
/// Shorter values are returned unchanged.
pub fn cim_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 10 && raw.is_char_boundary(8) && raw[..8].bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..8])
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_prefix_behaves_like_leading_parse() {
        assert_eq!(parse_int_prefix("2048MB"), Some(2048));
        assert_eq!(parse_int_prefix("  42 "), Some(42));
        assert_eq!(parse_int_prefix("-1"), Some(-1));
        assert_eq!(parse_int_prefix("MB"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn float_prefix_stops_at_second_dot() {
        assert_eq!(parse_float_prefix("4.19.128-microsoft-standard"), Some(4.19));
        assert_eq!(parse_float_prefix("5.15.90.1-microsoft-standard-WSL2"), Some(5.15));
        assert_eq!(parse_float_prefix("abc"), None);
    }

    #[test]
    fn digits_only() {
        assert_eq!(parse_digits("{10}"), Some(10));
        assert_eq!(parse_digits(""), None);
    }

    #[test]
    fn capacity_unit_rule() {
        assert_eq!(capacity_unit(11.4), "mWh");
        assert_eq!(capacity_unit(0.0), "mAh");
    }

    #[test]
    fn scale_capacity_defaults_voltage_to_one() {
        assert_eq!(scale_capacity(4000.0, 0.0), 4000);
        assert_eq!(scale_capacity(4000.0, 11.55), 46200);
        assert_eq!(scale_capacity(-3.0, 1.0), 0);
    }

    #[test]
    fn percent_is_guarded_and_bounded() {
        assert_eq!(percent_from_capacity(50, 0), None);
        assert_eq!(percent_from_capacity(1, 3), Some(33));
        assert_eq!(percent_from_capacity(120, 100), Some(100));
        assert_eq!(clamp_percent(-4.0), 0);
        assert_eq!(clamp_percent(f64::NAN), 0);
    }

    #[test]
    fn remaining_time_rules() {
        assert_eq!(time_remaining(6000, 3000, 0, 0), Some(120));
        assert_eq!(time_remaining(0, 0, 500, 1000), Some(120));
        assert_eq!(time_remaining(6000, 0, 500, 1000), Some(120));
        assert_eq!(time_remaining(0, 0, 0, 1000), None);
    }

    #[test]
    fn windows_status_table() {
        let discharging = windows_charge_state(1, 80);
        assert!(!discharging.is_charging && !discharging.ac_connected);

        let on_ac_full = windows_charge_state(2, 100);
        assert!(!on_ac_full.is_charging && on_ac_full.ac_connected);

        let on_ac_partial = windows_charge_state(2, 70);
        assert!(on_ac_partial.is_charging && on_ac_partial.ac_connected);

        let full = windows_charge_state(3, 90);
        assert!(!full.is_charging);

        for code in [6, 7, 8, 9, 11] {
            assert!(windows_charge_state(code, 100).is_charging, "code {code}");
        }
    }

    #[test]
    fn placeholder_scrubbing() {
        assert_eq!(scrub(Some("To Be Filled By O.E.M.".into())), None);
        assert_eq!(scrub(Some("  ".into())), None);
        assert_eq!(scrub(Some("LENOVO".into())), Some("LENOVO".into()));
    }

    #[test]
    fn chassis_table_covers_all_codes() {
        assert_eq!(chassis_type_name(0), None);
        assert_eq!(chassis_type_name(3), Some("Desktop"));
        assert_eq!(chassis_type_name(10), Some("Notebook"));
        assert_eq!(chassis_type_name(36), Some("Stick PC"));
        assert_eq!(chassis_type_name(37), None);
    }

    #[test]
    fn printer_status_table() {
        assert_eq!(windows_printer_status(3), Some("Idle"));
        assert_eq!(windows_printer_status(0), None);
    }

    #[test]
    fn date_canonicalization() {
        assert_eq!(canonical_date("06/27/2016"), "2016-06-27");
        assert_eq!(canonical_date("06/27/16"), "2016-06-27");
        assert_eq!(canonical_date("2021-03-04"), "2021-03-04");
        assert_eq!(canonical_date("04.03.2021"), "2021-03-04");
        assert_eq!(canonical_date(" sometime "), "sometime");
        assert_eq!(cim_date("20200115000000.000000+000"), "2020-01-15");
        assert_eq!(cim_date("2020"), "2020");
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn clamp_percent_is_bounded(value in proptest::num::f64::ANY) {
            prop_assert!(clamp_percent(value) <= 100);
        }

        #[test]
        fn percent_from_capacity_is_bounded(current in any::<u64>(), max in any::<u64>()) {
            match percent_from_capacity(current, max) {
                None => prop_assert_eq!(max, 0),
                Some(percent) => prop_assert!(percent <= 100),
            }
        }

        #[test]
        fn scaled_capacity_never_negative(raw in proptest::num::f64::ANY, voltage in -50.0f64..50.0) {
            let scaled = scale_capacity(raw, voltage);
            if raw.is_nan() || raw <= 0.0 {
                prop_assert_eq!(scaled, 0);
            }
        }
    }
}
