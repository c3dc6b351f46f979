//! Battery parsers.
//!
//! Linux may expose several batteries; the first readable one becomes the
//! primary record and the rest go to `additional_batteries`. Windows does the
//! same with its WMI instances, skipping undefined ones for the primary slot.

use sysfacts_protocol::{BatteryRecord, PlatformFamily};

use super::{FactContext, successes, text_of};
use crate::catalog::SourceId;
use crate::grammar::{Delimiter, KvLines, split_blank_lines, value_lines};
use crate::merge::{impl_merge, merge_all};
use crate::normalize::{
    capacity_unit, clamp_percent, parse_count, parse_int_prefix, percent_from_capacity,
    prefer_nonzero, scale_capacity, time_remaining, windows_charge_state,
};

/// Battery fields as reported by a single source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatteryPartial {
    pub has_battery: Option<bool>,
    pub cycle_count: Option<u32>,
    pub is_charging: Option<bool>,
    pub designed_capacity: Option<u64>,
    pub max_capacity: Option<u64>,
    pub current_capacity: Option<u64>,
    pub voltage: Option<f64>,
    pub capacity_unit: Option<String>,
    pub percent: Option<u32>,
    pub time_remaining: Option<i64>,
    pub ac_connected: Option<bool>,
    pub battery_type: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub serial: Option<String>,
}

impl_merge!(BatteryPartial {
    has_battery,
    cycle_count,
    is_charging,
    designed_capacity,
    max_capacity,
    current_capacity,
    voltage,
    capacity_unit,
    percent,
    time_remaining,
    ac_connected,
    battery_type,
    model,
    manufacturer,
    serial,
});

impl BatteryPartial {
    /// Fills unset fields with record defaults.
    pub fn into_record(self) -> BatteryRecord {
        let defaults = BatteryRecord::default();
        BatteryRecord {
            has_battery: self.has_battery.unwrap_or(defaults.has_battery),
            cycle_count: self.cycle_count.or(defaults.cycle_count),
            is_charging: self.is_charging.unwrap_or(defaults.is_charging),
            designed_capacity: self.designed_capacity.unwrap_or(defaults.designed_capacity),
            max_capacity: self.max_capacity.or(defaults.max_capacity),
            current_capacity: self.current_capacity.or(defaults.current_capacity),
            voltage: self.voltage.unwrap_or(defaults.voltage),
            capacity_unit: self.capacity_unit.unwrap_or(defaults.capacity_unit),
            percent: self.percent.map(|p| p.min(100)).or(defaults.percent),
            time_remaining: self.time_remaining,
            ac_connected: self.ac_connected.unwrap_or(defaults.ac_connected),
            battery_type: self.battery_type.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            manufacturer: self.manufacturer.unwrap_or_default(),
            serial: self.serial.unwrap_or_default(),
            additional_batteries: Vec::new(),
        }
    }
}

pub fn resolve(ctx: &FactContext, raws: &[crate::probe::RawProbeResult]) -> BatteryRecord {
    match ctx.platform {
        PlatformFamily::Linux => resolve_linux(raws),
        PlatformFamily::Darwin => resolve_darwin(raws),
        PlatformFamily::Windows => resolve_windows(raws),
        p if p.is_bsd() => text_of(raws, SourceId::SysctlBattery)
            .map(parse_sysctl)
            .unwrap_or_default(),
        _ => BatteryRecord::default(),
    }
}

fn with_additional(mut batteries: Vec<BatteryRecord>) -> BatteryRecord {
    if batteries.is_empty() {
        return BatteryRecord::default();
    }
    let mut primary = batteries.remove(0);
    primary.additional_batteries = batteries;
    primary
}

// ---------------------------------------------------------------------------
// Linux (sysfs power_supply)
// ---------------------------------------------------------------------------

fn resolve_linux(raws: &[crate::probe::RawProbeResult]) -> BatteryRecord {
    let ac_online = successes(raws)
        .find(|(id, _)| matches!(id, SourceId::AcOnline(_)))
        .is_some_and(|(_, text)| text.trim() == "1");

    let batteries = successes(raws)
        .filter(|(id, _)| matches!(id, SourceId::BatteryUevent(_)))
        .map(|(_, text)| {
            let mut partial = parse_uevent(text);
            partial.ac_connected = Some(ac_online || partial.is_charging == Some(true));
            partial.into_record()
        })
        .collect();

    with_additional(batteries)
}

/// Parses a `/sys/class/power_supply/BAT*/uevent` file.
///
/// Charge counters (µAh) are scaled by the current voltage; when the battery
/// only reports energy counters (µWh) those are used as-is.
pub fn parse_uevent(text: &str) -> BatteryPartial {
    let kv = KvLines::parse(text, Delimiter::Equals);
    let num = |key: &str| kv.get(key).and_then(parse_count).unwrap_or(0);

    let is_charging = kv
        .get("POWER_SUPPLY_STATUS")
        .is_some_and(|s| s.eq_ignore_ascii_case("charging"));
    let voltage = num("POWER_SUPPLY_VOLTAGE_NOW") as f64 / 1_000_000.0;
    let min_design_voltage = num("POWER_SUPPLY_VOLTAGE_MIN_DESIGN") as f64 / 1_000_000.0;

    let mut max = scale_capacity(num("POWER_SUPPLY_CHARGE_FULL") as f64 / 1000.0, voltage);
    let mut designed = scale_capacity(
        num("POWER_SUPPLY_CHARGE_FULL_DESIGN") as f64 / 1000.0,
        prefer_nonzero(min_design_voltage, voltage),
    );
    let mut current = scale_capacity(num("POWER_SUPPLY_CHARGE_NOW") as f64 / 1000.0, voltage);

    if max == 0 {
        let energy_full = num("POWER_SUPPLY_ENERGY_FULL") as f64 / 1000.0;
        let energy_design = num("POWER_SUPPLY_ENERGY_FULL_DESIGN") as f64 / 1000.0;
        max = scale_capacity(energy_full, 1.0);
        designed = scale_capacity(prefer_nonzero(energy_design, energy_full), 1.0);
        current = scale_capacity(num("POWER_SUPPLY_ENERGY_NOW") as f64 / 1000.0, 1.0);
    }

    let has_capacity = max > 0 && current > 0;
    let percent = match kv.get("POWER_SUPPLY_CAPACITY").and_then(parse_int_prefix) {
        Some(reported) => clamp_percent(reported as f64),
        None if has_capacity => percent_from_capacity(current, max).unwrap_or(0),
        None => 0,
    };

    BatteryPartial {
        has_battery: Some(has_capacity || is_charging),
        cycle_count: Some(u32::try_from(num("POWER_SUPPLY_CYCLE_COUNT")).unwrap_or(u32::MAX)),
        is_charging: Some(is_charging),
        designed_capacity: Some(designed),
        max_capacity: Some(max),
        current_capacity: Some(current),
        voltage: Some(voltage),
        capacity_unit: Some(capacity_unit(voltage).to_string()),
        percent: Some(percent),
        time_remaining: time_remaining(
            num("POWER_SUPPLY_ENERGY_NOW"),
            num("POWER_SUPPLY_POWER_NOW"),
            num("POWER_SUPPLY_CURRENT_NOW"),
            current,
        ),
        ac_connected: None,
        battery_type: kv.string("POWER_SUPPLY_TECHNOLOGY"),
        model: kv.string("POWER_SUPPLY_MODEL_NAME"),
        manufacturer: kv.string("POWER_SUPPLY_MANUFACTURER"),
        serial: kv.string("POWER_SUPPLY_SERIAL_NUMBER"),
    }
}

// ---------------------------------------------------------------------------
// macOS (pmset + ioreg)
// ---------------------------------------------------------------------------

fn resolve_darwin(raws: &[crate::probe::RawProbeResult]) -> BatteryRecord {
    let pmset = text_of(raws, SourceId::PmsetBattery).map(parse_pmset);
    let ioreg = text_of(raws, SourceId::IoregBattery).map(parse_ioreg);
    if pmset.is_none() && ioreg.is_none() {
        return BatteryRecord::default();
    }

    // pmset reflects the live charger state, so it outranks ioreg.
    let mut merged = merge_all([pmset.unwrap_or_default(), ioreg.unwrap_or_default()]);
    let max = merged.max_capacity.unwrap_or(0);
    let current = merged.current_capacity.unwrap_or(0);

    if max > 0 && current > 0 {
        merged.has_battery = Some(true);
        merged.battery_type = Some("Li-ion".into());
        merged.percent = merged.percent.or_else(|| percent_from_capacity(current, max));
        if merged.is_charging == Some(true) {
            merged.time_remaining = None;
        }
    } else {
        merged.percent = None;
        merged.time_remaining = None;
    }
    merged.into_record()
}

/// Parses `ioreg -n AppleSmartBattery -r`. Capacities are mAh, voltage mV.
pub fn parse_ioreg(text: &str) -> BatteryPartial {
    let cleaned = text.replace(['"', '|'], "");
    let kv = KvLines::parse(&cleaned, Delimiter::Equals);
    let num = |key: &str| kv.get(key).and_then(parse_count).unwrap_or(0);
    let yes = |key: &str| kv.get(key).map(|v| v.eq_ignore_ascii_case("yes"));

    let voltage = num("Voltage") as f64 / 1000.0;
    let is_charging = yes("IsCharging");

    BatteryPartial {
        cycle_count: Some(u32::try_from(num("CycleCount")).unwrap_or(u32::MAX)),
        is_charging,
        designed_capacity: Some(scale_capacity(num("DesignCapacity") as f64, voltage)),
        max_capacity: Some(scale_capacity(num("AppleRawMaxCapacity") as f64, voltage)),
        current_capacity: Some(scale_capacity(num("AppleRawCurrentCapacity") as f64, voltage)),
        voltage: Some(voltage),
        capacity_unit: Some(capacity_unit(voltage).to_string()),
        time_remaining: kv.get("TimeRemaining").and_then(parse_int_prefix),
        ac_connected: yes("ExternalConnected").or(is_charging),
        manufacturer: Some("Apple".into()),
        serial: kv.string("BatterySerialNumber"),
        ..BatteryPartial::default()
    }
}

/// Parses the `InternalBattery` line of `pmset -g batt`, e.g.
/// ` -InternalBattery-0 (id=4653155)\t51%; discharging; 4:05 remaining`.
pub fn parse_pmset(text: &str) -> BatteryPartial {
    let Some(line) = text.lines().find(|l| l.contains("InternalBattery")) else {
        return BatteryPartial::default();
    };
    let detail = line
        .split_once('\t')
        .or_else(|| line.split_once(')'))
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    let mut parts = detail.split(';').map(str::trim);

    let percent = parts
        .next()
        .map(|p| p.trim_end_matches('%'))
        .and_then(|p| p.parse::<f64>().ok())
        .map(clamp_percent);
    let state = parts.next().filter(|s| !s.is_empty());

    BatteryPartial {
        percent,
        is_charging: state.map(|s| s == "charging"),
        ac_connected: state.map(|s| s != "discharging"),
        ..BatteryPartial::default()
    }
}

// ---------------------------------------------------------------------------
// Windows (WMI)
// ---------------------------------------------------------------------------

fn resolve_windows(raws: &[crate::probe::RawProbeResult]) -> BatteryRecord {
    let Some(text) = text_of(raws, SourceId::WinBattery) else {
        return BatteryRecord::default();
    };
    let per_index = |id: SourceId| -> Vec<u64> {
        text_of(raws, id)
            .map(|t| {
                value_lines(t)
                    .into_iter()
                    .map(|v| parse_count(v).unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default()
    };
    let designed = per_index(SourceId::WinBatteryStaticData);
    let full_charged = per_index(SourceId::WinBatteryFullCharged);

    let mut primary = None;
    let mut additional = Vec::new();
    for (i, block) in split_blank_lines(text).iter().enumerate() {
        let fallback_design = designed.get(i).copied().unwrap_or(0);
        let full_charge = full_charged.get(i).copied().unwrap_or(0);
        let Some((status, record)) = parse_win_battery(block, fallback_design, full_charge) else {
            continue;
        };
        if primary.is_none() && status > 0 && status != 10 {
            primary = Some(record);
        } else {
            additional.push(record);
        }
    }

    match primary {
        Some(mut primary) => {
            primary.additional_batteries = additional;
            primary
        }
        None => with_additional(additional),
    }
}

/// Parses one `Win32_Battery` instance. Returns `None` when the status is
/// not a non-negative number.
///
/// `FullChargedCapacity` outranks `DesignCapacity` for the maximum, while the
/// designed capacity prefers `Win32_Battery` over `BatteryStaticData`.
pub fn parse_win_battery(
    lines: &[&str],
    fallback_design: u64,
    full_charge: u64,
) -> Option<(i64, BatteryRecord)> {
    let kv = KvLines::from_lines(lines.iter().copied(), &[Delimiter::Colon]);
    let status = match kv.get("BatteryStatus") {
        None => 0,
        Some(s) => parse_int_prefix(s).filter(|v| *v >= 0)?,
    };

    let design = kv.get("DesignCapacity").and_then(parse_count);
    let max = if full_charge > 0 {
        full_charge
    } else {
        design.unwrap_or(0)
    };
    let voltage = kv
        .get("DesignVoltage")
        .and_then(parse_count)
        .unwrap_or(0) as f64
        / 1000.0;
    let percent = kv
        .get("EstimatedChargeRemaining")
        .and_then(parse_int_prefix)
        .map(|p| clamp_percent(p as f64))
        .unwrap_or(0);
    let state = windows_charge_state(status, percent);

    let partial = BatteryPartial {
        has_battery: Some(true),
        is_charging: Some(state.is_charging),
        designed_capacity: Some(design.unwrap_or(fallback_design)),
        max_capacity: Some(max),
        current_capacity: Some(max * u64::from(percent) / 100),
        voltage: Some(voltage),
        capacity_unit: Some(capacity_unit(voltage).to_string()),
        percent: Some(percent),
        ac_connected: Some(state.ac_connected),
        model: kv.string("DeviceID"),
        ..BatteryPartial::default()
    };
    Some((status, partial.into_record()))
}

// ---------------------------------------------------------------------------
// BSD (sysctl hw.acpi)
// ---------------------------------------------------------------------------

/// Parses `sysctl -i hw.acpi.battery hw.acpi.acline`.
///
/// ACPI exposes no capacities, so those stay `null` and the unit reads
/// `"unknown"`.
pub fn parse_sysctl(text: &str) -> BatteryRecord {
    let kv = KvLines::parse(text, Delimiter::Colon);
    let units = kv
        .get("hw.acpi.battery.units")
        .and_then(parse_count)
        .unwrap_or(0);
    let has_battery = units > 0;
    let ac_connected = kv.get("hw.acpi.acline") == Some("1");
    let percent = has_battery.then(|| {
        kv.get("hw.acpi.battery.life")
            .and_then(parse_int_prefix)
            .map(|p| clamp_percent(p as f64))
            .unwrap_or(0)
    });

    // Bit 1 of the ACPI battery state is "charging".
    let is_charging = has_battery
        && match kv.get("hw.acpi.battery.state").and_then(parse_int_prefix) {
            Some(state) if state >= 0 => state & 2 != 0,
            _ => ac_connected && percent.unwrap_or(0) < 100,
        };
    let time_remaining = kv
        .get("hw.acpi.battery.time")
        .and_then(parse_int_prefix)
        .filter(|t| has_battery && *t >= 0);

    BatteryRecord {
        has_battery,
        cycle_count: None,
        is_charging,
        max_capacity: None,
        current_capacity: None,
        capacity_unit: "unknown".into(),
        percent,
        time_remaining,
        ac_connected,
        ..BatteryRecord::default()
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn uevent_percent_stays_in_bounds(
            full in 0u64..20_000_000_000,
            now in 0u64..20_000_000_000,
            microvolts in 0u64..30_000_000,
            reported in proptest::option::of(-1_000i64..1_000),
        ) {
            let mut text = format!(
                "POWER_SUPPLY_CHARGE_FULL={full}\nPOWER_SUPPLY_CHARGE_NOW={now}\nPOWER_SUPPLY_VOLTAGE_NOW={microvolts}\n"
            );
            if let Some(reported) = reported {
                text.push_str(&format!("POWER_SUPPLY_CAPACITY={reported}\n"));
            }
            let b = parse_uevent(&text).into_record();
            prop_assert!(b.percent.unwrap_or(0) <= 100);
        }

        #[test]
        fn windows_percent_stays_in_bounds(
            status in 0i64..=11,
            remaining in -500i64..500,
            design in 0u64..1_000_000,
            full_charge in 0u64..1_000_000,
        ) {
            let block = [
                format!("BatteryStatus            : {status}"),
                format!("DesignCapacity           : {design}"),
                format!("EstimatedChargeRemaining : {remaining}"),
            ];
            let lines: Vec<&str> = block.iter().map(String::as_str).collect();
            let (_, b) = parse_win_battery(&lines, 0, full_charge).unwrap();
            prop_assert!(b.percent.unwrap_or(0) <= 100);
            prop_assert!(b.current_capacity.unwrap_or(0) <= b.max_capacity.unwrap_or(0));
        }
    }
}
