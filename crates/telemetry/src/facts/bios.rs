use sysfacts_protocol::{BiosRecord, PlatformFamily};

use super::{FactContext, successes};
use crate::catalog::SourceId;
use crate::grammar::{Delimiter, KvLines};
use crate::merge::{impl_merge, merge_all};
use crate::normalize::{canonical_date, cim_date, scrub};
use crate::probe::RawProbeResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiosPartial {
    pub vendor: Option<String>,
    pub version: Option<String>,
    pub release_date: Option<String>,
    pub revision: Option<String>,
    pub serial: Option<String>,
    pub language: Option<String>,
    pub features: Option<Vec<String>>,
}

impl_merge!(BiosPartial {
    vendor,
    version,
    release_date,
    revision,
    serial,
    language,
    features,
});

impl BiosPartial {
    pub fn into_record(self) -> BiosRecord {
        BiosRecord {
            vendor: scrub(self.vendor).unwrap_or_default(),
            version: scrub(self.version).unwrap_or_default(),
            release_date: self.release_date.unwrap_or_default(),
            revision: self.revision.unwrap_or_default(),
            serial: scrub(self.serial).unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            features: self.features.unwrap_or_default(),
        }
    }
}

pub fn resolve(ctx: &FactContext, raws: &[RawProbeResult]) -> BiosRecord {
    let fixed_vendor = match ctx.platform {
        PlatformFamily::Darwin => Some("Apple Inc."),
        PlatformFamily::SunOs => Some("Sun Microsystems"),
        _ => None,
    };
    let fixed = BiosPartial {
        vendor: fixed_vendor.map(str::to_string),
        ..BiosPartial::default()
    };
    let parsed = successes(raws).filter_map(|(id, text)| match id {
        SourceId::DmidecodeBios => Some(parse_dmidecode(text)),
        SourceId::SysfsDmi => Some(parse_sysfs(text)),
        SourceId::HardwareProfile => Some(parse_hardware_profile(text)),
        SourceId::WinBios => Some(parse_win_bios(text)),
        _ => None,
    });
    merge_all(std::iter::once(fixed).chain(parsed)).into_record()
}

/// `dmidecode -t bios`.
pub fn parse_dmidecode(text: &str) -> BiosPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    let features = text.contains("Characteristics:").then(|| {
        text.lines()
            .filter_map(|line| line.split_once(" is supported"))
            .map(|(feature, _)| feature.trim().to_string())
            .collect()
    });
    BiosPartial {
        vendor: kv.string("Vendor"),
        version: kv.string("Version"),
        release_date: kv.get("Release Date").map(canonical_date),
        revision: kv.string("BIOS Revision"),
        serial: None,
        language: kv
            .get("Currently Installed Language")
            .and_then(|l| l.split('|').next())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        features,
    }
}

/// `bios_*` files of the sysfs DMI table.
pub fn parse_sysfs(text: &str) -> BiosPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    BiosPartial {
        vendor: kv.string("bios_vendor"),
        version: kv.string("bios_version"),
        release_date: kv.get("bios_date").map(canonical_date),
        ..BiosPartial::default()
    }
}

/// `system_profiler SPHardwareDataType -json`; only the boot ROM version is
/// of interest, e.g. `"10151.101.3 (iBridge: 19.16.10744.0.0,0)"`.
pub fn parse_hardware_profile(text: &str) -> BiosPartial {
    let version = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|json| {
            json["SPHardwareDataType"][0]["boot_rom_version"]
                .as_str()
                .and_then(|v| v.split('(').next())
                .map(|v| v.trim().to_string())
        })
        .filter(|v| !v.is_empty());
    BiosPartial {
        version,
        ..BiosPartial::default()
    }
}

/// `Win32_BIOS`.
///
/// Older firmware packs vendor and version into `Description`, either as
/// `Phoenix ROM BIOS PLUS Version 1.10 A04` or
/// `BIOS Date: 06/27/16 17:50:16 Ver: 1.4.5`.
pub fn parse_win_bios(text: &str) -> BiosPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    let description = kv.get("Description").unwrap_or_default();

    let (vendor, version) = if let Some((vendor, version)) = description.split_once(" Version ") {
        (Some(vendor.trim().to_string()), Some(version.trim().to_string()))
    } else if let Some((_, version)) = description.split_once(" Ver: ") {
        (kv.string("Manufacturer"), Some(version.trim().to_string()))
    } else {
        (kv.string("Manufacturer"), kv.string("Version"))
    };

    BiosPartial {
        vendor,
        version,
        release_date: kv.get("ReleaseDate").map(cim_date),
        revision: kv.string("BuildNumber"),
        serial: kv.string("SerialNumber"),
        ..BiosPartial::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::test_support::{ctx, failed, ok};

    const DMIDECODE: &str = "\
# dmidecode 3.5
Handle 0x0000, DMI type 0, 26 bytes
BIOS Information
\tVendor: LENOVO
\tVersion: N32ET86W (1.62 )
\tRelease Date: 03/17/2023
\tAddress: 0xE0000
\tRuntime Size: 128 kB
\tROM Size: 32 MB
\tCharacteristics:
\t\tPCI is supported
\t\tPNP is supported
\t\tBIOS is upgradeable
\t\tBIOS shadowing is allowed
\t\tBoot from CD is supported
\t\tACPI is supported
\t\tUEFI is supported
\tBIOS Revision: 1.62
\tFirmware Revision: 1.33

Handle 0x0033, DMI type 13, 22 bytes
BIOS Language Information
\tLanguage Description Format: Abbreviated
\tInstallable Languages: 1
\t\ten|US|iso8859-1
\tCurrently Installed Language: en|US|iso8859-1
";

    #[test]
    fn dmidecode_bios() {
        let b = resolve(&ctx(PlatformFamily::Linux), &[ok(SourceId::DmidecodeBios, DMIDECODE)]);
        assert_eq!(b.vendor, "LENOVO");
        assert_eq!(b.version, "N32ET86W (1.62 )");
        assert_eq!(b.release_date, "2023-03-17");
        assert_eq!(b.revision, "1.62");
        assert_eq!(b.language, "en");
        assert_eq!(b.features, vec!["PCI", "PNP", "Boot from CD", "ACPI", "UEFI"]);
    }

    #[test]
    fn sysfs_fallback_with_short_year() {
        let sysfs = "bios_date: 12/01/21\nbios_vendor: American Megatrends Inc.\nbios_version: F.20\n";
        let b = resolve(
            &ctx(PlatformFamily::Linux),
            &[failed(SourceId::DmidecodeBios), ok(SourceId::SysfsDmi, sysfs)],
        );
        assert_eq!(b.vendor, "American Megatrends Inc.");
        assert_eq!(b.version, "F.20");
        assert_eq!(b.release_date, "2021-12-01");
        assert!(b.features.is_empty());
    }

    #[test]
    fn darwin_boot_rom() {
        let json = r#"{"SPHardwareDataType":[{"_name":"hardware_overview","boot_rom_version":"10151.101.3 (iBridge: 19.16.10744.0.0,0)","machine_model":"MacBookPro16,1"}]}"#;
        let b = resolve(&ctx(PlatformFamily::Darwin), &[ok(SourceId::HardwareProfile, json)]);
        assert_eq!(b.vendor, "Apple Inc.");
        assert_eq!(b.version, "10151.101.3");

        let b = resolve(&ctx(PlatformFamily::Darwin), &[ok(SourceId::HardwareProfile, "not json")]);
        assert_eq!(b.vendor, "Apple Inc.");
        assert_eq!(b.version, "");
    }

    #[test]
    fn sunos_vendor_is_fixed() {
        let b = resolve(&ctx(PlatformFamily::SunOs), &[]);
        assert_eq!(b.vendor, "Sun Microsystems");
    }

    #[test]
    fn windows_description_with_version() {
        let text = "\r\nDescription  : Phoenix ROM BIOS PLUS Version 1.10 A04\r\nVersion      : DELL   - 27d40b04\r\nManufacturer : Dell Inc.\r\nReleaseDate  : 20110804000000.000000+000\r\nBuildNumber  : \r\nSerialNumber : 7XYZ123\r\n";
        let b = resolve(&ctx(PlatformFamily::Windows), &[ok(SourceId::WinBios, text)]);
        assert_eq!(b.vendor, "Phoenix ROM BIOS PLUS");
        assert_eq!(b.version, "1.10 A04");
        assert_eq!(b.release_date, "2011-08-04");
        assert_eq!(b.serial, "7XYZ123");
        assert_eq!(b.revision, "");
    }

    #[test]
    fn windows_description_with_ver() {
        let text = "Description  : BIOS Date: 06/27/16 17:50:16 Ver: 1.4.5\r\nManufacturer : American Megatrends Inc.\r\nVersion : ALASKA - 1072009\r\n";
        let b = parse_win_bios(text).into_record();
        assert_eq!(b.vendor, "American Megatrends Inc.");
        assert_eq!(b.version, "1.4.5");
    }

    #[test]
    fn windows_plain_description() {
        let text = "Description  : 1.14.0\r\nManufacturer : Dell Inc.\r\nVersion : DELL   - 1072009\r\nReleaseDate : 2020\r\n";
        let b = parse_win_bios(text).into_record();
        assert_eq!(b.vendor, "Dell Inc.");
        assert_eq!(b.version, "DELL   - 1072009");
        assert_eq!(b.release_date, "2020");
    }
}
