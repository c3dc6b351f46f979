use sysfacts_protocol::{PlatformFamily, SystemRecord};

use super::raspberry;
use super::virt::{self, VirtSignals};
use super::{FactContext, strip_ioreg, successes, text_of};
use crate::catalog::SourceId;
use crate::grammar::{Delimiter, KvLines};
use crate::merge::{impl_merge, merge_all};
use crate::normalize::scrub;
use crate::probe::RawProbeResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemPartial {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub version: Option<String>,
    pub serial: Option<String>,
    pub uuid: Option<String>,
    pub sku: Option<String>,
}

impl_merge!(SystemPartial {
    manufacturer,
    model,
    version,
    serial,
    uuid,
    sku,
});

impl SystemPartial {
    /// Scrubs placeholders and fills defaults.
    pub fn into_record(self) -> SystemRecord {
        let defaults = SystemRecord::default();
        SystemRecord {
            manufacturer: scrub(self.manufacturer).unwrap_or(defaults.manufacturer),
            model: scrub(self.model).unwrap_or(defaults.model),
            version: scrub(self.version).unwrap_or(defaults.version),
            serial: scrub(self.serial).unwrap_or(defaults.serial),
            uuid: scrub(self.uuid).unwrap_or(defaults.uuid),
            sku: scrub(self.sku).unwrap_or(defaults.sku),
            ..defaults
        }
    }
}

pub fn resolve(ctx: &FactContext, raws: &[RawProbeResult]) -> SystemRecord {
    let partials = successes(raws).filter_map(|(id, text)| parse_source(id, text));
    let mut record = merge_all(partials).into_record();

    let platform = ctx.platform;
    if platform.has_dmi() || platform == PlatformFamily::Windows {
        let signals = VirtSignals {
            disks_by_id: text_of(raws, SourceId::DisksById),
            kernel_release: text_of(raws, SourceId::KernelRelease),
            docker: text_of(raws, SourceId::DockerMarker).is_some(),
            dmesg: text_of(raws, SourceId::Dmesg),
            bsd_processor: text_of(raws, SourceId::DmidecodeProcessor),
            bios_signature: text_of(raws, SourceId::WinBiosSignature),
        };
        virt::detect(platform, &mut record, &signals);
    }

    if platform.has_dmi() && looks_unidentified(&record) {
        if let Some(cpuinfo) = text_of(raws, SourceId::CpuInfo) {
            apply_cpuinfo(&mut record, cpuinfo);
        }
    }

    record
}

/// Identifies SMBIOS-less ARM boards from `/proc/cpuinfo`: Raspberry Pis by
/// revision code, anything else by its `Hardware`/`Revision`/`Serial` lines.
fn apply_cpuinfo(record: &mut SystemRecord, cpuinfo: &str) {
    if let Some(board) = raspberry::decode_cpuinfo(cpuinfo) {
        record.manufacturer = "Raspberry Pi Foundation".into();
        record.model = board.model.clone();
        record.version = board.revision_code.clone();
        if !board.serial.is_empty() {
            record.serial = board.serial.clone();
        }
        record.raspberry = Some(board.info());
        return;
    }

    let kv = KvLines::parse(cpuinfo, Delimiter::Colon);
    if let Some(hardware) = kv.get("Hardware") {
        record.model = hardware.to_ascii_uppercase();
    }
    if let Some(revision) = kv.get("Revision") {
        record.version = revision.to_ascii_lowercase();
    }
    if let Some(serial) = kv.string("Serial") {
        record.serial = serial;
    }
}

/// Single-board computers usually ship without SMBIOS tables.
fn looks_unidentified(record: &SystemRecord) -> bool {
    record.manufacturer.is_empty()
        && record.model == SystemRecord::DEFAULT_MODEL
        && record.version.is_empty()
}

fn parse_source(id: SourceId, text: &str) -> Option<SystemPartial> {
    match id {
        SourceId::DmidecodeSystem => Some(parse_dmidecode(text)),
        SourceId::SysfsDmi => Some(parse_sysfs(text)),
        SourceId::IoregPlatform => Some(parse_ioreg(text)),
        SourceId::WinComputerSystemProduct => Some(parse_win_product(text)),
        SourceId::WinSystemSku => Some(SystemPartial {
            sku: KvLines::parse(text, Delimiter::Colon).string("SystemSKU"),
            ..SystemPartial::default()
        }),
        _ => None,
    }
}

fn lowercase(value: Option<&str>) -> Option<String> {
    value.map(str::to_ascii_lowercase)
}

/// `dmidecode -t system`.
pub fn parse_dmidecode(text: &str) -> SystemPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    SystemPartial {
        manufacturer: kv.string("Manufacturer"),
        model: kv.string("Product Name"),
        version: kv.string("Version"),
        serial: kv.string("Serial Number"),
        uuid: lowercase(kv.get("UUID")),
        sku: kv.string("SKU Number"),
    }
}

/// `/sys/devices/virtual/dmi/id`, readable without root.
pub fn parse_sysfs(text: &str) -> SystemPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    SystemPartial {
        manufacturer: kv.string("sys_vendor"),
        model: kv.string("product_name"),
        version: kv.string("product_version"),
        serial: kv.string("product_serial"),
        uuid: lowercase(kv.get("product_uuid")),
        sku: kv.string("product_sku"),
    }
}

/// `ioreg -c IOPlatformExpertDevice -d 2`.
pub fn parse_ioreg(text: &str) -> SystemPartial {
    let cleaned = strip_ioreg(text);
    let kv = KvLines::parse(&cleaned, Delimiter::Equals);
    SystemPartial {
        manufacturer: kv.string("manufacturer"),
        model: kv.string("model"),
        version: kv.string("version"),
        serial: kv.string("IOPlatformSerialNumber"),
        uuid: lowercase(kv.get("IOPlatformUUID")),
        sku: kv.string("board-id"),
    }
}

/// `Win32_ComputerSystemProduct`.
pub fn parse_win_product(text: &str) -> SystemPartial {
    let kv = KvLines::parse(text, Delimiter::Colon);
    SystemPartial {
        manufacturer: kv.string("Vendor"),
        model: kv.string("Name"),
        version: kv.string("Version"),
        serial: kv.string("IdentifyingNumber"),
        uuid: lowercase(kv.get("UUID")),
        sku: None,
    }
}
