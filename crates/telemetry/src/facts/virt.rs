//! Virtualization detectors for the system record.
//!
//! Detectors run in a fixed order. Any of them may flag the machine as
//! virtual, but only the first one that names a host sets `virtualHost`.

use sysfacts_protocol::{PlatformFamily, SystemRecord};

use crate::normalize::parse_float_prefix;

/// Secondary signals gathered next to the DMI identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtSignals<'a> {
    /// Entry names of `/dev/disk/by-id`.
    pub disks_by_id: Option<&'a str>,
    /// `/proc/sys/kernel/osrelease`.
    pub kernel_release: Option<&'a str>,
    /// `/.dockerenv` or `/.dockerinit` exists.
    pub docker: bool,
    pub dmesg: Option<&'a str>,
    /// `dmidecode -t 4` on the BSDs.
    pub bsd_processor: Option<&'a str>,
    /// `Win32_BIOS` version strings.
    pub bios_signature: Option<&'a str>,
}

fn mark(record: &mut SystemRecord, host: Option<&str>) {
    record.is_virtual = true;
    if let Some(host) = host {
        if record.virtual_host.is_empty() {
            record.virtual_host = host.to_string();
        }
    }
}

/// Runs every detector against `record`.
pub fn detect(platform: PlatformFamily, record: &mut SystemRecord, signals: &VirtSignals<'_>) {
    let windows = platform == PlatformFamily::Windows;
    if let Some(host) = host_from_model(&record.model, windows) {
        mark(record, host);
    }
    if let Some(host) = host_from_manufacturer(&record.manufacturer, windows) {
        mark(record, host);
    }

    if !record.is_virtual {
        if let Some(disks) = signals.disks_by_id {
            if disk_vendor(disks, "QEMU") {
                mark(record, Some("QEMU"));
            } else if disk_vendor(disks, "VBOX") {
                mark(record, Some("VirtualBox"));
            }
        }
    }

    if platform == PlatformFamily::Linux && !record.is_virtual {
        if let Some(version) = signals.kernel_release.and_then(wsl_version) {
            record.is_virtual = true;
            record.manufacturer = "Microsoft".into();
            record.model = "WSL".into();
            record.version = version.into();
        }
    }

    if platform.is_bsd() && record.virtual_host.is_empty() {
        let host = signals.bsd_processor.and_then(|text| {
            let kv = crate::grammar::KvLines::parse(text, crate::grammar::Delimiter::Colon);
            match kv.get("manufacturer")?.to_ascii_lowercase().as_str() {
                "virtualbox" => Some("VirtualBox"),
                "vmware" => Some("VMware"),
                "kvm" => Some("KVM"),
                "bochs" => Some("bochs"),
                _ => None,
            }
        });
        if host.is_some() {
            mark(record, host);
        }
    }

    if signals.docker {
        record.model = "Docker Container".into();
    }

    if let Some(dmesg) = signals.dmesg {
        let hits = hypervisor_lines(dmesg);
        if !hits.is_empty() {
            if record.model == SystemRecord::DEFAULT_MODEL {
                record.model = "Virtual machine".into();
            }
            let host = [
                ("vmware", "VMware"),
                ("qemu", "QEMU"),
                ("xen", "Xen"),
                ("kvm", "KVM"),
            ]
            .into_iter()
            .find(|(needle, _)| hits.iter().any(|l| l.contains(needle)))
            .map(|(_, host)| host);
            mark(record, host);
        }
    }

    if platform == PlatformFamily::Windows && !record.is_virtual {
        if let Some(signature) = signals.bios_signature {
            if let Some(host) = host_from_bios_signature(signature) {
                mark(record, Some(host));
            }
        }
    }
}

/// `Some(host)` when the model names a hypervisor; the inner `None` means
/// virtual without a known host. A `qemu` prefix names KVM only under
/// Windows; elsewhere QEMU guests are named by the disk and dmesg detectors.
fn host_from_model(model: &str, windows: bool) -> Option<Option<&'static str>> {
    let model = model.to_ascii_lowercase();
    match model.as_str() {
        "virtualbox" => Some(Some("VirtualBox")),
        "kvm" => Some(Some("KVM")),
        "bochs" => Some(Some("bochs")),
        "virtual machine" => Some(None),
        m if m.starts_with("vmware") => Some(Some("VMware")),
        m if windows && m.starts_with("qemu") => Some(Some("KVM")),
        m if m.starts_with("droplet") => Some(None),
        _ => None,
    }
}

fn host_from_manufacturer(manufacturer: &str, windows: bool) -> Option<Option<&'static str>> {
    let manufacturer = manufacturer.to_ascii_lowercase();
    match manufacturer.as_str() {
        "xen" => Some(Some("Xen")),
        m if m.starts_with("vmware") => Some(Some("VMware")),
        m if windows && m.starts_with("qemu") => Some(Some("KVM")),
        _ => None,
    }
}

/// Whether a `/dev/disk/by-id` entry carries `vendor` as a whole id
/// component (`ata-QEMU_HARDDISK_QM00001`, `scsi-0QEMU_QEMU_HARDDISK_drive0`).
fn disk_vendor(disks: &str, vendor: &str) -> bool {
    let inner = format!("_{vendor}_");
    let leading = format!("-{vendor}_");
    disks
        .lines()
        .any(|id| id.contains(&inner) || id.contains(&leading))
}

/// WSL kernels carry `microsoft` in the release; WSL 2 started at 4.19.
fn wsl_version(release: &str) -> Option<&'static str> {
    let release = release.trim().to_ascii_lowercase();
    if !release.contains("microsoft") && !release.ends_with("wsl2") {
        return None;
    }
    let kernel = parse_float_prefix(&release).unwrap_or(0.0);
    Some(if kernel < 4.19 { "1" } else { "2" })
}

/// Lowercased dmesg lines that mention a hypervisor by name.
fn hypervisor_lines(dmesg: &str) -> Vec<String> {
    dmesg
        .lines()
        .map(str::to_ascii_lowercase)
        .filter(|l| l.contains("virtual") || l.contains("hypervisor"))
        .filter(|l| ["vmware", "qemu", "kvm", "xen"].iter().any(|n| l.contains(n)))
        .filter(|l| !l.contains("nested virtualization") && !l.contains("/virtual/"))
        .collect()
}

fn host_from_bios_signature(signature: &str) -> Option<&'static str> {
    if signature.contains("VirtualBox") {
        Some("VirtualBox")
    } else if signature.to_ascii_lowercase().contains("vmware") {
        Some("VMware")
    } else if signature.contains("Xen") {
        Some("Xen")
    } else if signature.contains("VRTUAL") {
        Some("Hyper-V")
    } else if signature.contains("A M I ") {
        Some("Virtual PC")
    } else {
        None
    }
}
