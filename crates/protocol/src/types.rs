use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating-system family that selects which sources and parsers apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Linux,
    Darwin,
    Windows,
    FreeBsd,
    OpenBsd,
    NetBsd,
    SunOs,
}

impl PlatformFamily {
    pub const ALL: [PlatformFamily; 7] = [
        PlatformFamily::Linux,
        PlatformFamily::Darwin,
        PlatformFamily::Windows,
        PlatformFamily::FreeBsd,
        PlatformFamily::OpenBsd,
        PlatformFamily::NetBsd,
        PlatformFamily::SunOs,
    ];

    /// Returns the lowercase identifier used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformFamily::Linux => "linux",
            PlatformFamily::Darwin => "darwin",
            PlatformFamily::Windows => "windows",
            PlatformFamily::FreeBsd => "freebsd",
            PlatformFamily::OpenBsd => "openbsd",
            PlatformFamily::NetBsd => "netbsd",
            PlatformFamily::SunOs => "sunos",
        }
    }

    /// FreeBSD, OpenBSD and NetBSD share most of their tooling.
    pub fn is_bsd(self) -> bool {
        matches!(
            self,
            PlatformFamily::FreeBsd | PlatformFamily::OpenBsd | PlatformFamily::NetBsd
        )
    }

    /// Linux and the BSDs both expose SMBIOS through `dmidecode`.
    pub fn has_dmi(self) -> bool {
        self == PlatformFamily::Linux || self.is_bsd()
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        PlatformFamily::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .or(match lower.as_str() {
                "android" => Some(PlatformFamily::Linux),
                "macos" => Some(PlatformFamily::Darwin),
                "win32" => Some(PlatformFamily::Windows),
                "solaris" | "illumos" => Some(PlatformFamily::SunOs),
                _ => None,
            })
            .ok_or_else(|| format!("unknown platform family '{s}'"))
    }
}

/// A named category of telemetry with its own record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FactKind {
    Battery,
    System,
    Bios,
    Baseboard,
    Chassis,
    Usb,
    Printers,
    VirtualMachines,
}

impl FactKind {
    pub const ALL: [FactKind; 8] = [
        FactKind::Battery,
        FactKind::System,
        FactKind::Bios,
        FactKind::Baseboard,
        FactKind::Chassis,
        FactKind::Usb,
        FactKind::Printers,
        FactKind::VirtualMachines,
    ];

    /// Returns the snapshot slot name for this fact.
    pub fn as_str(self) -> &'static str {
        match self {
            FactKind::Battery => "battery",
            FactKind::System => "system",
            FactKind::Bios => "bios",
            FactKind::Baseboard => "baseboard",
            FactKind::Chassis => "chassis",
            FactKind::Usb => "usb",
            FactKind::Printers => "printers",
            FactKind::VirtualMachines => "virtualMachines",
        }
    }

    /// Whether this fact is reported as a list of devices.
    pub fn is_device_list(self) -> bool {
        matches!(
            self,
            FactKind::Usb | FactKind::Printers | FactKind::VirtualMachines
        )
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
