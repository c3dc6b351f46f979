//! Per-platform source descriptors.
//!
//! The order of the sources returned for a fact is its fallback chain:
//! earlier sources win when two report the same field.

use std::path::{Path, PathBuf};

use sysfacts_protocol::{FactKind, PlatformFamily};

use crate::platform::is_applicable;
use crate::probe::{Source, SourceKind};

/// Identifies one entry of the catalog so its output can be routed to the
/// matching parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    // Battery
    BatteryUevent(&'static str),
    AcOnline(&'static str),
    SysctlBattery,
    IoregBattery,
    PmsetBattery,
    WinBattery,
    WinBatteryStaticData,
    WinBatteryFullCharged,

    // Identity
    DmidecodeSystem,
    DmidecodeBios,
    DmidecodeBaseboard,
    DmidecodeMemory,
    DmidecodeProcessor,
    SysfsDmi,
    CpuInfo,
    MemInfo,
    IoregPlatform,
    HardwareProfile,
    MemoryProfile,
    WinComputerSystemProduct,
    WinSystemSku,
    WinBios,
    WinBaseboard,
    WinMemoryArray,
    WinSystemEnclosure,

    // Virtualization signals
    DisksById,
    KernelRelease,
    DockerMarker,
    Dmesg,
    WinBiosSignature,

    // Peripherals
    Lsusb,
    IoregUsb,
    WinUsb,
    CupsPrinters,
    Lpstat,
    PrinterProfile,
    WinPrinters,
    VBoxList,
}

const BATTERY_NAMES: [&str; 2] = ["BAT1", "BAT0"];
const AC_NAMES: [&str; 2] = ["AC", "AC0"];

const DMI_SYSTEM_KEYS: [&str; 6] = [
    "product_name",
    "product_serial",
    "product_uuid",
    "product_version",
    "product_sku",
    "sys_vendor",
];
const DMI_BIOS_KEYS: [&str; 3] = ["bios_date", "bios_vendor", "bios_version"];
const DMI_BOARD_KEYS: [&str; 5] = [
    "board_asset_tag",
    "board_name",
    "board_serial",
    "board_vendor",
    "board_version",
];
const DMI_CHASSIS_KEYS: [&str; 5] = [
    "chassis_asset_tag",
    "chassis_serial",
    "chassis_type",
    "chassis_vendor",
    "chassis_version",
];

/// Builds the concrete source lists.
///
/// Filesystem paths are resolved below `root`, so a test can lay out a fake
/// `/sys` tree in a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCatalog {
    root: PathBuf,
    powershell: String,
    vboxmanage: String,
}

impl SourceCatalog {
    pub fn new(
        root: impl Into<PathBuf>,
        powershell: impl Into<String>,
        vboxmanage: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            powershell: powershell.into(),
            vboxmanage: vboxmanage.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the ordered fallback chain for `kind` on `platform`.
    ///
    /// Empty when the fact is not applicable or the platform only reports
    /// fixed defaults for it.
    pub fn sources(&self, platform: PlatformFamily, kind: FactKind) -> Vec<Source> {
        if !is_applicable(platform, kind) {
            return Vec::new();
        }
        match kind {
            FactKind::Battery => self.battery(platform),
            FactKind::System => self.system(platform),
            FactKind::Bios => self.bios(platform),
            FactKind::Baseboard => self.baseboard(platform),
            FactKind::Chassis => self.chassis(platform),
            FactKind::Usb => self.usb(platform),
            FactKind::Printers => self.printers(platform),
            FactKind::VirtualMachines => vec![self.command(
                SourceId::VBoxList,
                &self.vboxmanage,
                &["list", "vms", "--long"],
            )],
        }
    }

    fn battery(&self, platform: PlatformFamily) -> Vec<Source> {
        match platform {
            PlatformFamily::Linux => {
                let mut sources: Vec<Source> = BATTERY_NAMES
                    .iter()
                    .map(|&name| Source {
                        id: SourceId::BatteryUevent(name),
                        kind: SourceKind::File(
                            self.path(&format!("sys/class/power_supply/{name}/uevent")),
                        ),
                    })
                    .collect();
                sources.extend(AC_NAMES.iter().map(|&name| Source {
                    id: SourceId::AcOnline(name),
                    kind: SourceKind::File(
                        self.path(&format!("sys/class/power_supply/{name}/online")),
                    ),
                }));
                sources
            }
            PlatformFamily::Darwin => vec![
                self.command(SourceId::PmsetBattery, "pmset", &["-g", "batt"]),
                self.command(
                    SourceId::IoregBattery,
                    "ioreg",
                    &["-n", "AppleSmartBattery", "-r"],
                ),
            ],
            PlatformFamily::Windows => vec![
                self.powershell(
                    SourceId::WinBattery,
                    "Get-CimInstance Win32_Battery | Select-Object BatteryStatus, DesignCapacity, DesignVoltage, EstimatedChargeRemaining, DeviceID | Format-List",
                ),
                self.powershell(
                    SourceId::WinBatteryStaticData,
                    "(Get-CimInstance -Namespace root/wmi -ClassName BatteryStaticData).DesignedCapacity",
                ),
                self.powershell(
                    SourceId::WinBatteryFullCharged,
                    "(Get-CimInstance -Namespace root/wmi -ClassName BatteryFullChargedCapacity).FullChargedCapacity",
                ),
            ],
            p if p.is_bsd() => vec![self.command(
                SourceId::SysctlBattery,
                "sysctl",
                &["-i", "hw.acpi.battery", "hw.acpi.acline"],
            )],
            _ => Vec::new(),
        }
    }

    fn system(&self, platform: PlatformFamily) -> Vec<Source> {
        match platform {
            p if p.has_dmi() => {
                let mut sources = vec![
                    self.command(SourceId::DmidecodeSystem, "dmidecode", &["-t", "system"]),
                    self.sysfs_dmi(&DMI_SYSTEM_KEYS),
                    Source {
                        id: SourceId::CpuInfo,
                        kind: SourceKind::File(self.path("proc/cpuinfo")),
                    },
                    Source {
                        id: SourceId::DisksById,
                        kind: SourceKind::DirListing(self.path("dev/disk/by-id")),
                    },
                    Source {
                        id: SourceId::DockerMarker,
                        kind: SourceKind::Exists(vec![
                            self.path(".dockerenv"),
                            self.path(".dockerinit"),
                        ]),
                    },
                    self.command(SourceId::Dmesg, "dmesg", &[]),
                ];
                if p == PlatformFamily::Linux {
                    sources.push(Source {
                        id: SourceId::KernelRelease,
                        kind: SourceKind::File(self.path("proc/sys/kernel/osrelease")),
                    });
                } else {
                    sources.push(self.command(
                        SourceId::DmidecodeProcessor,
                        "dmidecode",
                        &["-t", "4"],
                    ));
                }
                sources
            }
            PlatformFamily::Darwin => vec![self.ioreg_platform()],
            PlatformFamily::Windows => vec![
                self.powershell(
                    SourceId::WinComputerSystemProduct,
                    "Get-CimInstance Win32_ComputerSystemProduct | Select-Object Name, Vendor, Version, IdentifyingNumber, UUID | Format-List",
                ),
                self.powershell(
                    SourceId::WinSystemSku,
                    "Get-CimInstance -Namespace root/wmi -ClassName MS_SystemInformation | Select-Object SystemSKU | Format-List",
                ),
                self.powershell(
                    SourceId::WinBiosSignature,
                    "Get-CimInstance Win32_BIOS | Select-Object Version, SerialNumber, SMBIOSBIOSVersion | Format-List",
                ),
            ],
            _ => Vec::new(),
        }
    }

    fn bios(&self, platform: PlatformFamily) -> Vec<Source> {
        match platform {
            p if p.has_dmi() => vec![
                self.command(SourceId::DmidecodeBios, "dmidecode", &["-t", "bios"]),
                self.sysfs_dmi(&DMI_BIOS_KEYS),
            ],
            PlatformFamily::Darwin => vec![self.command(
                SourceId::HardwareProfile,
                "system_profiler",
                &["SPHardwareDataType", "-json"],
            )],
            PlatformFamily::Windows => vec![self.powershell(
                SourceId::WinBios,
                "Get-CimInstance Win32_BIOS | Select-Object Description, Version, Manufacturer, ReleaseDate, BuildNumber, SerialNumber | Format-List",
            )],
            _ => Vec::new(),
        }
    }

    fn baseboard(&self, platform: PlatformFamily) -> Vec<Source> {
        match platform {
            p if p.has_dmi() => {
                let mut sources = vec![
                    self.command(SourceId::DmidecodeBaseboard, "dmidecode", &["-t", "2"]),
                    self.sysfs_dmi(&DMI_BOARD_KEYS),
                    self.command(SourceId::DmidecodeMemory, "dmidecode", &["-t", "memory"]),
                ];
                if p == PlatformFamily::Linux {
                    sources.push(Source {
                        id: SourceId::CpuInfo,
                        kind: SourceKind::File(self.path("proc/cpuinfo")),
                    });
                    sources.push(Source {
                        id: SourceId::MemInfo,
                        kind: SourceKind::File(self.path("proc/meminfo")),
                    });
                }
                sources
            }
            PlatformFamily::Darwin => vec![
                self.ioreg_platform(),
                self.command(SourceId::MemoryProfile, "system_profiler", &["SPMemoryDataType"]),
            ],
            PlatformFamily::Windows => vec![
                self.powershell(
                    SourceId::WinBaseboard,
                    "Get-CimInstance Win32_BaseBoard | Select-Object Model, Manufacturer, Product, Version, SerialNumber, PartNumber, SKU | Format-List",
                ),
                self.powershell(
                    SourceId::WinMemoryArray,
                    "Get-CimInstance Win32_PhysicalMemoryArray | Select-Object MaxCapacity, MemoryDevices | Format-List",
                ),
            ],
            _ => Vec::new(),
        }
    }

    fn chassis(&self, platform: PlatformFamily) -> Vec<Source> {
        match platform {
            p if p.has_dmi() => vec![self.sysfs_dmi(&DMI_CHASSIS_KEYS)],
            PlatformFamily::Darwin => vec![self.ioreg_platform()],
            PlatformFamily::Windows => vec![self.powershell(
                SourceId::WinSystemEnclosure,
                "Get-CimInstance Win32_SystemEnclosure | Select-Object Model, Manufacturer, ChassisTypes, Version, SerialNumber, PartNumber, SKU | Format-List",
            )],
            _ => Vec::new(),
        }
    }

    fn usb(&self, platform: PlatformFamily) -> Vec<Source> {
        match platform {
            PlatformFamily::Linux => vec![self.command(SourceId::Lsusb, "lsusb", &["-v"])],
            PlatformFamily::Darwin => vec![self.command(
                SourceId::IoregUsb,
                "ioreg",
                &["-p", "IOUSB", "-c", "AppleUSBRootHubDevice", "-w0", "-l"],
            )],
            PlatformFamily::Windows => vec![self.powershell(
                SourceId::WinUsb,
                "Get-CimInstance CIM_LogicalDevice | Where-Object { $_.Description -match 'USB' } | Select-Object Name, CreationClassName, DeviceID, Manufacturer | Format-List",
            )],
            _ => Vec::new(),
        }
    }

    fn printers(&self, platform: PlatformFamily) -> Vec<Source> {
        match platform {
            p if p.has_dmi() => {
                let mut sources = vec![Source {
                    id: SourceId::CupsPrinters,
                    kind: SourceKind::File(self.path("etc/cups/printers.conf")),
                }];
                if p == PlatformFamily::Linux {
                    sources.push(self.command(SourceId::Lpstat, "lpstat", &["-lp"]));
                }
                sources
            }
            PlatformFamily::Darwin => vec![self.command(
                SourceId::PrinterProfile,
                "system_profiler",
                &["SPPrintersDataType", "-json"],
            )],
            PlatformFamily::Windows => vec![self.powershell(
                SourceId::WinPrinters,
                "Get-CimInstance Win32_Printer | Select-Object PrinterStatus, Name, DriverName, Local, Default, Shared | Format-List",
            )],
            _ => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn sysfs_dmi(&self, keys: &[&'static str]) -> Source {
        Source {
            id: SourceId::SysfsDmi,
            kind: SourceKind::KeyedFiles {
                dir: self.path("sys/devices/virtual/dmi/id"),
                keys: keys.to_vec(),
            },
        }
    }

    fn ioreg_platform(&self) -> Source {
        self.command(
            SourceId::IoregPlatform,
            "ioreg",
            &["-c", "IOPlatformExpertDevice", "-d", "2"],
        )
    }

    fn command(&self, id: SourceId, program: &str, args: &[&str]) -> Source {
        Source {
            id,
            kind: SourceKind::Command {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
            },
        }
    }

    fn powershell(&self, id: SourceId, script: &str) -> Source {
        Source {
            id,
            kind: SourceKind::PowerShell {
                program: self.powershell.clone(),
                script: script.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SourceCatalog {
        SourceCatalog::new("/fake", "pwsh", "VBoxManage")
    }

    fn ids(platform: PlatformFamily, kind: FactKind) -> Vec<SourceId> {
        catalog()
            .sources(platform, kind)
            .into_iter()
            .map(|s| s.id)
            .collect()
    }

    #[test]
    fn linux_battery_prefers_bat1() {
        assert_eq!(
            ids(PlatformFamily::Linux, FactKind::Battery),
            vec![
                SourceId::BatteryUevent("BAT1"),
                SourceId::BatteryUevent("BAT0"),
                SourceId::AcOnline("AC"),
                SourceId::AcOnline("AC0"),
            ]
        );
    }

    #[test]
    fn paths_are_rooted() {
        let sources = catalog().sources(PlatformFamily::Linux, FactKind::Chassis);
        assert_eq!(
            sources[0].kind,
            SourceKind::KeyedFiles {
                dir: PathBuf::from("/fake/sys/devices/virtual/dmi/id"),
                keys: DMI_CHASSIS_KEYS.to_vec(),
            }
        );
    }

    #[test]
    fn inapplicable_facts_have_no_sources() {
        assert!(ids(PlatformFamily::SunOs, FactKind::Battery).is_empty());
        assert!(ids(PlatformFamily::FreeBsd, FactKind::Usb).is_empty());
        assert!(ids(PlatformFamily::SunOs, FactKind::Bios).is_empty());
    }

    #[test]
    fn powershell_uses_configured_executable() {
        let sources = catalog().sources(PlatformFamily::Windows, FactKind::Printers);
        match &sources[0].kind {
            SourceKind::PowerShell { program, script } => {
                assert_eq!(program, "pwsh");
                assert!(script.contains("Win32_Printer"));
            }
            other => panic!("unexpected source kind {other:?}"),
        }
    }

    #[test]
    fn vboxmanage_uses_configured_executable() {
        let sources = catalog().sources(PlatformFamily::Darwin, FactKind::VirtualMachines);
        assert_eq!(
            sources[0].kind,
            SourceKind::Command {
                program: "VBoxManage".into(),
                args: vec!["list".into(), "vms".into(), "--long".into()],
            }
        );
    }

    #[test]
    fn lpstat_is_linux_only() {
        assert!(ids(PlatformFamily::Linux, FactKind::Printers).contains(&SourceId::Lpstat));
        assert_eq!(
            ids(PlatformFamily::NetBsd, FactKind::Printers),
            vec![SourceId::CupsPrinters]
        );
    }
}
