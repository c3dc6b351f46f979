//! Platform family detection and per-platform fact applicability.

use sysfacts_protocol::{FactKind, PlatformFamily};

/// Returns the platform family of the running build target.
///
/// Unknown Unix-likes are treated as Linux, which has the widest tool
/// coverage.
pub fn detect_platform() -> PlatformFamily {
    detect_platform_inner()
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn detect_platform_inner() -> PlatformFamily {
    PlatformFamily::Linux
}

#[cfg(target_os = "macos")]
fn detect_platform_inner() -> PlatformFamily {
    PlatformFamily::Darwin
}

#[cfg(target_os = "windows")]
fn detect_platform_inner() -> PlatformFamily {
    PlatformFamily::Windows
}

#[cfg(target_os = "freebsd")]
fn detect_platform_inner() -> PlatformFamily {
    PlatformFamily::FreeBsd
}

#[cfg(target_os = "openbsd")]
fn detect_platform_inner() -> PlatformFamily {
    PlatformFamily::OpenBsd
}

#[cfg(target_os = "netbsd")]
fn detect_platform_inner() -> PlatformFamily {
    PlatformFamily::NetBsd
}

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
fn detect_platform_inner() -> PlatformFamily {
    PlatformFamily::SunOs
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "windows",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "solaris",
    target_os = "illumos"
)))]
fn detect_platform_inner() -> PlatformFamily {
    PlatformFamily::Linux
}

/// Whether `kind` can be collected at all on `platform`.
///
/// Identity facts are always applicable (SunOS reports defaults). USB and
/// VirtualBox need tooling that only Linux, macOS and Windows ship; the BSDs
/// still read printers from CUPS and battery state from `sysctl`.
pub fn is_applicable(platform: PlatformFamily, kind: FactKind) -> bool {
    match kind {
        FactKind::System | FactKind::Bios | FactKind::Baseboard | FactKind::Chassis => true,
        FactKind::Battery | FactKind::Printers => platform != PlatformFamily::SunOs,
        FactKind::Usb | FactKind::VirtualMachines => matches!(
            platform,
            PlatformFamily::Linux | PlatformFamily::Darwin | PlatformFamily::Windows
        ),
    }
}

/// Number of fact pipelines a full snapshot launches on `platform`.
pub fn applicable_count(platform: PlatformFamily) -> usize {
    FactKind::ALL
        .into_iter()
        .filter(|kind| is_applicable(platform, *kind))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_platform_matches_target() {
        let platform = detect_platform();
        if cfg!(target_os = "linux") {
            assert_eq!(platform, PlatformFamily::Linux);
        }
        if cfg!(target_os = "windows") {
            assert_eq!(platform, PlatformFamily::Windows);
        }
        if cfg!(target_os = "macos") {
            assert_eq!(platform, PlatformFamily::Darwin);
        }
    }

    #[test]
    fn applicable_counts_per_family() {
        assert_eq!(applicable_count(PlatformFamily::Linux), 8);
        assert_eq!(applicable_count(PlatformFamily::Darwin), 8);
        assert_eq!(applicable_count(PlatformFamily::Windows), 8);
        assert_eq!(applicable_count(PlatformFamily::FreeBsd), 6);
        assert_eq!(applicable_count(PlatformFamily::OpenBsd), 6);
        assert_eq!(applicable_count(PlatformFamily::NetBsd), 6);
        assert_eq!(applicable_count(PlatformFamily::SunOs), 4);
    }

    #[test]
    fn sunos_skips_battery_and_peripherals() {
        assert!(!is_applicable(PlatformFamily::SunOs, FactKind::Battery));
        assert!(!is_applicable(PlatformFamily::SunOs, FactKind::Printers));
        assert!(is_applicable(PlatformFamily::SunOs, FactKind::Chassis));
        assert!(!is_applicable(PlatformFamily::FreeBsd, FactKind::Usb));
    }
}
