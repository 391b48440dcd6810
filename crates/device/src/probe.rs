//! Device mode detection from tool output
//!
//! `adb devices` and `fastboot devices` print one line per attached
//! device after an optional header. The state column (or the serial
//! column, for permission failures) tells us which `DeviceMode` the
//! device is in. The probe never treats an absent device as an error.

use romflash_types::DeviceMode;

use crate::{AdbTransport, FastbootTransport};
use romflash_errors::Result;

/// Combined probe over both transports.
///
/// fastboot is checked first: a device sitting in the bootloader is
/// invisible to adb, while a booted device is invisible to fastboot, so
/// the two `status()` calls never both report a device.
pub struct DeviceProbe<'a> {
    adb: &'a dyn AdbTransport,
    fastboot: &'a dyn FastbootTransport,
}

impl<'a> DeviceProbe<'a> {
    #[must_use]
    pub fn new(adb: &'a dyn AdbTransport, fastboot: &'a dyn FastbootTransport) -> Self {
        Self { adb, fastboot }
    }

    /// Report the device's current mode.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport failures (tool missing or
    /// crashed); "no device" is a normal `DeviceMode` value.
    pub async fn probe(&self) -> Result<DeviceMode> {
        match self.fastboot.status().await? {
            DeviceMode::NoDevice => self.adb.status().await,
            mode => Ok(mode),
        }
    }
}

/// Parse `adb devices` output into a mode.
pub(crate) fn parse_adb_devices(output: &str) -> DeviceMode {
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("List of devices") || line.starts_with('*') {
            continue;
        }
        if line.contains("no permissions") {
            return DeviceMode::UsbPermissionDenied;
        }
        let mut fields = line.split_whitespace();
        let (Some(_serial), Some(state)) = (fields.next(), fields.next()) else {
            continue;
        };
        return match state {
            "device" | "recovery" | "sideload" => DeviceMode::AdbReady,
            "unauthorized" => DeviceMode::AdbUnauthorized,
            _ => DeviceMode::Unknown,
        };
    }
    DeviceMode::NoDevice
}

/// Parse `fastboot devices` output into a mode.
pub(crate) fn parse_fastboot_devices(output: &str) -> DeviceMode {
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains("no permissions") {
            return DeviceMode::UsbPermissionDenied;
        }
        if line.split_whitespace().count() >= 2 {
            return DeviceMode::FastbootReady;
        }
    }
    DeviceMode::NoDevice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adb_ready_device() {
        let out = "List of devices attached\n0123456789ABCDEF\tdevice\n";
        assert_eq!(parse_adb_devices(out), DeviceMode::AdbReady);
    }

    #[test]
    fn adb_recovery_counts_as_ready() {
        let out = "List of devices attached\n0123456789ABCDEF\trecovery\n";
        assert_eq!(parse_adb_devices(out), DeviceMode::AdbReady);
    }

    #[test]
    fn adb_unauthorized() {
        let out = "List of devices attached\n0123456789ABCDEF\tunauthorized\n";
        assert_eq!(parse_adb_devices(out), DeviceMode::AdbUnauthorized);
    }

    #[test]
    fn adb_no_permissions() {
        let out = "List of devices attached\n????????????\tno permissions; see [http://developer.android.com/tools/device.html]\n";
        assert_eq!(parse_adb_devices(out), DeviceMode::UsbPermissionDenied);
    }

    #[test]
    fn adb_empty_list() {
        assert_eq!(
            parse_adb_devices("List of devices attached\n\n"),
            DeviceMode::NoDevice
        );
    }

    #[test]
    fn adb_daemon_banner_is_skipped() {
        let out = "* daemon not running; starting now at tcp:5037\n* daemon started successfully\nList of devices attached\nABCD\tdevice\n";
        assert_eq!(parse_adb_devices(out), DeviceMode::AdbReady);
    }

    #[test]
    fn fastboot_ready() {
        assert_eq!(
            parse_fastboot_devices("0123456789ABCDEF\tfastboot\n"),
            DeviceMode::FastbootReady
        );
    }

    #[test]
    fn fastboot_no_permissions() {
        assert_eq!(
            parse_fastboot_devices("no permissions\tfastboot\n"),
            DeviceMode::UsbPermissionDenied
        );
    }

    #[test]
    fn fastboot_empty() {
        assert_eq!(parse_fastboot_devices(""), DeviceMode::NoDevice);
    }
}
