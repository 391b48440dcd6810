use serde::{Deserialize, Serialize};

/// Boot/transport mode of the attached device.
///
/// Produced fresh on every probe. Callers must not cache a mode across
/// phases: USB state is externally mutable at any time (cable re-plug,
/// device reboot), so every phase that depends on device mode re-probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    /// Mode could not be determined
    Unknown,
    /// No device enumerated on either transport
    NoDevice,
    /// Device visible over adb but not authorized for this host
    AdbUnauthorized,
    /// Device ready for adb commands (normal boot or recovery)
    AdbReady,
    /// Device ready for fastboot commands (bootloader)
    FastbootReady,
    /// Device enumerated but the USB node is not readable by this user
    UsbPermissionDenied,
}

impl std::fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::NoDevice => write!(f, "no device"),
            Self::AdbUnauthorized => write!(f, "adb (unauthorized)"),
            Self::AdbReady => write!(f, "adb"),
            Self::FastbootReady => write!(f, "fastboot"),
            Self::UsbPermissionDenied => write!(f, "usb permission denied"),
        }
    }
}
