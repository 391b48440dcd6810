//! Installation phases

/// Ordered phases of one installer run.
///
/// Strictly sequential and single-pass: no phase is re-entered, and the
/// only waiting happens inside a phase (the bounded settle delays).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstallPhase {
    AwaitUserConsent,
    VerifyToolchain,
    DetectDeviceMode,
    RebootToBootloader,
    VerifyFastbootReady,
    IdentifyDevice,
    EnsureBootloaderUnlocked,
    FetchArtifacts,
    FlashFactoryViaRecoveryA,
    FlashUpdateViaRecoveryB,
    WipeCachePartitions,
    FinalReboot,
}

impl std::fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AwaitUserConsent => "await-user-consent",
            Self::VerifyToolchain => "verify-toolchain",
            Self::DetectDeviceMode => "detect-device-mode",
            Self::RebootToBootloader => "reboot-to-bootloader",
            Self::VerifyFastbootReady => "verify-fastboot-ready",
            Self::IdentifyDevice => "identify-device",
            Self::EnsureBootloaderUnlocked => "ensure-bootloader-unlocked",
            Self::FetchArtifacts => "fetch-artifacts",
            Self::FlashFactoryViaRecoveryA => "flash-factory-via-recovery-a",
            Self::FlashUpdateViaRecoveryB => "flash-update-via-recovery-b",
            Self::WipeCachePartitions => "wipe-cache-partitions",
            Self::FinalReboot => "final-reboot",
        };
        f.write_str(name)
    }
}
