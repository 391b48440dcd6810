//! The installation state machine
//!
//! Drives the fixed phase sequence documented in [`crate::InstallPhase`].
//! Each phase that depends on device mode re-probes rather than trusting
//! an earlier observation: physical actions (reboot, recovery boot)
//! invalidate any cached mode. Exactly one [`Outcome`] is produced per
//! run.

use std::sync::Arc;

use romflash_device::{AdbTransport, DeviceProbe, FastbootTransport};
use romflash_fetch::{spec_for, Fetcher};
use romflash_types::{Artifact, ArtifactKind, DeviceMode, ExitCode, Outcome};
use tracing::{debug, warn};

use crate::messages;
use crate::phase::InstallPhase;
use crate::session::Session;
use crate::settle::{
    Settle, BOOTLOADER_SETTLE, POST_INSTALL_SETTLE, RECOVERY_SETTLE, WIPE_SETTLE,
};

/// Vendor product strings mapped to canonical device codenames.
const PRODUCT_ALIASES: &[(&str, &str)] = &[("QC_Reference_Phone", "cheeseburger")];

/// Remote directory the update zip is pushed to before installing.
const DEVICE_STAGING_DIR: &str = "/sdcard";

/// Fetch order for one run. Later artifacts are never requested once a
/// fetch fails.
const FETCH_ORDER: [ArtifactKind; 4] = [
    ArtifactKind::UpdatePackage,
    ArtifactKind::FactoryRecovery,
    ArtifactKind::CustomRecovery,
    ArtifactKind::FactoryImage,
];

/// The four artifacts of a run, resolved to local files.
struct ArtifactSet {
    update: Artifact,
    update_filename: String,
    factory_recovery: Artifact,
    custom_recovery: Artifact,
    factory: Artifact,
}

/// Drives one installation run end to end.
pub struct InstallOrchestrator {
    adb: Arc<dyn AdbTransport>,
    fastboot: Arc<dyn FastbootTransport>,
    fetcher: Arc<dyn Fetcher>,
    session: Arc<dyn Session>,
    settle: Arc<dyn Settle>,
}

/// Phase result: continue with `T`, or stop the run with a terminal
/// outcome (which may be a success; unlocking ends the run too).
type Flow<T> = Result<T, Outcome>;

impl InstallOrchestrator {
    #[must_use]
    pub fn new(
        adb: Arc<dyn AdbTransport>,
        fastboot: Arc<dyn FastbootTransport>,
        fetcher: Arc<dyn Fetcher>,
        session: Arc<dyn Session>,
        settle: Arc<dyn Settle>,
    ) -> Self {
        Self {
            adb,
            fastboot,
            fetcher,
            session,
            settle,
        }
    }

    /// Run the full phase sequence and return the single terminal outcome.
    pub async fn run(&self) -> Outcome {
        match self.drive().await {
            Ok(outcome) | Err(outcome) => outcome,
        }
    }

    async fn drive(&self) -> Flow<Outcome> {
        self.await_user_consent().await?;
        self.verify_toolchain().await?;

        if self.detect_device_mode().await? != DeviceMode::FastbootReady {
            self.reboot_to_bootloader().await?;
        }
        self.verify_fastboot_ready().await?;

        let device = self.identify_device().await?;
        self.ensure_bootloader_unlocked().await?;

        let artifacts = self.fetch_artifacts(&device).await?;
        self.flash_factory(&artifacts).await?;
        self.flash_update(&artifacts).await?;
        self.wipe_cache_partitions().await?;
        Ok(self.final_reboot().await)
    }

    async fn await_user_consent(&self) -> Flow<()> {
        debug!(phase = %InstallPhase::AwaitUserConsent, "entering phase");
        self.session.info(messages::MSG_WELCOME);
        self.session.info("");

        let answer = self
            .session
            .prompt(messages::MSG_CONSENT_PROMPT)
            .await
            .map_err(|e| fail(ExitCode::ErrorUserInput, format!("failed to read input: {e}")))?;

        if answer.trim() == "yes" {
            Ok(())
        } else {
            self.session.info("");
            self.session.info("Aborting installation.");
            Err(Outcome::new(
                ExitCode::SuccessUserAbort,
                "installation aborted by user",
            ))
        }
    }

    /// Prove the adb and fastboot tools run at all, so a broken toolchain
    /// is distinguishable from a missing device.
    async fn verify_toolchain(&self) -> Flow<()> {
        debug!(phase = %InstallPhase::VerifyToolchain, "entering phase");
        self.session.info("");
        self.session.info("Verifying installer tools...");

        if let Err(e) = self.adb.status().await {
            self.session.info(messages::MSG_INCOMPLETE_TOOLS);
            return Err(fail(
                ExitCode::ErrorPrereqs,
                format!("failed to run adb: {e}"),
            ));
        }
        if let Err(e) = self.fastboot.status().await {
            self.session.info(messages::MSG_INCOMPLETE_TOOLS);
            return Err(fail(
                ExitCode::ErrorPrereqs,
                format!("failed to run fastboot: {e}"),
            ));
        }
        Ok(())
    }

    /// One probe; FastbootReady is the only mode that advances without a
    /// reboot.
    async fn detect_device_mode(&self) -> Flow<DeviceMode> {
        debug!(phase = %InstallPhase::DetectDeviceMode, "entering phase");
        self.session.info("Checking for your device...");

        let probe = DeviceProbe::new(self.adb.as_ref(), self.fastboot.as_ref());
        let mode = probe.probe().await.map_err(|e| {
            fail(
                ExitCode::ErrorAdb,
                format!("failed to get device status: {e}"),
            )
        })?;

        match mode {
            DeviceMode::FastbootReady | DeviceMode::AdbReady => Ok(mode),
            DeviceMode::NoDevice | DeviceMode::AdbUnauthorized | DeviceMode::Unknown => {
                self.session.info(messages::MSG_ADB_ISSUE);
                Err(fail(
                    ExitCode::ErrorAdb,
                    format!("device not reachable over adb (mode: {mode})"),
                ))
            }
            DeviceMode::UsbPermissionDenied => {
                self.session.info(messages::MSG_FIX_PERMS);
                Err(fail(
                    ExitCode::ErrorUsbPerms,
                    "USB device node is not accessible",
                ))
            }
        }
    }

    /// Reboot into the bootloader and give the hardware one bounded wait
    /// to re-enumerate. A single settle is the whole retry budget.
    async fn reboot_to_bootloader(&self) -> Flow<()> {
        debug!(phase = %InstallPhase::RebootToBootloader, "entering phase");
        self.session.info("Rebooting your device into bootloader...");

        self.adb.reboot("bootloader").await.map_err(|e| {
            fail(
                ExitCode::ErrorAdb,
                format!("failed to reboot into bootloader: {e}"),
            )
        })?;

        self.settle.wait(BOOTLOADER_SETTLE).await;

        match self.fastboot.status().await {
            Ok(DeviceMode::FastbootReady) => Ok(()),
            Ok(_) | Err(_) => Err(fail(
                ExitCode::ErrorAdb,
                "failed to reboot device into bootloader",
            )),
        }
    }

    async fn verify_fastboot_ready(&self) -> Flow<()> {
        debug!(phase = %InstallPhase::VerifyFastbootReady, "entering phase");
        let status = self.fastboot.status().await.map_err(|e| {
            fail(
                ExitCode::ErrorFastboot,
                format!("failed to get fastboot status: {e}"),
            )
        })?;

        match status {
            DeviceMode::NoDevice => {
                self.session.info(messages::MSG_FASTBOOT_NO_DEVICE);
                Err(fail(
                    ExitCode::ErrorFastboot,
                    "no device visible in fastboot mode",
                ))
            }
            DeviceMode::UsbPermissionDenied => {
                self.session.info(messages::MSG_FIX_PERMS);
                Err(fail(
                    ExitCode::ErrorUsbPerms,
                    "USB device node is not accessible",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Query the product string and normalize known vendor aliases to
    /// the canonical codename used for artifact resolution.
    async fn identify_device(&self) -> Flow<String> {
        debug!(phase = %InstallPhase::IdentifyDevice, "entering phase");
        self.session.info("Identifying your device...");

        let product = self.fastboot.product().await.map_err(|e| {
            fail(
                ExitCode::ErrorFastboot,
                format!("failed to get device product info: {e}"),
            )
        })?;

        let codename = PRODUCT_ALIASES
            .iter()
            .find(|(alias, _)| *alias == product)
            .map_or(product.as_str(), |(_, canonical)| *canonical)
            .to_string();

        debug!(%product, %codename, "device identified");
        Ok(codename)
    }

    /// Unlocking ends the run: the unlock wipes user data, so flashing
    /// only proceeds on a device that was already unlocked when the tool
    /// started. The operator re-runs the installer to continue.
    async fn ensure_bootloader_unlocked(&self) -> Flow<()> {
        debug!(phase = %InstallPhase::EnsureBootloaderUnlocked, "entering phase");

        let unlocked = match self.fastboot.unlocked().await {
            Ok(unlocked) => unlocked,
            Err(e) => {
                // Advisory only: an unknown lock state is treated as
                // locked and the run continues into the unlock path.
                warn!(error = %e, "unable to determine bootloader lock state");
                self.session
                    .warn(&format!("unable to determine bootloader lock state: {e}"));
                false
            }
        };

        if unlocked {
            return Ok(());
        }

        self.session
            .info("Unlocking bootloader; you will need to confirm this on your device...");
        self.fastboot.unlock().await.map_err(|e| {
            fail(
                ExitCode::ErrorFastboot,
                format!("failed to unlock bootloader: {e}"),
            )
        })?;

        if let Err(e) = self.fastboot.reboot().await {
            warn!(error = %e, "reboot after unlock failed");
        }
        self.session.info(messages::MSG_UNLOCK_SUCCESS);
        Err(Outcome::new(
            ExitCode::SuccessBootloaderUnlocked,
            "bootloader unlocked; re-run to continue installation",
        ))
    }

    /// Fetch all four artifacts in fixed order. Already-present files are
    /// skipped by the fetcher; the first failure stops the sequence.
    async fn fetch_artifacts(&self, device: &str) -> Flow<ArtifactSet> {
        debug!(phase = %InstallPhase::FetchArtifacts, "entering phase");
        self.session.info(&format!(
            "Downloading the latest release for your device ({device})..."
        ));

        let mut fetched: Vec<Artifact> = Vec::with_capacity(FETCH_ORDER.len());
        let mut update_filename = String::new();

        for kind in FETCH_ORDER {
            let spec = spec_for(kind, device);
            if kind == ArtifactKind::UpdatePackage {
                update_filename.clone_from(&spec.filename);
            }

            self.session.progress_begin(&spec.filename);
            let session = Arc::clone(&self.session);
            let result = self
                .fetcher
                .fetch(&spec, &move |fraction| session.progress_update(fraction))
                .await;
            self.session.progress_end();

            match result {
                Ok(artifact) => fetched.push(artifact),
                Err(e) => {
                    return Err(fail(
                        ExitCode::ErrorRemote,
                        format!("failed to download {kind}: {e}"),
                    ));
                }
            }
        }

        let mut fetched = fetched.into_iter();
        // Order matches FETCH_ORDER.
        let (Some(update), Some(factory_recovery), Some(custom_recovery), Some(factory)) = (
            fetched.next(),
            fetched.next(),
            fetched.next(),
            fetched.next(),
        ) else {
            return Err(fail(ExitCode::ErrorRemote, "artifact set incomplete"));
        };

        Ok(ArtifactSet {
            update,
            update_filename,
            factory_recovery,
            custom_recovery,
            factory,
        })
    }

    /// Temporarily boot the factory recovery and sideload the factory
    /// zip. The sideload menu selection cannot be automated; the
    /// recovery's on-screen menu has no USB-triggerable equivalent.
    async fn flash_factory(&self, artifacts: &ArtifactSet) -> Flow<()> {
        debug!(phase = %InstallPhase::FlashFactoryViaRecoveryA, "entering phase");
        self.session
            .info("Temporarily booting the factory recovery to flash the factory image...");

        self.fastboot
            .boot(&artifacts.factory_recovery.path)
            .await
            .map_err(|e| {
                fail(
                    ExitCode::ErrorTwrp,
                    format!("failed to boot the factory recovery: {e}"),
                )
            })?;

        self.session
            .prompt(messages::MSG_SIDELOAD_PROMPT)
            .await
            .map_err(|e| fail(ExitCode::ErrorUserInput, format!("failed to read input: {e}")))?;

        self.adb.sideload(&artifacts.factory.path).await.map_err(|e| {
            fail(
                ExitCode::ErrorTwrp,
                format!("failed to sideload the factory image: {e}"),
            )
        })?;
        Ok(())
    }

    /// Boot the custom recovery, push the update zip and install it.
    async fn flash_update(&self, artifacts: &ArtifactSet) -> Flow<()> {
        debug!(phase = %InstallPhase::FlashUpdateViaRecoveryB, "entering phase");

        self.session
            .prompt(messages::MSG_FASTBOOT_RETURN_PROMPT)
            .await
            .map_err(|e| fail(ExitCode::ErrorUserInput, format!("failed to read input: {e}")))?;

        self.session
            .info("Temporarily booting the custom recovery to flash the update zip...");
        self.fastboot
            .boot(&artifacts.custom_recovery.path)
            .await
            .map_err(|e| {
                fail(
                    ExitCode::ErrorTwrp,
                    format!("failed to boot the custom recovery: {e}"),
                )
            })?;

        self.settle.wait(RECOVERY_SETTLE).await;

        self.session.info("Transferring the update zip to your device...");
        self.adb
            .push(&artifacts.update.path, DEVICE_STAGING_DIR)
            .await
            .map_err(|e| {
                fail(
                    ExitCode::ErrorAdb,
                    format!("failed to push the update zip to the device: {e}"),
                )
            })?;

        self.session
            .info("Installing the update; please keep your device connected...");
        let install_cmd = format!(
            "twrp install {DEVICE_STAGING_DIR}/{}",
            artifacts.update_filename
        );
        self.adb.shell(&install_cmd).await.map_err(|e| {
            fail(
                ExitCode::ErrorTwrp,
                format!("failed to install the update zip: {e}"),
            )
        })?;

        // The recovery gets confused when wipes follow the install
        // immediately.
        self.settle.wait(POST_INSTALL_SETTLE).await;
        Ok(())
    }

    /// Wipe cache, dalvik and data in that order with spacing between
    /// the commands. A partial wipe is reported, never rolled back.
    async fn wipe_cache_partitions(&self) -> Flow<()> {
        debug!(phase = %InstallPhase::WipeCachePartitions, "entering phase");
        self.session
            .info("Wiping caches and user data (media is preserved)...");

        for target in ["cache", "dalvik", "data"] {
            self.adb
                .shell(&format!("twrp wipe {target}"))
                .await
                .map_err(|e| {
                    fail(
                        ExitCode::ErrorTwrp,
                        format!("failed to wipe {target}: {e}"),
                    )
                })?;
            self.settle.wait(WIPE_SETTLE).await;
        }
        Ok(())
    }

    /// Reboot into the freshly flashed system. A failure here is not
    /// catastrophic: the device is already in its final state, so the
    /// outcome carries manual-recovery instructions instead.
    async fn final_reboot(&self) -> Outcome {
        debug!(phase = %InstallPhase::FinalReboot, "entering phase");
        self.session.info(messages::MSG_SUCCESS);

        match self.adb.reboot("").await {
            Ok(()) => Outcome::success("installation complete"),
            Err(e) => {
                self.session.info(messages::MSG_MANUAL_REBOOT);
                fail(ExitCode::ErrorAdb, format!("failed to reboot: {e}"))
            }
        }
    }
}

fn fail(exit: ExitCode, message: impl Into<String>) -> Outcome {
    Outcome::new(exit, message)
}
