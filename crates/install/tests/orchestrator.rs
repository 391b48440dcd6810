//! Integration tests for the installation state machine
//!
//! All collaborators are scripted: transports pop queued device modes
//! and append to a shared call log, the fetcher records requested specs
//! (optionally failing at a fixed position), the session answers prompts
//! from a script, and settle waits are zero-length.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use romflash_device::{AdbTransport, FastbootTransport};
use romflash_errors::{DeviceError, Error, NetworkError, Result, Transport};
use romflash_fetch::{ArtifactSpec, Fetcher, ProgressFn};
use romflash_install::{InstallOrchestrator, Session, Settle};
use romflash_types::{Artifact, DeviceMode, ExitCode};

type CallLog = Arc<Mutex<Vec<String>>>;

fn transport_error(tool: Transport) -> Error {
    DeviceError::CommandFailed {
        tool,
        command: "scripted".into(),
        stderr: "scripted failure".into(),
    }
    .into()
}

#[derive(Default)]
struct ScriptedAdb {
    log: CallLog,
    statuses: Mutex<VecDeque<DeviceMode>>,
    default_status: Option<DeviceMode>,
    fail_shell_containing: Option<&'static str>,
    fail_reboot_to: Option<&'static str>,
}

impl ScriptedAdb {
    fn next_status(&self) -> Result<DeviceMode> {
        if let Some(mode) = self.statuses.lock().unwrap().pop_front() {
            return Ok(mode);
        }
        self.default_status
            .ok_or_else(|| transport_error(Transport::Adb))
    }
}

#[async_trait]
impl AdbTransport for ScriptedAdb {
    async fn status(&self) -> Result<DeviceMode> {
        self.log.lock().unwrap().push("adb status".into());
        self.next_status()
    }

    async fn reboot(&self, target: &str) -> Result<()> {
        self.log.lock().unwrap().push(format!("adb reboot {target}"));
        if self.fail_reboot_to == Some(target) {
            return Err(transport_error(Transport::Adb));
        }
        Ok(())
    }

    async fn sideload(&self, path: &Path) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("adb sideload {}", path.display()));
        Ok(())
    }

    async fn push(&self, path: &Path, remote_dir: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("adb push {} {remote_dir}", path.display()));
        Ok(())
    }

    async fn shell(&self, command: &str) -> Result<()> {
        self.log.lock().unwrap().push(format!("adb shell {command}"));
        if let Some(needle) = self.fail_shell_containing {
            if command.contains(needle) {
                return Err(transport_error(Transport::Adb));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedFastboot {
    log: CallLog,
    statuses: Mutex<VecDeque<DeviceMode>>,
    default_status: Option<DeviceMode>,
    product: Option<&'static str>,
    // None scripts a lock-state query failure
    unlocked: Option<bool>,
    fail_boot: bool,
}

impl ScriptedFastboot {
    fn next_status(&self) -> Result<DeviceMode> {
        if let Some(mode) = self.statuses.lock().unwrap().pop_front() {
            return Ok(mode);
        }
        self.default_status
            .ok_or_else(|| transport_error(Transport::Fastboot))
    }
}

#[async_trait]
impl FastbootTransport for ScriptedFastboot {
    async fn status(&self) -> Result<DeviceMode> {
        self.log.lock().unwrap().push("fastboot status".into());
        self.next_status()
    }

    async fn product(&self) -> Result<String> {
        self.log.lock().unwrap().push("fastboot product".into());
        self.product
            .map(str::to_string)
            .ok_or_else(|| transport_error(Transport::Fastboot))
    }

    async fn unlocked(&self) -> Result<bool> {
        self.log.lock().unwrap().push("fastboot unlocked".into());
        self.unlocked
            .ok_or_else(|| transport_error(Transport::Fastboot))
    }

    async fn unlock(&self) -> Result<()> {
        self.log.lock().unwrap().push("fastboot unlock".into());
        Ok(())
    }

    async fn reboot(&self) -> Result<()> {
        self.log.lock().unwrap().push("fastboot reboot".into());
        Ok(())
    }

    async fn boot(&self, image: &Path) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("fastboot boot {}", image.display()));
        if self.fail_boot {
            return Err(transport_error(Transport::Fastboot));
        }
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedFetcher {
    log: CallLog,
    calls: AtomicUsize,
    fail_at: Option<usize>,
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, spec: &ArtifactSpec, _progress: ProgressFn<'_>) -> Result<Artifact> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap()
            .push(format!("fetch {}", spec.filename));
        if self.fail_at == Some(index) {
            return Err(NetworkError::DownloadFailed("scripted failure".into()).into());
        }
        Ok(Artifact {
            kind: spec.kind,
            path: PathBuf::from(&spec.filename),
            downloaded: true,
        })
    }
}

#[derive(Default)]
struct ScriptedSession {
    answers: Mutex<VecDeque<&'static str>>,
}

#[async_trait]
impl Session for ScriptedSession {
    async fn prompt(&self, _text: &str) -> Result<String> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .map(str::to_string)
            .ok_or_else(|| Error::internal("script ran out of answers"))
    }

    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn progress_begin(&self, _title: &str) {}
    fn progress_update(&self, _fraction: f64) {}
    fn progress_end(&self) {}
}

struct NoSettle;

#[async_trait]
impl Settle for NoSettle {
    async fn wait(&self, _period: Duration) {}
}

struct Rig {
    log: CallLog,
    adb: Arc<ScriptedAdb>,
    fastboot: Arc<ScriptedFastboot>,
    fetcher: Arc<ScriptedFetcher>,
    session: Arc<ScriptedSession>,
}

impl Rig {
    fn new(adb: ScriptedAdb, fastboot: ScriptedFastboot) -> Self {
        let log = Arc::clone(&adb.log);
        Self {
            adb: Arc::new(adb),
            fastboot: Arc::new(fastboot),
            fetcher: Arc::new(ScriptedFetcher {
                log: Arc::clone(&log),
                ..Default::default()
            }),
            session: Arc::new(ScriptedSession::default()),
            log,
        }
    }

    fn answers(self, answers: &[&'static str]) -> Self {
        *self.session.answers.lock().unwrap() = answers.iter().copied().collect();
        self
    }

    fn fetcher(mut self, fetcher: ScriptedFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    fn orchestrator(&self) -> InstallOrchestrator {
        InstallOrchestrator::new(
            Arc::clone(&self.adb) as Arc<dyn AdbTransport>,
            Arc::clone(&self.fastboot) as Arc<dyn FastbootTransport>,
            Arc::clone(&self.fetcher) as Arc<dyn Fetcher>,
            Arc::clone(&self.session) as Arc<dyn Session>,
            Arc::new(NoSettle),
        )
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

fn shared_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// An already-unlocked device sitting in adb mode, happy path scripting.
fn happy_rig() -> Rig {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::AdbReady),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        // toolchain check, detect probe, post-reboot check, fastboot verify
        statuses: Mutex::new(VecDeque::from(vec![
            DeviceMode::NoDevice,
            DeviceMode::NoDevice,
            DeviceMode::FastbootReady,
            DeviceMode::FastbootReady,
        ])),
        default_status: Some(DeviceMode::FastbootReady),
        product: Some("QC_Reference_Phone"),
        unlocked: Some(true),
        ..Default::default()
    };
    Rig::new(adb, fastboot).answers(&["yes", "", ""])
}

#[tokio::test]
async fn declined_consent_aborts_with_no_device_or_network_calls() {
    let rig = happy_rig().answers(&["no"]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::SuccessUserAbort);
    assert_eq!(outcome.exit.code(), 33);
    assert!(rig.log().is_empty(), "no collaborator may be touched: {:?}", rig.log());
}

#[tokio::test]
async fn full_run_on_unlocked_adb_device_succeeds() {
    let rig = happy_rig();
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::Success, "{}", outcome.message);
    let log = rig.log();

    // Rebooted out of adb mode exactly once.
    assert_eq!(
        log.iter().filter(|l| *l == "adb reboot bootloader").count(),
        1
    );
    // Product alias resolved to the canonical codename for every fetch.
    assert!(log
        .iter()
        .filter(|l| l.starts_with("fetch "))
        .all(|l| l.contains("cheeseburger")));
    // An already-unlocked bootloader is never unlocked again.
    assert!(!log.iter().any(|l| l == "fastboot unlock"));
    assert!(!log.iter().any(|l| l == "fastboot reboot"));
    // Update zip is installed from the staging directory.
    assert!(log
        .iter()
        .any(|l| l == "adb shell twrp install /sdcard/update-cheeseburger.zip"));
    // Final reboot to system.
    assert_eq!(log.last().map(String::as_str), Some("adb reboot "));
}

#[tokio::test]
async fn fetch_order_is_update_recoveries_then_factory() {
    let rig = happy_rig();
    rig.orchestrator().run().await;

    let fetches: Vec<String> = rig
        .log()
        .into_iter()
        .filter(|l| l.starts_with("fetch "))
        .collect();
    assert_eq!(
        fetches,
        vec![
            "fetch update-cheeseburger.zip",
            "fetch factory-recovery-cheeseburger.img",
            "fetch twrp-3.1.1-1-cheeseburger.img",
            "fetch factory-cheeseburger.zip",
        ]
    );
}

#[tokio::test]
async fn wipes_run_in_fixed_order() {
    let rig = happy_rig();
    rig.orchestrator().run().await;

    let log = rig.log();
    let position = |needle: &str| {
        log.iter()
            .position(|l| l == needle)
            .unwrap_or_else(|| panic!("missing {needle}"))
    };
    let cache = position("adb shell twrp wipe cache");
    let dalvik = position("adb shell twrp wipe dalvik");
    let data = position("adb shell twrp wipe data");
    assert!(cache < dalvik && dalvik < data);
}

#[tokio::test]
async fn device_already_in_fastboot_skips_the_reboot() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::NoDevice),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        default_status: Some(DeviceMode::FastbootReady),
        product: Some("cheeseburger"),
        unlocked: Some(true),
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes", "", ""]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::Success, "{}", outcome.message);
    assert!(!rig.log().iter().any(|l| l == "adb reboot bootloader"));
}

#[tokio::test]
async fn unauthorized_device_is_an_adb_error() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::AdbUnauthorized),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        default_status: Some(DeviceMode::NoDevice),
        product: Some("cheeseburger"),
        unlocked: Some(true),
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes"]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::ErrorAdb);
}

#[tokio::test]
async fn absent_device_is_an_adb_error() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::NoDevice),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        default_status: Some(DeviceMode::NoDevice),
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes"]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::ErrorAdb);
}

#[tokio::test]
async fn usb_permission_problem_is_its_own_error() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::NoDevice),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        default_status: Some(DeviceMode::UsbPermissionDenied),
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes"]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::ErrorUsbPerms);
}

#[tokio::test]
async fn device_stuck_after_bootloader_reboot_is_an_adb_error() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::AdbReady),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        // toolchain check, detect probe, post-reboot check still empty
        statuses: Mutex::new(VecDeque::from(vec![
            DeviceMode::NoDevice,
            DeviceMode::NoDevice,
            DeviceMode::NoDevice,
        ])),
        default_status: Some(DeviceMode::NoDevice),
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes"]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::ErrorAdb);
    assert!(rig.log().iter().any(|l| l == "adb reboot bootloader"));
}

#[tokio::test]
async fn locked_bootloader_is_unlocked_once_and_ends_the_run() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::NoDevice),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        default_status: Some(DeviceMode::FastbootReady),
        product: Some("QC_Reference_Phone"),
        unlocked: Some(false),
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes"]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::SuccessBootloaderUnlocked);
    assert_eq!(outcome.exit.code(), 34);

    let log = rig.log();
    assert_eq!(log.iter().filter(|l| *l == "fastboot unlock").count(), 1);
    assert_eq!(log.iter().filter(|l| *l == "fastboot reboot").count(), 1);
    let unlock = log.iter().position(|l| l == "fastboot unlock").unwrap();
    let reboot = log.iter().position(|l| l == "fastboot reboot").unwrap();
    assert!(unlock < reboot);
    // No fetch or flash phase after the unlock.
    assert!(!log.iter().any(|l| l.starts_with("fetch ")));
    assert!(!log.iter().any(|l| l.starts_with("fastboot boot")));
}

#[tokio::test]
async fn unknown_lock_state_is_advisory_and_takes_the_unlock_path() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::NoDevice),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        default_status: Some(DeviceMode::FastbootReady),
        product: Some("cheeseburger"),
        unlocked: None,
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes"]);
    let outcome = rig.orchestrator().run().await;

    // The failed query does not kill the run; the unlock path runs as if
    // the bootloader were locked.
    assert_eq!(outcome.exit, ExitCode::SuccessBootloaderUnlocked);
    assert!(rig.log().iter().any(|l| l == "fastboot unlock"));
}

#[tokio::test]
async fn fetch_failure_stops_before_later_artifacts() {
    let rig = happy_rig().fetcher(ScriptedFetcher {
        log: shared_log(),
        fail_at: Some(1),
        ..Default::default()
    });
    let fetch_log = Arc::clone(&rig.fetcher.log);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::ErrorRemote);

    let fetches = fetch_log.lock().unwrap().clone();
    assert_eq!(fetches.len(), 2, "third and fourth artifacts never requested");

    // No flash phase ran.
    assert!(!rig.log().iter().any(|l| l.starts_with("fastboot boot")));
}

#[tokio::test]
async fn recovery_boot_failure_maps_to_twrp_error() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::NoDevice),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        default_status: Some(DeviceMode::FastbootReady),
        product: Some("cheeseburger"),
        unlocked: Some(true),
        fail_boot: true,
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes", "", ""]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::ErrorTwrp);
}

#[tokio::test]
async fn wipe_failure_maps_to_twrp_error() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::AdbReady),
        fail_shell_containing: Some("wipe dalvik"),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        statuses: Mutex::new(VecDeque::from(vec![
            DeviceMode::NoDevice,
            DeviceMode::NoDevice,
            DeviceMode::FastbootReady,
            DeviceMode::FastbootReady,
        ])),
        default_status: Some(DeviceMode::FastbootReady),
        product: Some("cheeseburger"),
        unlocked: Some(true),
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes", "", ""]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::ErrorTwrp);
    let log = rig.log();
    // Cache wipe ran, dalvik failed, data never attempted.
    assert!(log.iter().any(|l| l == "adb shell twrp wipe cache"));
    assert!(!log.iter().any(|l| l == "adb shell twrp wipe data"));
}

#[tokio::test]
async fn failed_final_reboot_reports_adb_error_after_flashing() {
    let log = shared_log();
    let adb = ScriptedAdb {
        log: Arc::clone(&log),
        default_status: Some(DeviceMode::AdbReady),
        fail_reboot_to: Some(""),
        ..Default::default()
    };
    let fastboot = ScriptedFastboot {
        log,
        statuses: Mutex::new(VecDeque::from(vec![
            DeviceMode::NoDevice,
            DeviceMode::NoDevice,
            DeviceMode::FastbootReady,
            DeviceMode::FastbootReady,
        ])),
        default_status: Some(DeviceMode::FastbootReady),
        product: Some("cheeseburger"),
        unlocked: Some(true),
        ..Default::default()
    };
    let rig = Rig::new(adb, fastboot).answers(&["yes", "", ""]);
    let outcome = rig.orchestrator().run().await;

    assert_eq!(outcome.exit, ExitCode::ErrorAdb);
    // Every flash step completed before the reboot attempt.
    assert!(rig.log().iter().any(|l| l == "adb shell twrp wipe data"));
}
