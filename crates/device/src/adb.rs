//! adb transport

use async_trait::async_trait;
use romflash_errors::{Result, Transport};
use romflash_types::DeviceMode;
use std::path::Path;

use crate::probe::parse_adb_devices;
use crate::runner::{run_checked, run_tool};

/// Commands the installer issues over the adb transport.
#[async_trait]
pub trait AdbTransport: Send + Sync {
    /// Current device mode as seen by adb.
    async fn status(&self) -> Result<DeviceMode>;

    /// `adb reboot <target>`; an empty target reboots to the normal system.
    async fn reboot(&self, target: &str) -> Result<()>;

    /// `adb sideload <path>` against a recovery in sideload mode.
    async fn sideload(&self, path: &Path) -> Result<()>;

    /// `adb push <path> <remote_dir>`, blocking until the transfer ends.
    async fn push(&self, path: &Path, remote_dir: &str) -> Result<()>;

    /// `adb shell <command>`.
    async fn shell(&self, command: &str) -> Result<()>;
}

/// adb transport backed by the `adb` executable.
#[derive(Debug, Clone)]
pub struct AdbClient {
    program: String,
}

impl AdbClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "adb".to_string(),
        }
    }

    /// Use a specific adb executable instead of whatever is on PATH.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for AdbClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdbTransport for AdbClient {
    async fn status(&self) -> Result<DeviceMode> {
        let output = run_checked(Transport::Adb, &self.program, &["devices"]).await?;
        Ok(parse_adb_devices(&output.stdout))
    }

    async fn reboot(&self, target: &str) -> Result<()> {
        if target.is_empty() {
            run_checked(Transport::Adb, &self.program, &["reboot"]).await?;
        } else {
            run_checked(Transport::Adb, &self.program, &["reboot", target]).await?;
        }
        Ok(())
    }

    async fn sideload(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        run_checked(Transport::Adb, &self.program, &["sideload", &path]).await?;
        Ok(())
    }

    async fn push(&self, path: &Path, remote_dir: &str) -> Result<()> {
        let path = path.to_string_lossy();
        run_checked(Transport::Adb, &self.program, &["push", &path, remote_dir]).await?;
        Ok(())
    }

    async fn shell(&self, command: &str) -> Result<()> {
        // Some recovery shells report failure only in their output text
        // while exiting zero; exit status is still the best signal the
        // transport has.
        let output = run_tool(Transport::Adb, &self.program, &["shell", command]).await?;
        if output.success {
            Ok(())
        } else {
            Err(romflash_errors::DeviceError::CommandFailed {
                tool: Transport::Adb,
                command: format!("shell {command}"),
                stderr: output.combined().trim().to_string(),
            }
            .into())
        }
    }
}
