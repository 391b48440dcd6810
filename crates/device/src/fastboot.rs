//! fastboot transport

use async_trait::async_trait;
use romflash_errors::{DeviceError, Result, Transport};
use romflash_types::DeviceMode;
use std::path::Path;

use crate::probe::parse_fastboot_devices;
use crate::runner::run_checked;

/// Commands the installer issues while the device sits in its bootloader.
#[async_trait]
pub trait FastbootTransport: Send + Sync {
    /// Current device mode as seen by fastboot.
    async fn status(&self) -> Result<DeviceMode>;

    /// Product string reported by the bootloader (`getvar product`).
    async fn product(&self) -> Result<String>;

    /// Whether the bootloader is unlocked (`getvar unlocked`).
    async fn unlocked(&self) -> Result<bool>;

    /// Unlock the bootloader. Blocks until the operator confirms the
    /// unlock dialog on-device. Wipes user data as a side effect.
    async fn unlock(&self) -> Result<()>;

    /// `fastboot reboot` to the normal system.
    async fn reboot(&self) -> Result<()>;

    /// Temporarily boot an image without flashing it (`fastboot boot`).
    async fn boot(&self, image: &Path) -> Result<()>;
}

/// fastboot transport backed by the `fastboot` executable.
#[derive(Debug, Clone)]
pub struct FastbootClient {
    program: String,
}

impl FastbootClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "fastboot".to_string(),
        }
    }

    /// Use a specific fastboot executable instead of whatever is on PATH.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Query a bootloader variable.
    ///
    /// fastboot prints `getvar` results to stderr, so the value is
    /// extracted from both streams.
    async fn getvar(&self, name: &str) -> Result<String> {
        let output = run_checked(Transport::Fastboot, &self.program, &["getvar", name]).await?;
        let combined = output.combined();
        for line in combined.lines() {
            if let Some(value) = line.strip_prefix(&format!("{name}:")) {
                return Ok(value.trim().to_string());
            }
        }
        Err(DeviceError::UnexpectedOutput {
            tool: Transport::Fastboot,
            output: combined.trim().to_string(),
        }
        .into())
    }
}

impl Default for FastbootClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FastbootTransport for FastbootClient {
    async fn status(&self) -> Result<DeviceMode> {
        let output = run_checked(Transport::Fastboot, &self.program, &["devices"]).await?;
        Ok(parse_fastboot_devices(&output.stdout))
    }

    async fn product(&self) -> Result<String> {
        self.getvar("product").await
    }

    async fn unlocked(&self) -> Result<bool> {
        let value = self.getvar("unlocked").await?;
        Ok(value.eq_ignore_ascii_case("yes"))
    }

    async fn unlock(&self) -> Result<()> {
        run_checked(Transport::Fastboot, &self.program, &["oem", "unlock"]).await?;
        Ok(())
    }

    async fn reboot(&self) -> Result<()> {
        run_checked(Transport::Fastboot, &self.program, &["reboot"]).await?;
        Ok(())
    }

    async fn boot(&self, image: &Path) -> Result<()> {
        let image = image.to_string_lossy();
        run_checked(Transport::Fastboot, &self.program, &["boot", &image]).await?;
        Ok(())
    }
}
