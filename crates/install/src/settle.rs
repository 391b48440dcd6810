//! Fixed settle delays for hardware readiness
//!
//! The device gives no readiness signal after a reboot into the
//! bootloader or a recovery boot; these flat waits model the observed
//! re-enumeration and UI-start latency. They are not polling deadlines
//! and are not adjustable at runtime.

use async_trait::async_trait;
use std::time::Duration;

/// USB re-enumeration after `adb reboot bootloader`.
pub const BOOTLOADER_SETTLE: Duration = Duration::from_secs(7);

/// Recovery UI start after `fastboot boot <recovery>`.
pub const RECOVERY_SETTLE: Duration = Duration::from_secs(10);

/// The recovery shell mishandles commands issued right after an install.
pub const POST_INSTALL_SETTLE: Duration = Duration::from_secs(2);

/// Spacing between wipe commands; the recovery shell becomes
/// unresponsive without it.
pub const WIPE_SETTLE: Duration = Duration::from_secs(1);

/// Seam for the settle waits so tests can substitute zero-length ones.
#[async_trait]
pub trait Settle: Send + Sync {
    async fn wait(&self, period: Duration);
}

/// Real wall-clock settle.
pub struct HardwareSettle;

#[async_trait]
impl Settle for HardwareSettle {
    async fn wait(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}
