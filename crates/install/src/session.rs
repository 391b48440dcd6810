//! Operator session
//!
//! The installer has exactly one actor: a person at a terminal holding a
//! USB cable. All interaction goes through this trait so the orchestrator
//! owns no process-wide input reader or progress bar, and tests can
//! script the operator.

use async_trait::async_trait;
use romflash_errors::Result;

#[async_trait]
pub trait Session: Send + Sync {
    /// Print `text` without a newline and block for one line of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the input stream fails.
    async fn prompt(&self, text: &str) -> Result<String>;

    /// Print an informational line.
    fn info(&self, message: &str);

    /// Print a warning line.
    fn warn(&self, message: &str);

    /// Start rendering a progress indicator titled `title`.
    fn progress_begin(&self, title: &str);

    /// Update the current progress indicator; `fraction` is in [0, 1]
    /// and non-decreasing.
    fn progress_update(&self, fraction: f64);

    /// Finish and clear the current progress indicator.
    fn progress_end(&self);
}
