//! Subprocess execution for the adb/fastboot command-line tools

use romflash_errors::{DeviceError, Error, Transport};
use tokio::process::Command;
use tracing::debug;

/// Captured output of a finished tool invocation.
#[derive(Debug)]
pub(crate) struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout and stderr concatenated.
    ///
    /// fastboot writes `getvar` results to stderr, so var queries have
    /// to look at both streams.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Run a tool to completion, capturing output.
///
/// A spawn failure (tool not installed, not executable) is the only error
/// here; a non-zero exit is reported through `ToolOutput::success` so
/// callers can decide whether it matters.
pub(crate) async fn run_tool(
    tool: Transport,
    program: &str,
    args: &[&str],
) -> Result<ToolOutput, Error> {
    debug!(tool = %tool, ?args, "running device tool");
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| DeviceError::ToolUnavailable {
            tool,
            message: e.to_string(),
        })?;

    Ok(ToolOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a tool and treat a non-zero exit as a `CommandFailed` error.
pub(crate) async fn run_checked(
    tool: Transport,
    program: &str,
    args: &[&str],
) -> Result<ToolOutput, Error> {
    let output = run_tool(tool, program, args).await?;
    if output.success {
        Ok(output)
    } else {
        let stderr = if output.stderr.trim().is_empty() {
            output.stdout.trim().to_string()
        } else {
            output.stderr.trim().to_string()
        };
        Err(DeviceError::CommandFailed {
            tool,
            command: args.join(" "),
            stderr,
        }
        .into())
    }
}
