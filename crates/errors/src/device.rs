//! Device transport error types

use thiserror::Error;

/// Which command-line tool a device error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transport {
    Adb,
    Fastboot,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Adb => write!(f, "adb"),
            Self::Fastboot => write!(f, "fastboot"),
        }
    }
}

/// Errors from the adb/fastboot transports.
///
/// A missing device is not an error; probes report it as a normal
/// `DeviceMode`. Only transport-level failures end up here.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceError {
    #[error("failed to run {tool}: {message}")]
    ToolUnavailable { tool: Transport, message: String },

    #[error("{tool} {command} failed: {stderr}")]
    CommandFailed {
        tool: Transport,
        command: String,
        stderr: String,
    },

    #[error("unexpected {tool} output: {output}")]
    UnexpectedOutput { tool: Transport, output: String },
}

impl DeviceError {
    /// The transport this error originated from.
    #[must_use]
    pub fn transport(&self) -> Transport {
        match self {
            Self::ToolUnavailable { tool, .. }
            | Self::CommandFailed { tool, .. }
            | Self::UnexpectedOutput { tool, .. } => *tool,
        }
    }
}
