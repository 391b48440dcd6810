#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the romflash installer
//!
//! Fine-grained error types organized by domain, plus a generic `Error`
//! for cross-crate boundaries. All error types implement Clone for
//! easier handling.

use thiserror::Error;

pub mod device;
pub mod network;

// Re-export all error types at the root
pub use device::{DeviceError, Transport};
pub use network::NetworkError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// Transport of the underlying device error, if this is one.
    #[must_use]
    pub fn device_transport(&self) -> Option<Transport> {
        match self {
            Self::Device(err) => Some(err.transport()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            path: None,
        }
    }
}

/// Result type alias for romflash operations
pub type Result<T> = std::result::Result<T, Error>;
