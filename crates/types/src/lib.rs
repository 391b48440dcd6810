#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the romflash installer
//!
//! This crate provides the fundamental types shared across the system:
//! device boot modes, artifact descriptions, and the terminal outcome /
//! exit-code taxonomy.

pub mod artifact;
pub mod device;
pub mod outcome;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactKind};
pub use device::DeviceMode;
pub use outcome::{ExitCode, Outcome, OutcomeCategory};
