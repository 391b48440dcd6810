#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Installation orchestration for romflash
//!
//! The one component with cross-phase state and failure policy: a fixed,
//! single-pass sequence of phases driven by device probes and operator
//! confirmations. Everything it talks to (transports, fetcher, operator
//! session, settle waits) sits behind a trait, so the whole state machine
//! runs against scripted collaborators in tests.

pub mod messages;
mod orchestrator;
mod phase;
mod session;
mod settle;

pub use orchestrator::InstallOrchestrator;
pub use phase::InstallPhase;
pub use session::Session;
pub use settle::{
    HardwareSettle, Settle, BOOTLOADER_SETTLE, POST_INSTALL_SETTLE, RECOVERY_SETTLE, WIPE_SETTLE,
};
