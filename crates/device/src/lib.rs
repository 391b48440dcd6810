#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Device transports for the romflash installer
//!
//! Wraps the `adb` and `fastboot` command-line tools behind async traits
//! so the orchestrator (and its tests) never touch a subprocess directly.
//! The combined [`DeviceProbe`] reports which boot mode the attached
//! device is currently in.

mod adb;
mod fastboot;
mod probe;
mod runner;

pub use adb::{AdbClient, AdbTransport};
pub use fastboot::{FastbootClient, FastbootTransport};
pub use probe::DeviceProbe;
