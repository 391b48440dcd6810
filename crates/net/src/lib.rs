#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for the romflash installer
//!
//! A thin streaming-download wrapper around reqwest. Transfer mechanics
//! only; which URLs to hit is the release catalog's business.

mod client;

pub use client::{NetClient, NetConfig, ProgressFn};
