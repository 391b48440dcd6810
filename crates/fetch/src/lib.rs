#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Artifact resolution for the romflash installer
//!
//! The release catalog maps each [`romflash_types::ArtifactKind`] to a
//! URL and canonical filename for a device codename; the fetcher turns a
//! spec into a local file, skipping the network entirely when the file
//! already exists.

pub mod catalog;
mod fetcher;

pub use catalog::{spec_for, ArtifactSpec};
pub use fetcher::{ArtifactFetcher, Fetcher};
pub use romflash_net::ProgressFn;
