use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logical name of a release artifact the installer needs.
///
/// The installer works with a fixed set of four artifacts per run; the
/// release catalog in `romflash-fetch` maps each kind to a concrete URL
/// and canonical filename for the target device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The ROM update zip flashed through the custom recovery
    UpdatePackage,
    /// Vendor recovery image, temporarily booted to sideload the factory zip
    FactoryRecovery,
    /// Custom recovery image, temporarily booted to install the update zip
    CustomRecovery,
    /// Full factory zip, sideloaded through the vendor recovery
    FactoryImage,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpdatePackage => write!(f, "update package"),
            Self::FactoryRecovery => write!(f, "factory recovery"),
            Self::CustomRecovery => write!(f, "custom recovery"),
            Self::FactoryImage => write!(f, "factory image"),
        }
    }
}

/// A resolved artifact on local disk.
///
/// `downloaded` is set once a file of the canonical name exists in the
/// working directory, whether this run fetched it or a prior one did.
/// The installer never deletes artifacts; cleanup is manual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub downloaded: bool,
}

