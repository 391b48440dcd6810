//! Release catalog: artifact kind -> download URL and canonical filename
//!
//! Pure data, keyed by the device codename. The custom recovery host
//! checks the Referer header before serving an image, so its spec
//! carries the request URL as a referer too.

use romflash_types::ArtifactKind;

const RELEASE_ENDPOINT: &str = "https://images.romflash.dev";
const RECOVERY_ENDPOINT: &str = "https://dl.twrp.me";
const RECOVERY_VERSION_PREFIX: &str = "twrp-3.1.1-1-";

/// Everything the fetcher needs to resolve one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub kind: ArtifactKind,
    pub url: String,
    pub filename: String,
    pub referer: Option<String>,
}

/// Build the spec for one artifact of the target device.
#[must_use]
pub fn spec_for(kind: ArtifactKind, device: &str) -> ArtifactSpec {
    match kind {
        ArtifactKind::UpdatePackage => {
            let filename = format!("update-{device}.zip");
            ArtifactSpec {
                kind,
                url: format!("{RELEASE_ENDPOINT}/{device}/{filename}"),
                filename,
                referer: None,
            }
        }
        ArtifactKind::FactoryRecovery => {
            let filename = format!("factory-recovery-{device}.img");
            ArtifactSpec {
                kind,
                url: format!("{RELEASE_ENDPOINT}/{device}/{filename}"),
                filename,
                referer: None,
            }
        }
        ArtifactKind::CustomRecovery => {
            let filename = format!("{RECOVERY_VERSION_PREFIX}{device}.img");
            let url = format!("{RECOVERY_ENDPOINT}/{device}/{filename}");
            ArtifactSpec {
                kind,
                referer: Some(url.clone()),
                url,
                filename,
            }
        }
        ArtifactKind::FactoryImage => {
            let filename = format!("factory-{device}.zip");
            ArtifactSpec {
                kind,
                url: format!("{RELEASE_ENDPOINT}/{device}/{filename}"),
                filename,
                referer: None,
            }
        }
    }
}
