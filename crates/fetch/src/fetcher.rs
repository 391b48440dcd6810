//! Idempotent artifact fetching

use async_trait::async_trait;
use romflash_errors::Result;
use romflash_net::{NetClient, ProgressFn};
use romflash_types::Artifact;
use std::path::PathBuf;
use tracing::info;

use crate::catalog::ArtifactSpec;

/// Resolves an artifact spec to a file on local disk.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Resolve `spec`, downloading only when the canonical file is absent.
    async fn fetch(&self, spec: &ArtifactSpec, progress: ProgressFn<'_>) -> Result<Artifact>;
}

/// Fetcher backed by the HTTP client and a working directory.
///
/// Idempotence is existence-only: a file under the canonical name is
/// taken as a completed download. The net layer writes through a `.part`
/// rename, so an interrupted transfer never leaves the canonical name
/// behind.
pub struct ArtifactFetcher {
    net: NetClient,
    work_dir: PathBuf,
}

impl ArtifactFetcher {
    #[must_use]
    pub fn new(net: NetClient, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            net,
            work_dir: work_dir.into(),
        }
    }
}

#[async_trait]
impl Fetcher for ArtifactFetcher {
    async fn fetch(&self, spec: &ArtifactSpec, progress: ProgressFn<'_>) -> Result<Artifact> {
        let path = self.work_dir.join(&spec.filename);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!(kind = %spec.kind, path = %path.display(), "artifact already present");
            return Ok(Artifact {
                kind: spec.kind,
                path,
                downloaded: true,
            });
        }

        info!(kind = %spec.kind, url = %spec.url, "downloading artifact");
        let headers: Vec<(&str, &str)> = spec
            .referer
            .as_deref()
            .map(|r| ("Referer", r))
            .into_iter()
            .collect();

        self.net
            .download_file(&spec.url, &path, &headers, progress)
            .await?;

        Ok(Artifact {
            kind: spec.kind,
            path,
            downloaded: true,
        })
    }
}
