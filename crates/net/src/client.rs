//! HTTP client for artifact downloads

use futures::StreamExt;
use reqwest::{Client, Response};
use romflash_errors::{Error, NetworkError};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Progress callback: monotonically non-decreasing fraction in [0, 1].
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1800), // recovery images are large
            connect_timeout: Duration::from_secs(30),
            user_agent: format!("romflash/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client wrapper.
///
/// No automatic request retry: the installer's recovery story is the
/// operator re-running the tool, with already-downloaded artifacts
/// skipped by the fetcher.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to
    /// initialize.
    pub fn new(config: &NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default
    /// settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(&NetConfig::default())
    }

    /// Stream a URL to `dest`, reporting progress as a fraction.
    ///
    /// Bytes are written to a `.part` sibling and renamed into place on
    /// completion, so a file at `dest` always means a finished transfer.
    /// When the server sends no content length the fraction stays at 0.0
    /// until the final 1.0.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, a non-success HTTP status,
    /// or an I/O error while writing the destination.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        headers: &[(&str, &str)],
        progress: ProgressFn<'_>,
    ) -> Result<(), Error> {
        let response = self.get(url, headers).await?;
        let total = response.content_length().unwrap_or(0);
        debug!(url, total, dest = %dest.display(), "starting download");

        let part = dest.with_extension(part_extension(dest));
        let mut file = tokio::fs::File::create(&part)
            .await
            .map_err(|e| Error::io_with_path(&e, &part))?;

        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        progress(0.0);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;
            tokio::io::AsyncWriteExt::write_all(&mut file, &chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, &part))?;

            downloaded += chunk.len() as u64;
            if total > 0 {
                #[allow(clippy::cast_precision_loss)]
                progress((downloaded as f64 / total as f64).min(1.0));
            }
        }

        tokio::io::AsyncWriteExt::flush(&mut file)
            .await
            .map_err(|e| Error::io_with_path(&e, &part))?;
        drop(file);

        tokio::fs::rename(&part, dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        progress(1.0);

        Ok(())
    }

    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Response, Error> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::from(NetworkError::Timeout {
                    url: url.to_string(),
                })
            } else if e.is_connect() {
                NetworkError::ConnectionRefused(e.to_string()).into()
            } else if e.is_builder() {
                NetworkError::InvalidUrl(url.to_string()).into()
            } else {
                NetworkError::DownloadFailed(e.to_string()).into()
            }
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(NetworkError::HttpError {
                status: response.status().as_u16(),
                url: url.to_string(),
            }
            .into())
        }
    }
}

fn part_extension(dest: &Path) -> String {
    match dest.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.part"),
        None => "part".to_string(),
    }
}
