//! HTTP archive downloader

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info_span, warn, Instrument};

use super::{ArchiveDownloader, ProgressCallback, ProgressEvent};
use crate::config::InstallerConfig;
use crate::error::{InstallError, Result};

/// Streaming HTTP downloader
///
/// Follows redirects and verifies TLS certificates (both reqwest defaults).
/// No timeout is set: large archives on slow links must still finish.
pub struct HttpArchiveDownloader {
    client: Client,
}

impl HttpArchiveDownloader {
    pub fn new<S: AsRef<str>>(fallback_user_agent: S) -> Result<Self> {
        let client = Client::builder()
            .user_agent(fallback_user_agent.as_ref())
            .build()
            .map_err(|e| InstallError::download("<none>", "Failed to create HTTP client", e))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &InstallerConfig) -> Result<Self> {
        Self::new(&config.user_agent)
    }

    async fn stream_to_file(
        &self,
        url: &str,
        destination: &Path,
        user_agent: Option<&str>,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<u64> {
        let mut request = self.client.get(url);
        if let Some(agent) = user_agent.filter(|a| !a.is_empty()) {
            request = request.header(USER_AGENT, agent);
        }

        let response = request
            .send()
            .await
            .map_err(|e| InstallError::download(url, "Request failed", e))?;

        // A non-success body (error page, rate limit notice) is not an archive
        let response = response
            .error_for_status()
            .map_err(|e| InstallError::download(url, "Server returned an error status", e))?;

        let total_size = response.content_length();
        debug!("Content length: {:?}", total_size);

        if let Some(ref callback) = progress_callback {
            callback(ProgressEvent::DownloadStarted {
                url: url.to_string(),
                total_size,
            });
        }

        let mut file = fs::File::create(destination)
            .await
            .map_err(|e| InstallError::download(url, "Could not create destination file", e))?;

        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        let start_time = std::time::Instant::now();
        let mut last_progress_time = start_time;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| InstallError::download(url, "Transfer interrupted", e))?;

            file.write_all(&chunk)
                .await
                .map_err(|e| InstallError::download(url, "Could not write destination file", e))?;

            downloaded += chunk.len() as u64;

            // Report progress at most every 100ms to avoid spam
            let now = std::time::Instant::now();
            if now.duration_since(last_progress_time).as_millis() >= 100 {
                if let Some(ref callback) = progress_callback {
                    let elapsed = start_time.elapsed().as_secs_f64();
                    let speed = if elapsed > 0.0 { downloaded as f64 / elapsed } else { 0.0 };

                    callback(ProgressEvent::DownloadProgress {
                        url: url.to_string(),
                        downloaded,
                        total: total_size,
                        speed_bps: speed,
                    });
                }
                last_progress_time = now;
            }
        }

        file.flush()
            .await
            .map_err(|e| InstallError::download(url, "Could not write destination file", e))?;
        file.sync_all()
            .await
            .map_err(|e| InstallError::download(url, "Could not write destination file", e))?;

        if let Some(ref callback) = progress_callback {
            callback(ProgressEvent::DownloadComplete {
                url: url.to_string(),
                final_size: downloaded,
            });
        }

        Ok(downloaded)
    }
}

#[async_trait]
impl ArchiveDownloader for HttpArchiveDownloader {
    async fn download_file(
        &self,
        url: &str,
        destination: &Path,
        user_agent: Option<&str>,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<u64> {
        async move {
            debug!("Stream downloading: {} to {}", url, destination.display());

            match self.stream_to_file(url, destination, user_agent, progress_callback).await {
                Ok(size) => {
                    debug!("Stream download completed: {} bytes", size);
                    Ok(size)
                }
                Err(e) => {
                    // An incomplete file would otherwise be taken for a cached archive
                    if fs::remove_file(destination).await.is_ok() {
                        debug!("Removed incomplete download {}", destination.display());
                    }
                    warn!("{}", e);
                    Err(e)
                }
            }
        }
        .instrument(info_span!("archive_download", url = %url))
        .await
    }
}
