//! Archive downloader
//!
//! Streams the release archive to disk. Whether a download happens at all is
//! decided by the caller: an archive that already exists is reused as is.

pub mod http;
pub mod progress;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

pub use http::HttpArchiveDownloader;
pub use progress::{
    IntoProgressCallback, ProgressCallback, ProgressEvent, ProgressReporter,
    TracingProgressReporter,
};

/// Download implementation used by the install workflow
#[async_trait]
pub trait ArchiveDownloader: Send + Sync {
    /// Stream `url` into `destination`, truncating any existing file
    ///
    /// `user_agent` is the agent of the client that asked for the install.
    /// Returns the number of bytes written. Every failure is an
    /// [`InstallError::DownloadFailed`](crate::InstallError::DownloadFailed).
    async fn download_file(
        &self,
        url: &str,
        destination: &Path,
        user_agent: Option<&str>,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<u64>;
}
