//! Progress reporting for archive downloads

use std::sync::Arc;

use tracing::{debug, info};

/// Progress callback for download operations
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Events emitted while an archive is downloaded
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    DownloadStarted {
        url: String,
        total_size: Option<u64>,
    },
    DownloadProgress {
        url: String,
        downloaded: u64,
        total: Option<u64>,
        speed_bps: f64,
    },
    DownloadComplete {
        url: String,
        final_size: u64,
    },
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_download_started(&self, _url: &str, _total_size: Option<u64>) {}
    fn on_download_progress(&self, _url: &str, _downloaded: u64, _total: Option<u64>, _speed_bps: f64) {}
    fn on_download_complete(&self, _url: &str, _final_size: u64) {}
}

/// Extension trait to convert ProgressReporter to ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::DownloadStarted { url, total_size } => {
                self.on_download_started(&url, total_size);
            }
            ProgressEvent::DownloadProgress { url, downloaded, total, speed_bps } => {
                self.on_download_progress(&url, downloaded, total, speed_bps);
            }
            ProgressEvent::DownloadComplete { url, final_size } => {
                self.on_download_complete(&url, final_size);
            }
        })
    }
}

/// Reports download progress through `tracing`
#[derive(Debug, Default)]
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn on_download_started(&self, url: &str, total_size: Option<u64>) {
        match total_size {
            Some(size) => info!("Downloading {} ({:.1} MB)", url, size as f64 / 1_048_576.0),
            None => info!("Downloading {}", url),
        }
    }

    fn on_download_progress(&self, _url: &str, downloaded: u64, total: Option<u64>, speed_bps: f64) {
        let speed_kb = speed_bps / 1024.0;
        match total {
            Some(total) if total > 0 => {
                let percent = (downloaded as f64 / total as f64) * 100.0;
                debug!("Progress: {:.1}% ({:.1} KB/s)", percent, speed_kb);
            }
            _ => debug!("Progress: {} bytes ({:.1} KB/s)", downloaded, speed_kb),
        }
    }

    fn on_download_complete(&self, url: &str, final_size: u64) {
        info!("Download of {} complete: {} bytes", url, final_size);
    }
}
