//! Archive extraction

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info, warn};

use crate::error::{InstallError, Result};

/// Unpack a gzip-compressed tarball into `target`, creating it if absent
///
/// Entries already written stay in place when a later one fails. On success
/// the archive is removed; a failed removal is only logged.
pub fn extract_archive(archive_path: &Path, target: &Path) -> Result<()> {
    info!("Extracting {} into {}", archive_path.display(), target.display());

    unpack(archive_path, target).map_err(|source| {
        warn!("Extraction of {} failed: {}", archive_path.display(), source);
        InstallError::ExtractionFailed {
            archive: archive_path.to_path_buf(),
            source,
        }
    })?;

    match std::fs::remove_file(archive_path) {
        Ok(()) => debug!("Removed archive {}", archive_path.display()),
        Err(e) => debug!("Could not remove archive {}: {}", archive_path.display(), e),
    }

    Ok(())
}

/// [`extract_archive`] on the blocking thread pool
pub async fn extract_archive_blocking(archive_path: PathBuf, target: PathBuf) -> Result<()> {
    let archive_for_error = archive_path.clone();
    tokio::task::spawn_blocking(move || extract_archive(&archive_path, &target))
        .await
        .map_err(|join_error| InstallError::ExtractionFailed {
            archive: archive_for_error,
            source: std::io::Error::other(join_error),
        })?
}

fn unpack(archive_path: &Path, target: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(target)?;

    let tar_gz = File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(tar_gz));
    archive.set_preserve_permissions(true);
    archive.unpack(target)
}
