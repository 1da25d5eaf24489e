//! Environment preflight checks

use std::io::Read;
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::{debug, warn};

use crate::error::{InstallError, Result};

/// Something the runtime must provide for an install to work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Reading gzip-compressed tarballs
    ArchiveExtraction,
    /// HTTPS client with a working TLS backend
    HttpClient,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::ArchiveExtraction => "tar.gz extraction",
            Capability::HttpClient => "https client",
        }
    }
}

/// Verify the installer can run in the current environment
///
/// Missing capabilities are reported together; writability of `root` is only
/// checked once every capability is present.
pub fn check_dependencies(root: &Path) -> Result<()> {
    let missing = missing_capabilities();
    if !missing.is_empty() {
        warn!("Preflight failed, missing: {:?}", missing);
        return Err(InstallError::MissingCapability(missing));
    }

    probe_writable(root).map_err(|source| InstallError::WorkingDirectoryNotWritable {
        path: root.to_path_buf(),
        source,
    })?;

    debug!("Preflight passed for {}", root.display());
    Ok(())
}

/// Capabilities whose self-test fails
pub fn missing_capabilities() -> Vec<Capability> {
    let mut missing = Vec::new();
    if !archive_roundtrip_works() {
        missing.push(Capability::ArchiveExtraction);
    }
    if reqwest::Client::builder().build().is_err() {
        missing.push(Capability::HttpClient);
    }
    missing
}

/// Platform hint: the product is not officially supported on Windows
pub fn is_windows() -> bool {
    cfg!(windows)
}

/// Check that files can be created in `dir`
///
/// The probe file is removed again when it goes out of scope.
pub(crate) fn probe_writable(dir: &Path) -> std::io::Result<()> {
    let probe = tempfile::Builder::new()
        .prefix(".installer-probe")
        .tempfile_in(dir)?;
    debug!("Write probe succeeded: {}", probe.path().display());
    Ok(())
}

/// Pack a single entry into an in-memory tar.gz and read it back
fn archive_roundtrip_works() -> bool {
    let build = || -> std::io::Result<Vec<u8>> {
        let payload = b"probe";
        let mut header = tar::Header::new_gnu();
        header.set_size(payload.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));
        builder.append_data(&mut header, "probe.txt", &payload[..])?;
        builder.into_inner()?.finish()
    };

    let read_back = |bytes: Vec<u8>| -> std::io::Result<bool> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
        for entry in archive.entries()? {
            let mut entry = entry?;
            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            if content == b"probe" {
                return Ok(true);
            }
        }
        Ok(false)
    };

    match build().and_then(read_back) {
        Ok(found) => found,
        Err(e) => {
            debug!("Archive self-test failed: {}", e);
            false
        }
    }
}
