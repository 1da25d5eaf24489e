//! Target directory normalization and validation

use std::ffi::OsStr;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{InstallError, Result};
use crate::preflight::probe_writable;

/// A normalized, relative install location
///
/// Always either `.` or `./<path>` where `<path>` neither starts nor ends
/// with a dot or slash and has no `.`/`..` components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDirectory(String);

const SEPARATORS: [char; 2] = ['/', '\\'];

impl TargetDirectory {
    /// Normalize user input
    ///
    /// Surrounding whitespace is trimmed, then leading and trailing dots and
    /// slashes, so `../out.` becomes `./out`. Input that strips to nothing is
    /// the current directory. A `..` left inside the path would climb out of
    /// the root and is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InstallError::EmptyDirectoryInput);
        }

        let cleaned = trimmed.trim_matches(|c: char| c == '.' || SEPARATORS.contains(&c));

        let mut components = Vec::new();
        for component in cleaned.split(SEPARATORS) {
            match component {
                "" | "." => continue,
                ".." => {
                    return Err(InstallError::DirectoryOutsideRoot {
                        input: trimmed.to_string(),
                    });
                }
                other => components.push(other),
            }
        }

        if components.is_empty() {
            return Ok(Self(".".to_string()));
        }
        Ok(Self(format!("./{}", components.join("/"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_current_dir(&self) -> bool {
        self.0 == "."
    }

    /// Location below `root`
    pub fn resolve(&self, root: &Path) -> PathBuf {
        if self.is_current_dir() {
            root.to_path_buf()
        } else {
            root.join(&self.0[2..])
        }
    }

    /// Link to the product's own setup, relative to the installer's URL
    pub fn continuation_link(&self) -> String {
        format!("{}/public/install", self.0)
    }

    /// Directory the web server must serve after the install
    pub fn document_root(&self, root: &Path) -> PathBuf {
        self.resolve(root).join("public")
    }
}

impl fmt::Display for TargetDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize `input` and check that it can receive the product
///
/// A missing directory is fine, it is created during extraction. An existing
/// one may only contain the installer itself and must be writable.
pub fn validate_target_directory(
    root: &Path,
    input: &str,
    installer_name: &OsStr,
) -> Result<TargetDirectory> {
    let target = TargetDirectory::parse(input)?;
    let path = target.resolve(root);

    let entries = match std::fs::read_dir(&path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Target {} does not exist yet", path.display());
            return Ok(target);
        }
        Err(e) if path.exists() && !path.is_dir() => {
            debug!("Target {} is not a directory: {}", path.display(), e);
            return Err(InstallError::DirectoryNotEmpty {
                entry: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path,
            });
        }
        Err(source) => return Err(InstallError::DirectoryNotWritable { path, source }),
    };

    for entry in entries {
        let entry = entry.map_err(|source| InstallError::DirectoryNotWritable {
            path: path.clone(),
            source,
        })?;
        let name = entry.file_name();
        if name != installer_name {
            return Err(InstallError::DirectoryNotEmpty {
                path,
                entry: name.to_string_lossy().into_owned(),
            });
        }
    }

    probe_writable(&path).map_err(|source| InstallError::DirectoryNotWritable {
        path: path.clone(),
        source,
    })?;

    debug!("Target {} validated", target);
    Ok(target)
}
