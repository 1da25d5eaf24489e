//! Error kinds of the install workflow
//!
//! Every step converts its failures into an [`InstallError`] at the point
//! where they happen. The attached sources are for logs; users only ever see
//! the localized text behind [`InstallError::message_key`].

use std::path::PathBuf;
use thiserror::Error;

use crate::i18n::MessageKey;
use crate::preflight::Capability;

#[derive(Error, Debug)]
pub enum InstallError {
    /// The runtime lacks something the install needs
    #[error("Missing capabilities: {}", format_capabilities(.0))]
    MissingCapability(Vec<Capability>),

    #[error("Working directory '{path}' is not writable")]
    WorkingDirectoryNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Target directory '{path}' is not writable")]
    DirectoryNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Target directory '{path}' is not empty (found '{entry}')")]
    DirectoryNotEmpty { path: PathBuf, entry: String },

    #[error("No target directory given")]
    EmptyDirectoryInput,

    #[error("Target directory '{input}' leaves the working directory")]
    DirectoryOutsideRoot { input: String },

    #[error("Download URL of the latest release could not be retrieved from '{endpoint}': {reason}")]
    UrlResolutionFailed { endpoint: String, reason: String },

    #[error("Download of '{url}' failed: {reason}")]
    DownloadFailed {
        url: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Extraction of '{archive}' failed")]
    ExtractionFailed {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Warning-level: the install itself succeeded
    #[error("Installer file '{path}' could not be removed")]
    SelfDeleteFailed {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },
}

pub type Result<T> = std::result::Result<T, InstallError>;

fn format_capabilities(capabilities: &[Capability]) -> String {
    capabilities
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Warning,
    UserInput,
    Environment,
    Upstream,
}

impl InstallError {
    /// Localized message shown in place of this error
    pub fn message_key(&self) -> MessageKey {
        match self {
            InstallError::MissingCapability(_) => MessageKey::MissingCapabilities,
            InstallError::WorkingDirectoryNotWritable { .. } => MessageKey::WorkingDirectoryNotWritable,
            InstallError::DirectoryNotWritable { .. } => MessageKey::TargetDirectoryNotWritable,
            InstallError::DirectoryNotEmpty { .. } => MessageKey::DirectoryNotEmpty,
            InstallError::EmptyDirectoryInput => MessageKey::EmptyDirectoryInput,
            InstallError::DirectoryOutsideRoot { .. } => MessageKey::DirectoryOutsideRoot,
            InstallError::UrlResolutionFailed { .. } => MessageKey::UrlResolutionFailed,
            InstallError::DownloadFailed { .. } => MessageKey::DownloadFailed,
            InstallError::ExtractionFailed { .. } => MessageKey::ExtractionFailed,
            InstallError::SelfDeleteFailed { .. } => MessageKey::SelfDeleteFailed,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            InstallError::MissingCapability(_) => "missing_capability",
            InstallError::WorkingDirectoryNotWritable { .. } => "working_directory_not_writable",
            InstallError::DirectoryNotWritable { .. } => "directory_not_writable",
            InstallError::DirectoryNotEmpty { .. } => "directory_not_empty",
            InstallError::EmptyDirectoryInput => "empty_directory_input",
            InstallError::DirectoryOutsideRoot { .. } => "directory_outside_root",
            InstallError::UrlResolutionFailed { .. } => "url_resolution_failed",
            InstallError::DownloadFailed { .. } => "download_failed",
            InstallError::ExtractionFailed { .. } => "extraction_failed",
            InstallError::SelfDeleteFailed { .. } => "self_delete_failed",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            InstallError::SelfDeleteFailed { .. } => ErrorSeverity::Warning,
            InstallError::DirectoryNotEmpty { .. }
            | InstallError::EmptyDirectoryInput
            | InstallError::DirectoryOutsideRoot { .. } => ErrorSeverity::UserInput,
            InstallError::MissingCapability(_)
            | InstallError::WorkingDirectoryNotWritable { .. }
            | InstallError::DirectoryNotWritable { .. }
            | InstallError::ExtractionFailed { .. } => ErrorSeverity::Environment,
            InstallError::UrlResolutionFailed { .. } | InstallError::DownloadFailed { .. } => {
                ErrorSeverity::Upstream
            }
        }
    }

    /// Whether the install still counts as successful
    pub fn is_warning(&self) -> bool {
        self.severity() == ErrorSeverity::Warning
    }

    pub(crate) fn url_resolution<E: Into<String>, R: std::fmt::Display>(endpoint: E, reason: R) -> Self {
        InstallError::UrlResolutionFailed {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn download<E>(url: &str, reason: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        InstallError::DownloadFailed {
            url: url.to_string(),
            reason: reason.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_delete_is_only_warning() {
        let warning = InstallError::SelfDeleteFailed {
            path: PathBuf::from("installer"),
            source: None,
        };
        assert!(warning.is_warning());
        assert!(!InstallError::EmptyDirectoryInput.is_warning());
    }

    #[test]
    fn test_not_writable_and_not_empty_are_distinct() {
        let not_writable = InstallError::DirectoryNotWritable {
            path: PathBuf::from("./out"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let not_empty = InstallError::DirectoryNotEmpty {
            path: PathBuf::from("./out"),
            entry: "stray.txt".to_string(),
        };

        assert_ne!(not_writable.message_key(), not_empty.message_key());
        assert_ne!(not_writable.category(), not_empty.category());
    }

    #[test]
    fn test_missing_capability_display_lists_names() {
        let error = InstallError::MissingCapability(vec![
            Capability::ArchiveExtraction,
            Capability::HttpClient,
        ]);
        assert_eq!(error.to_string(), "Missing capabilities: tar.gz extraction, https client");
    }
}
