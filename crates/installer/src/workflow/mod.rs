//! Install workflow
//!
//! Every request is evaluated from scratch: the submitted step decides
//! whether the form is shown, an install runs, or the invalid-step page is
//! produced. Nothing is kept between requests apart from the files on disk.
//!
//! An install runs strictly in order and stops at the first failure:
//!
//! 1. validate the target directory
//! 2. resolve the latest download URL (skipped when the archive is cached)
//! 3. download the archive (skipped when cached)
//! 4. extract the archive into the target
//!
//! On success the installer removes its own file.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, info_span, warn, Instrument};

use crate::config::InstallerConfig;
use crate::downloader::{
    ArchiveDownloader, HttpArchiveDownloader, IntoProgressCallback, TracingProgressReporter,
};
use crate::error::{InstallError, Result};
use crate::extract::extract_archive_blocking;
use crate::preflight::{check_dependencies, is_windows};
use crate::release::{HttpReleaseResolver, ReleaseResolver};
use crate::target_dir::{validate_target_directory, TargetDirectory};

/// Step requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallStep {
    #[default]
    ShowForm,
    RunInstall,
    Invalid,
}

impl InstallStep {
    /// Interpret the untrusted `step` form value
    ///
    /// The value is read like an integer prefix (`"1abc"` is 1, garbage is 0).
    /// 0 and 1 select the form and the install, 2 is the invalid-step page and
    /// anything else falls back to the form.
    pub fn from_input(raw: Option<&str>) -> Self {
        match raw.map(leading_integer).unwrap_or(0) {
            1 => InstallStep::RunInstall,
            2 => InstallStep::Invalid,
            _ => InstallStep::ShowForm,
        }
    }
}

fn leading_integer(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// Input of a single installer request
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    pub step: InstallStep,
    pub directory: Option<String>,
    /// User agent of the requesting client, forwarded to the archive download
    pub user_agent: Option<String>,
}

impl InstallRequest {
    pub fn new(step: InstallStep) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    pub fn with_directory<S: Into<String>>(mut self, directory: S) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// What a request resolved to
#[derive(Debug)]
pub enum InstallOutcome {
    /// The form, or the preflight error that replaces it
    AwaitingInput {
        preflight_error: Option<InstallError>,
        windows_warning: bool,
    },
    Succeeded {
        target: TargetDirectory,
        /// Link to the product's own setup, relative to the installer
        continuation_link: String,
        /// Directory the web server has to serve
        document_root: PathBuf,
        /// Set when the installer could not remove itself
        self_delete_warning: Option<InstallError>,
    },
    Failed(InstallError),
    Invalid,
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Succeeded { .. })
    }
}

/// The installer's request-scoped state machine
pub struct InstallWorkflow {
    config: InstallerConfig,
    resolver: Arc<dyn ReleaseResolver>,
    downloader: Arc<dyn ArchiveDownloader>,
}

impl InstallWorkflow {
    /// Workflow backed by the configured release endpoint
    pub fn new(config: InstallerConfig) -> Result<Self> {
        let resolver = Arc::new(HttpReleaseResolver::from_config(&config)?);
        let downloader = Arc::new(HttpArchiveDownloader::from_config(&config)?);
        Ok(Self::with_components(config, resolver, downloader))
    }

    pub fn with_components(
        config: InstallerConfig,
        resolver: Arc<dyn ReleaseResolver>,
        downloader: Arc<dyn ArchiveDownloader>,
    ) -> Self {
        Self {
            config,
            resolver,
            downloader,
        }
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Evaluate one request
    pub async fn handle(&self, request: InstallRequest) -> InstallOutcome {
        match request.step {
            InstallStep::ShowForm => self.show_form(),
            InstallStep::Invalid => {
                warn!("Invalid install step requested");
                InstallOutcome::Invalid
            }
            InstallStep::RunInstall => {
                let directory = request.directory.unwrap_or_default();
                match self.install(&directory, request.user_agent.as_deref()).await {
                    Ok(target) => self.succeed(target),
                    Err(e) => {
                        error!(category = e.category(), "Install failed: {}", e);
                        InstallOutcome::Failed(e)
                    }
                }
            }
        }
    }

    /// Initial state; the preflight decides whether the form can be used
    pub fn show_form(&self) -> InstallOutcome {
        InstallOutcome::AwaitingInput {
            preflight_error: check_dependencies(self.config.root()).err(),
            windows_warning: is_windows(),
        }
    }

    /// Run the install steps, stopping at the first failure
    ///
    /// The preflight runs again first, a failed one never gets past the form.
    /// A failed run leaves a downloaded archive in place so the next attempt
    /// can skip the download.
    pub async fn install(&self, directory: &str, user_agent: Option<&str>) -> Result<TargetDirectory> {
        check_dependencies(self.config.root())?;

        let target = validate_target_directory(
            self.config.root(),
            directory,
            self.config.installer_file_name(),
        )?;

        let span = info_span!("install", target = %target);
        self.fetch_and_extract(&target, user_agent).instrument(span).await?;

        info!("Installed into {}", target);
        Ok(target)
    }

    async fn fetch_and_extract(&self, target: &TargetDirectory, user_agent: Option<&str>) -> Result<()> {
        let archive_path = self.config.archive_path();

        if archive_path.exists() {
            info!("Reusing cached archive {}", archive_path.display());
        } else {
            let url = self.resolver.resolve_latest_download_url().await?;
            self.downloader
                .download_file(
                    &url,
                    &archive_path,
                    user_agent,
                    Some(TracingProgressReporter.into_callback()),
                )
                .await?;
        }

        extract_archive_blocking(archive_path, target.resolve(self.config.root())).await
    }

    /// Remove the installer file
    ///
    /// Only ever invoked after a successful install. A file that is already
    /// gone counts as removed.
    pub fn finalize(&self) -> Result<()> {
        let path = &self.config.installer_path;
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("Removed installer {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(InstallError::SelfDeleteFailed {
                path: path.clone(),
                source: Some(source),
            }),
        }
    }

    fn succeed(&self, target: TargetDirectory) -> InstallOutcome {
        let self_delete_warning = self.finalize().err();
        if let Some(ref warning) = self_delete_warning {
            warn!("{}", warning);
        }

        let root = std::path::absolute(self.config.root()).unwrap_or_else(|_| self.config.root.clone());

        InstallOutcome::Succeeded {
            continuation_link: target.continuation_link(),
            document_root: target.document_root(&root),
            target,
            self_delete_warning,
        }
    }
}
