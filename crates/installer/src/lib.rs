//! Web installer library
//!
//! This library downloads the latest release archive of Limbas from its
//! release API, extracts it into a directory chosen through a small web form
//! and removes the installer afterwards.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use web_installer::{InstallRequest, InstallStep, InstallWorkflow, InstallerConfig};
//!
//! # async fn example() -> web_installer::Result<()> {
//! let config = InstallerConfig::from_env()
//!     .with_root("/var/www")
//!     .with_installer_path("/var/www/limbas-installer");
//!
//! let workflow = InstallWorkflow::new(config)?;
//!
//! let request = InstallRequest::new(InstallStep::RunInstall)
//!     .with_directory("./openlimbas");
//!
//! let outcome = workflow.handle(request).await;
//! println!("Install result: {:?}", outcome);
//! # Ok(())
//! # }
//! ```
//!
//! To serve the form instead, hand the workflow to [`web::serve`].

pub mod config;
pub mod downloader;
pub mod error;
pub mod extract;
pub mod i18n;
pub mod preflight;
pub mod release;
pub mod target_dir;
pub mod web;
pub mod workflow;

// Re-export commonly used types for convenience
pub use config::InstallerConfig;
pub use downloader::{ArchiveDownloader, HttpArchiveDownloader, ProgressCallback, ProgressEvent};
pub use error::{ErrorSeverity, InstallError, Result};
pub use i18n::{Locale, MessageKey};
pub use preflight::{check_dependencies, Capability};
pub use release::{HttpReleaseResolver, ReleaseResolver};
pub use target_dir::{validate_target_directory, TargetDirectory};
pub use workflow::{InstallOutcome, InstallRequest, InstallStep, InstallWorkflow};
