//! Configuration types for the installer

use std::path::{Path, PathBuf};

/// Latest-release endpoint of the upstream product
pub const DEFAULT_RELEASE_URL: &str = "https://api.github.com/repos/limbas/limbas/releases/latest";

/// User agent sent to the release metadata endpoint
pub const DEFAULT_USER_AGENT: &str = "limbas/web-installer";

/// File name of the downloaded archive, relative to the root directory
pub const DEFAULT_ARCHIVE_NAME: &str = "openlimbas.tar.gz";

/// Configuration for an installer instance
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Directory the installer serves from; target directories are relative to it
    pub root: PathBuf,
    /// Path of the installer file that gets removed after a successful install
    pub installer_path: PathBuf,
    /// Latest-release metadata endpoint
    pub release_url: String,
    /// User agent for the metadata request, and for downloads when the client sent none
    pub user_agent: String,
    /// Archive file name; its presence in `root` skips resolving and downloading
    pub archive_name: String,
}

impl InstallerConfig {
    pub fn new<P: Into<PathBuf>>(root: P, installer_path: P) -> Self {
        Self {
            root: root.into(),
            installer_path: installer_path.into(),
            ..Self::default()
        }
    }

    /// Build a configuration from defaults, `.env` and process environment
    ///
    /// Recognized variables: `INSTALLER_RELEASE_URL`, `INSTALLER_USER_AGENT`,
    /// `INSTALLER_ARCHIVE_NAME`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Ignore error if .env not present

        let mut config = Self::default();
        if let Ok(url) = std::env::var("INSTALLER_RELEASE_URL") {
            config.release_url = url;
        }
        if let Ok(agent) = std::env::var("INSTALLER_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Ok(name) = std::env::var("INSTALLER_ARCHIVE_NAME") {
            config.archive_name = name;
        }
        config
    }

    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_installer_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.installer_path = path.into();
        self
    }

    pub fn with_release_url<S: Into<String>>(mut self, url: S) -> Self {
        self.release_url = url.into();
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_archive_name<S: Into<String>>(mut self, name: S) -> Self {
        self.archive_name = name.into();
        self
    }

    /// Full path of the cached archive
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(&self.archive_name)
    }

    /// File name of the installer, tolerated inside an otherwise empty target
    pub fn installer_file_name(&self) -> &std::ffi::OsStr {
        self.installer_path
            .file_name()
            .unwrap_or_else(|| self.installer_path.as_os_str())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        let installer_path = std::env::current_exe()
            .unwrap_or_else(|_| PathBuf::from("limbas-installer"));

        Self {
            root: PathBuf::from("."),
            installer_path,
            release_url: DEFAULT_RELEASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_path_is_inside_root() {
        let config = InstallerConfig::new("/srv/www", "/srv/www/installer");
        assert_eq!(config.archive_path(), PathBuf::from("/srv/www/openlimbas.tar.gz"));
        assert_eq!(config.installer_file_name(), "installer");
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let config = InstallerConfig::default()
            .with_release_url("http://localhost/latest")
            .with_user_agent("test-agent")
            .with_archive_name("product.tar.gz");

        assert_eq!(config.release_url, "http://localhost/latest");
        assert_eq!(config.user_agent, "test-agent");
        assert!(config.archive_path().ends_with("product.tar.gz"));
    }
}
