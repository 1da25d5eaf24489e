//! Latest-release lookup
//!
//! The upstream metadata endpoint returns a GitHub-style release document;
//! the first asset's `browser_download_url` is what gets downloaded.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info_span, warn, Instrument};

use crate::config::InstallerConfig;
use crate::error::{InstallError, Result};

/// Release metadata
#[derive(Deserialize, Debug, Clone)]
pub struct LatestRelease {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Release asset
#[derive(Deserialize, Debug, Clone)]
pub struct ReleaseAsset {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

impl LatestRelease {
    /// Download URL of the first asset, if it names a usable absolute URL
    pub fn first_asset_url(&self) -> Option<&str> {
        let url = self.assets.first()?.browser_download_url.as_deref()?.trim();
        if url.is_empty() || url::Url::parse(url).is_err() {
            return None;
        }
        Some(url)
    }
}

/// Source of the download URL for the latest release
#[async_trait]
pub trait ReleaseResolver: Send + Sync {
    /// Every failure collapses into [`InstallError::UrlResolutionFailed`]
    async fn resolve_latest_download_url(&self) -> Result<String>;
}

/// Resolver backed by the release metadata HTTP endpoint
pub struct HttpReleaseResolver {
    client: Client,
    endpoint: String,
}

impl HttpReleaseResolver {
    pub fn new<E: Into<String>, A: AsRef<str>>(endpoint: E, user_agent: A) -> Result<Self> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .user_agent(user_agent.as_ref())
            .build()
            .map_err(|e| InstallError::url_resolution(&endpoint, format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &InstallerConfig) -> Result<Self> {
        Self::new(config.release_url.clone(), &config.user_agent)
    }

    async fn fetch(&self) -> Result<LatestRelease> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| InstallError::url_resolution(&self.endpoint, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| InstallError::url_resolution(&self.endpoint, e))?;

        response
            .json::<LatestRelease>()
            .await
            .map_err(|e| InstallError::url_resolution(&self.endpoint, format!("Malformed release metadata: {}", e)))
    }
}

#[async_trait]
impl ReleaseResolver for HttpReleaseResolver {
    async fn resolve_latest_download_url(&self) -> Result<String> {
        async move {
            let release = self.fetch().await.inspect_err(|e| warn!("{}", e))?;
            debug!(
                "Latest release {:?} lists {} asset(s)",
                release.tag_name,
                release.assets.len()
            );

            match release.first_asset_url() {
                Some(url) => {
                    debug!("Resolved download URL: {}", url);
                    Ok(url.to_string())
                }
                None => {
                    warn!("Release metadata from {} has no usable asset URL", self.endpoint);
                    Err(InstallError::url_resolution(&self.endpoint, "No asset with a download URL"))
                }
            }
        }
        .instrument(info_span!("resolve_release", endpoint = %self.endpoint))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn resolver_for(server: &MockServer) -> HttpReleaseResolver {
        HttpReleaseResolver::new(format!("{}/releases/latest", server.uri()), "limbas/web-installer").unwrap()
    }

    #[tokio::test]
    async fn test_resolves_first_asset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/releases/latest"))
            .and(header("user-agent", "limbas/web-installer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tag_name": "5.3.0",
                "assets": [
                    { "name": "openlimbas.tar.gz", "browser_download_url": "https://example.com/first.tar.gz" },
                    { "name": "other.tar.gz", "browser_download_url": "https://example.com/second.tar.gz" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = resolver_for(&server).await.resolve_latest_download_url().await.unwrap();
        assert_eq!(url, "https://example.com/first.tar.gz");
    }

    #[tokio::test]
    async fn test_empty_asset_list_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tag_name": "5.3.0", "assets": [] })))
            .mount(&server)
            .await;

        let result = resolver_for(&server).await.resolve_latest_download_url().await;
        assert!(matches!(result, Err(InstallError::UrlResolutionFailed { .. })));
    }

    #[tokio::test]
    async fn test_empty_url_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "assets": [ { "name": "x", "browser_download_url": "" } ]
            })))
            .mount(&server)
            .await;

        let result = resolver_for(&server).await.resolve_latest_download_url().await;
        assert!(matches!(result, Err(InstallError::UrlResolutionFailed { .. })));
    }

    #[tokio::test]
    async fn test_malformed_json_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&server)
            .await;

        let result = resolver_for(&server).await.resolve_latest_download_url().await;
        assert!(matches!(result, Err(InstallError::UrlResolutionFailed { .. })));
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
            .mount(&server)
            .await;

        let result = resolver_for(&server).await.resolve_latest_download_url().await;
        assert!(matches!(result, Err(InstallError::UrlResolutionFailed { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails() {
        // Nothing listens on port 9 on loopback
        let resolver = HttpReleaseResolver::new("http://127.0.0.1:9/releases/latest", "agent").unwrap();
        let result = resolver.resolve_latest_download_url().await;
        assert!(matches!(result, Err(InstallError::UrlResolutionFailed { .. })));
    }
}
