// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Tester configuration

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::browser::DEFAULT_PROBE_TIMEOUT;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, DEFAULT_USER_AGENT};
use crate::report::{ImageAsset, ReportBranding};

/// Origin the probe frames targets from
pub const DEFAULT_EMBEDDER_ORIGIN: &str = "https://attacker.invalid/";

/// Environment variable names read by [`TesterConfig::from_env`]
pub mod env {
    pub const PROBE_TIMEOUT_MS: &str = "KEHYS_PROBE_TIMEOUT_MS";
    pub const HEADER_SERVICE: &str = "KEHYS_HEADER_SERVICE";
    pub const EMBEDDER_ORIGIN: &str = "KEHYS_EMBEDDER_ORIGIN";
    pub const USER_AGENT: &str = "KEHYS_USER_AGENT";
    pub const WATERMARK: &str = "KEHYS_WATERMARK";
}

/// Tester configuration
#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// Timer budget of the live frame probe
    pub probe_timeout: Duration,
    /// Timeout of header retrieval and frame document requests
    pub fetch_timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Origin the probe embeds targets from
    pub embedder_origin: Url,
    /// Remote check-headers service; `None` fetches headers directly
    pub header_service: Option<String>,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Report branding
    pub branding: ReportBranding,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            fetch_timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            embedder_origin: default_embedder(),
            header_service: None,
            ignore_https_errors: false,
            proxy: None,
            branding: ReportBranding::default(),
        }
    }
}

fn default_embedder() -> Url {
    Url::parse(DEFAULT_EMBEDDER_ORIGIN).expect("Invalid default embedder origin")
}

impl TesterConfig {
    /// Create a new config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the probe timer budget
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the fetch timeout
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the embedder origin
    pub fn embedder_origin(mut self, origin: impl AsRef<str>) -> Result<Self> {
        self.embedder_origin = parse_embedder(origin.as_ref())?;
        Ok(self)
    }

    /// Use a remote check-headers service
    pub fn header_service(mut self, endpoint: impl Into<String>) -> Self {
        self.header_service = Some(endpoint.into());
        self
    }

    /// Ignore HTTPS errors
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set report branding
    pub fn branding(mut self, branding: ReportBranding) -> Self {
        self.branding = branding;
        self
    }

    /// Defaults overlaid with `KEHYS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_vars(|name| std::env::var(name).ok())
    }

    /// Overlay values from a variable lookup
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = lookup(env::PROBE_TIMEOUT_MS) {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be milliseconds, got '{}'", env::PROBE_TIMEOUT_MS, ms))
            })?;
            self.probe_timeout = Duration::from_millis(ms);
        }

        if let Some(endpoint) = lookup(env::HEADER_SERVICE).filter(|v| !v.trim().is_empty()) {
            Url::parse(endpoint.trim()).map_err(|e| {
                Error::Config(format!("{} is not a URL: {}", env::HEADER_SERVICE, e))
            })?;
            self.header_service = Some(endpoint.trim().to_string());
        }

        if let Some(origin) = lookup(env::EMBEDDER_ORIGIN) {
            self.embedder_origin = parse_embedder(&origin)?;
        }

        if let Some(agent) = lookup(env::USER_AGENT).filter(|v| !v.is_empty()) {
            self.user_agent = agent;
        }

        if let Some(path) = lookup(env::WATERMARK) {
            self.branding.watermark = Some(load_watermark(Path::new(&path))?);
        }

        Ok(self)
    }

    /// HTTP client settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.fetch_timeout,
            accept_invalid_certs: self.ignore_https_errors,
            proxy: self.proxy.clone(),
            ..Default::default()
        }
    }
}

fn parse_embedder(origin: &str) -> Result<Url> {
    let url = Url::parse(origin.trim())
        .map_err(|e| Error::Config(format!("Invalid embedder origin '{}': {}", origin, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Embedder origin must be http(s), got '{}'",
            origin
        )));
    }
    Ok(url)
}

/// Load a watermark image from disk
pub fn load_watermark(path: &Path) -> Result<ImageAsset> {
    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("watermark")
        .to_string();
    Ok(ImageAsset::new(name, Bytes::from(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TesterConfig::new();
        assert_eq!(config.probe_timeout, Duration::from_millis(3000));
        assert_eq!(config.embedder_origin.host_str(), Some("attacker.invalid"));
        assert!(config.header_service.is_none());
    }

    #[test]
    fn test_builder() {
        let config = TesterConfig::new()
            .probe_timeout(Duration::from_millis(500))
            .user_agent("Custom Agent")
            .header_service("https://svc.test/check")
            .embedder_origin("http://evil.test:8080")
            .unwrap();

        assert_eq!(config.probe_timeout, Duration::from_millis(500));
        assert_eq!(config.http_config().user_agent, "Custom Agent");
        assert_eq!(config.header_service.as_deref(), Some("https://svc.test/check"));
        assert_eq!(config.embedder_origin.port(), Some(8080));
    }

    #[test]
    fn test_env_overlay() {
        let config = TesterConfig::new()
            .with_vars(vars(&[
                (env::PROBE_TIMEOUT_MS, "1200"),
                (env::HEADER_SERVICE, "https://svc.test/.netlify/functions/checkHeaders"),
            ]))
            .unwrap();
        assert_eq!(config.probe_timeout, Duration::from_millis(1200));
        assert!(config.header_service.is_some());
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let err = TesterConfig::new()
            .with_vars(vars(&[(env::PROBE_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        assert!(TesterConfig::new()
            .with_vars(vars(&[(env::EMBEDDER_ORIGIN, "ftp://x.test")]))
            .is_err());
    }

    #[test]
    fn test_load_watermark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let asset = load_watermark(&path).unwrap();
        assert_eq!(asset.name, "logo.png");
        assert_eq!(asset.data.len(), 4);
    }
}
