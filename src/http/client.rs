// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Default headers
    pub default_headers: HeaderMap,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            "accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            "accept-language",
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            proxy: None,
        }
    }
}

/// Thin reqwest wrapper shared by the header fetchers and the frame host
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone());

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Execute a GET request
    pub async fn get(&self, url: impl AsRef<str>) -> Result<Response> {
        self.get_with_headers(url, &[]).await
    }

    /// Execute a GET request with extra request headers
    pub async fn get_with_headers(
        &self,
        url: impl AsRef<str>,
        headers: &[(&str, &str)],
    ) -> Result<Response> {
        let url = Url::parse(url.as_ref())?;
        let mut builder = self.client.request(Method::GET, url.clone());
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder, url).await
    }

    /// Execute a POST request with a JSON body
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: impl AsRef<str>,
        body: &T,
    ) -> Result<Response> {
        let url = Url::parse(url.as_ref())?;
        let builder = self.client.request(Method::POST, url.clone()).json(body);
        self.send(builder, url).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder, url: Url) -> Result<Response> {
        let start = Instant::now();

        let response = builder.send().await?;
        let response_time = start.elapsed().as_millis() as u64;

        let redirected = response.url() != &url;
        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!(
            "{} -> {} ({} bytes, {}ms)",
            url,
            status.as_u16(),
            body.len(),
            response_time
        );

        Ok(Response::new(
            status,
            headers,
            body,
            final_url,
            redirected,
            response_time,
        ))
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.config().user_agent, DEFAULT_USER_AGENT);
        assert_eq!(client.config().max_redirects, 10);
    }

    #[test]
    fn test_invalid_proxy() {
        let config = HttpClientConfig {
            proxy: Some("not a proxy url".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            HttpClient::with_config(config),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = HttpClient::new().unwrap();
        assert!(matches!(client.get("not a url").await, Err(Error::Url(_))));
    }
}
