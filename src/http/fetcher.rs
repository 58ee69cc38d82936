// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Header retrieval collaborators
//!
//! The engine only needs a target's response headers and its IP address.
//! [`DirectHeaderFetcher`] requests the target itself; [`HeaderServiceClient`]
//! asks a remote check-headers service, which answers
//! `{ "headers": {...}, "ip": "..." }` or `{ "error": "..." }`.

use std::collections::BTreeMap;
use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::{Host, Url};

use super::client::HttpClient;
use crate::error::{Error, ErrorContext, Result};
use crate::security::HeaderSet;

/// Sentinel used when the target's IP address is unknown
pub const UNKNOWN_IP: &str = "-";

/// Message used when the header service gives no reason for a failure
const DEFAULT_FAILURE: &str = "Request failed";

/// Headers and address retrieved for a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedHeaders {
    /// Response headers, lower-cased names
    pub headers: HeaderSet,
    /// Resolved IP address or [`UNKNOWN_IP`]
    pub ip: String,
}

/// Retrieves response headers for a target URL
#[async_trait]
pub trait HeaderFetcher: Send + Sync {
    /// Fetch headers for `url`. Any failure is reported as `Err` and the
    /// engine turns it into an indeterminate verdict.
    async fn fetch(&self, url: &str) -> Result<FetchedHeaders>;
}

/// Fetches headers by requesting the target directly
pub struct DirectHeaderFetcher {
    client: HttpClient,
}

impl DirectHeaderFetcher {
    /// Create a fetcher using the given client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HeaderFetcher for DirectHeaderFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedHeaders> {
        let parsed = Url::parse(url).with_url(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::fetch(
                url,
                format!("Unsupported scheme: {}", parsed.scheme()),
            ));
        }

        let response = self.client.get(url).await.with_url(url)?;
        let headers = response.header_set();
        let ip = resolve_ip(&response.url)
            .await
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        debug!(
            "Fetched {} headers from {} (status {}, ip {}, {}ms{})",
            headers.len(),
            response.url,
            response.status_code(),
            ip,
            response.response_time_ms,
            if response.redirected { ", redirected" } else { "" }
        );

        Ok(FetchedHeaders { headers, ip })
    }
}

/// Resolve the first address of a URL's host
pub async fn resolve_ip(url: &Url) -> Option<String> {
    let port = url.port_or_known_default().unwrap_or(80);
    match url.host()? {
        Host::Ipv4(ip) => Some(IpAddr::V4(ip).to_string()),
        Host::Ipv6(ip) => Some(IpAddr::V6(ip).to_string()),
        Host::Domain(domain) => match tokio::net::lookup_host((domain, port)).await {
            Ok(mut addrs) => addrs.next().map(|a| a.ip().to_string()),
            Err(e) => {
                warn!("Could not resolve {}: {}", domain, e);
                None
            }
        },
    }
}

#[derive(Debug, Serialize)]
struct ServiceRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceReply {
    #[serde(default)]
    headers: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Asks a remote check-headers service for the target's headers
pub struct HeaderServiceClient {
    client: HttpClient,
    endpoint: Url,
}

impl HeaderServiceClient {
    /// Create a client for the service at `endpoint`
    pub fn new(client: HttpClient, endpoint: impl AsRef<str>) -> Result<Self> {
        let endpoint = Url::parse(endpoint.as_ref())
            .map_err(|e| Error::Config(format!("Invalid header service URL: {}", e)))?;
        Ok(Self { client, endpoint })
    }

    /// Service endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl HeaderFetcher for HeaderServiceClient {
    async fn fetch(&self, url: &str) -> Result<FetchedHeaders> {
        let response = self
            .client
            .post_json(self.endpoint.as_str(), &ServiceRequest { url })
            .await
            .with_url(url)?;

        let reply: ServiceReply = response.json().unwrap_or_default();

        if !response.is_success() {
            return Err(Error::header_service(
                Some(response.status_code()),
                reply.error.unwrap_or_else(|| DEFAULT_FAILURE.to_string()),
            ));
        }

        if let Some(error) = reply.error {
            return Err(Error::header_service(Some(response.status_code()), error));
        }

        let headers = reply
            .headers
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name, header_value_string(value)))
            .collect();

        Ok(FetchedHeaders {
            headers,
            ip: reply
                .ip
                .filter(|ip| !ip.is_empty())
                .unwrap_or_else(|| UNKNOWN_IP.to_string()),
        })
    }
}

/// Services written against Node's header object send repeated headers as
/// arrays; flatten them the way the Fetch API would.
fn header_value_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(header_value_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_value_string() {
        assert_eq!(header_value_string(json!("DENY")), "DENY");
        assert_eq!(header_value_string(json!(["a=1", "b=2"])), "a=1, b=2");
        assert_eq!(header_value_string(json!(42)), "42");
        assert_eq!(header_value_string(Value::Null), "");
    }

    #[tokio::test]
    async fn test_resolve_ip_literal() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(resolve_ip(&url).await.as_deref(), Some("127.0.0.1"));

        let url = Url::parse("http://[::1]/").unwrap();
        assert_eq!(resolve_ip(&url).await.as_deref(), Some("::1"));
    }

    #[tokio::test]
    async fn test_direct_fetch_rejects_non_http() {
        let fetcher = DirectHeaderFetcher::new(HttpClient::new().unwrap());
        let err = fetcher.fetch("ftp://example.com/").await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[test]
    fn test_service_endpoint_validation() {
        let client = HttpClient::new().unwrap();
        assert!(HeaderServiceClient::new(client.clone(), "nope").is_err());
        let svc = HeaderServiceClient::new(client, "https://svc.test/check").unwrap();
        assert_eq!(svc.endpoint().path(), "/check");
    }
}
