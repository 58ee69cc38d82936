// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Embedding contexts
//!
//! A [`FrameHost`] loads a URL into an isolated frame and hands back an
//! [`EmbeddedFrame`], the embedding side's view of the framed window.
//! [`HttpFrameHost`] emulates what a browser does for
//! `<iframe src=...>` on a page served from the embedder origin: it fetches
//! the document as a frame navigation, enforces `X-Frame-Options` and CSP
//! `frame-ancestors`, and exposes only the window properties the platform
//! lets a cross-origin parent see.

use std::collections::BTreeMap;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::http::{frame_request_headers, HttpClient};
use crate::security::framing_blocked_by;

lazy_static! {
    static ref CHILD_FRAME_RE: Regex = Regex::new(r"(?i)<i?frame[\s>/]").unwrap();
    static ref TITLE_RE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
}

/// Window properties a cross-origin parent may read
pub const CROSS_ORIGIN_PROPERTIES: &[&str] = &[
    "blur", "close", "closed", "focus", "frames", "length", "location", "opener", "parent",
    "postMessage", "self", "top", "window",
];

/// Value of a property read from the embedded window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameProperty {
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
}

impl FrameProperty {
    /// Whether the read produced a defined value
    pub fn is_defined(&self) -> bool {
        !matches!(self, FrameProperty::Undefined)
    }
}

/// Why a property read was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The document was never committed; the frame holds an error page
    BlockedDocument(String),
    /// The property is not exposed across origins
    CrossOrigin(String),
}

impl std::fmt::Display for AccessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessError::BlockedDocument(by) => write!(f, "frame blocked by {}", by),
            AccessError::CrossOrigin(prop) => {
                write!(f, "blocked a frame from accessing cross-origin property '{}'", prop)
            }
        }
    }
}

/// Embedding-side view of a loaded frame
#[derive(Debug, Clone)]
pub struct EmbeddedFrame {
    /// Final URL of the framed document
    pub url: Url,
    /// Whether the framed document shares the embedder's origin
    pub same_origin: bool,
    /// Mechanism that refused to render the document, if any
    pub blocked_by: Option<String>,
    properties: BTreeMap<String, FrameProperty>,
}

impl EmbeddedFrame {
    /// A frame whose document was committed
    pub fn rendered(url: Url, same_origin: bool) -> Self {
        Self {
            url,
            same_origin,
            blocked_by: None,
            properties: BTreeMap::new(),
        }
    }

    /// A frame whose document was refused by a framing policy
    pub fn blocked(url: Url, by: impl Into<String>) -> Self {
        Self {
            url,
            same_origin: false,
            blocked_by: Some(by.into()),
            properties: BTreeMap::new(),
        }
    }

    /// Set a window property
    pub fn with_property(mut self, name: impl Into<String>, value: FrameProperty) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Whether the framed document was committed
    pub fn is_rendered(&self) -> bool {
        self.blocked_by.is_none()
    }

    /// Read a property of the embedded window from the embedding side
    pub fn read_property(&self, name: &str) -> std::result::Result<FrameProperty, AccessError> {
        if let Some(ref by) = self.blocked_by {
            return Err(AccessError::BlockedDocument(by.clone()));
        }
        if !self.same_origin && !CROSS_ORIGIN_PROPERTIES.contains(&name) {
            return Err(AccessError::CrossOrigin(name.to_string()));
        }
        Ok(self
            .properties
            .get(name)
            .cloned()
            .unwrap_or(FrameProperty::Undefined))
    }
}

/// Terminal event of a frame load
#[derive(Debug, Clone)]
pub enum FrameLoad {
    /// `load` fired
    Loaded(EmbeddedFrame),
    /// `error` fired
    Failed(String),
}

/// Platform primitive that renders a URL inside an isolated frame
#[async_trait]
pub trait FrameHost: Send + Sync {
    /// Load `url` into a fresh frame and wait for its terminal event
    async fn load(&self, url: &Url) -> FrameLoad;
}

/// Frame host that emulates browser framing rules over plain HTTP
pub struct HttpFrameHost {
    client: HttpClient,
    embedder: Url,
}

impl HttpFrameHost {
    /// Create a frame host that frames targets from `embedder`'s origin
    pub fn new(client: HttpClient, embedder: Url) -> Self {
        Self { client, embedder }
    }

    /// Origin the frames are embedded from
    pub fn embedder(&self) -> &Url {
        &self.embedder
    }

    fn build_frame(&self, url: Url, body: &str, is_html: bool, blocked_by: Option<&str>) -> EmbeddedFrame {
        if let Some(by) = blocked_by {
            return EmbeddedFrame::blocked(url, by);
        }

        let same_origin = self.embedder.origin() == url.origin();
        let child_frames = if is_html {
            CHILD_FRAME_RE.find_iter(body).count()
        } else {
            0
        };

        let mut frame = EmbeddedFrame::rendered(url.clone(), same_origin)
            .with_property("length", FrameProperty::Number(child_frames as f64))
            .with_property("closed", FrameProperty::Bool(false))
            .with_property("location", FrameProperty::String(url.to_string()));

        if let Some(title) = TITLE_RE.captures(body).and_then(|c| c.get(1)) {
            frame = frame.with_property(
                "title",
                FrameProperty::String(title.as_str().trim().to_string()),
            );
        }

        frame
    }
}

#[async_trait]
impl FrameHost for HttpFrameHost {
    async fn load(&self, url: &Url) -> FrameLoad {
        if !matches!(url.scheme(), "http" | "https") {
            return FrameLoad::Failed(format!("Unsupported scheme: {}", url.scheme()));
        }

        let response = match self
            .client
            .get_with_headers(url.as_str(), &frame_request_headers::ALL)
            .await
        {
            Ok(r) => r,
            Err(e) => return FrameLoad::Failed(e.to_string()),
        };

        let headers = response.header_set();
        let blocked_by = framing_blocked_by(
            headers.get("x-frame-options"),
            headers.get("content-security-policy"),
            &self.embedder,
            &response.url,
        );

        if let Some(by) = blocked_by {
            debug!("Frame load of {} refused by {}", response.url, by);
        }

        let body = response.text_lossy();
        FrameLoad::Loaded(self.build_frame(
            response.url.clone(),
            &body,
            response.is_html(),
            blocked_by,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn host() -> HttpFrameHost {
        HttpFrameHost::new(HttpClient::new().unwrap(), url("https://attacker.invalid/"))
    }

    #[test]
    fn test_cross_origin_reads() {
        let frame = host().build_frame(
            url("https://bank.test/"),
            "<html><title> Bank </title><iframe src=a></iframe><IFRAME src=b></IFRAME></html>",
            true,
            None,
        );

        assert!(frame.is_rendered());
        assert!(!frame.same_origin);
        assert_eq!(frame.read_property("length"), Ok(FrameProperty::Number(2.0)));
        assert_eq!(
            frame.read_property("title"),
            Err(AccessError::CrossOrigin("title".into()))
        );
        assert_eq!(frame.read_property("opener"), Ok(FrameProperty::Undefined));
    }

    #[test]
    fn test_same_origin_reads() {
        let frame = host().build_frame(
            url("https://attacker.invalid/inner"),
            "<title>Inner</title>",
            true,
            None,
        );
        assert!(frame.same_origin);
        assert_eq!(
            frame.read_property("title"),
            Ok(FrameProperty::String("Inner".into()))
        );
    }

    #[test]
    fn test_blocked_frame_denies_everything() {
        let frame = host().build_frame(url("https://bank.test/"), "", true, Some("x-frame-options"));
        assert!(!frame.is_rendered());
        assert_eq!(
            frame.read_property("length"),
            Err(AccessError::BlockedDocument("x-frame-options".into()))
        );
    }

    #[tokio::test]
    async fn test_non_http_scheme_fails() {
        let load = host().load(&url("file:///etc/passwd")).await;
        assert!(matches!(load, FrameLoad::Failed(_)));
    }
}
