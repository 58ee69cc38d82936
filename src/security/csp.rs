// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSP `frame-ancestors` parsing and matching
//!
//! A strict reading of the directive, the way a browser enforces it when
//! deciding whether a document may be framed. The header analyzer does not
//! use this; the frame host does.

use serde::{Deserialize, Serialize};
use url::{Origin, Url};

/// One entry of a `frame-ancestors` source list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AncestorSource {
    /// `'none'`
    None,
    /// `'self'`
    SelfOrigin,
    /// `*`
    Wildcard,
    /// `https:` and friends
    Scheme(String),
    /// `[scheme://]host[:port]`, host may start with `*.`
    Host {
        scheme: Option<String>,
        host: String,
        port: Option<String>,
    },
    /// Anything we could not parse; never matches
    Invalid(String),
}

impl AncestorSource {
    fn parse(token: &str) -> Self {
        let lower = token.to_ascii_lowercase();
        match lower.as_str() {
            "'none'" => return AncestorSource::None,
            "'self'" => return AncestorSource::SelfOrigin,
            "*" => return AncestorSource::Wildcard,
            _ => {}
        }

        if lower.starts_with('\'') {
            return AncestorSource::Invalid(token.to_string());
        }

        if let Some(scheme) = lower.strip_suffix(':') {
            if !scheme.is_empty() && !scheme.contains('/') {
                return AncestorSource::Scheme(scheme.to_string());
            }
        }

        let (scheme, rest) = match lower.split_once("://") {
            Some((s, r)) => (Some(s.to_string()), r),
            None => (None, lower.as_str()),
        };
        let authority = rest.split('/').next().unwrap_or_default();
        let (host, port) = match authority.rsplit_once(':') {
            Some((h, p)) => (h, Some(p.to_string())),
            None => (authority, None),
        };

        if host.is_empty() {
            return AncestorSource::Invalid(token.to_string());
        }

        AncestorSource::Host {
            scheme,
            host: host.to_string(),
            port,
        }
    }

    fn matches(&self, embedder: &Url, target: &Url) -> bool {
        match self {
            AncestorSource::None | AncestorSource::Invalid(_) => false,
            AncestorSource::SelfOrigin => embedder.origin() == target.origin(),
            AncestorSource::Wildcard => matches!(embedder.scheme(), "http" | "https"),
            AncestorSource::Scheme(scheme) => {
                embedder.scheme() == scheme || (scheme == "http" && embedder.scheme() == "https")
            }
            AncestorSource::Host { scheme, host, port } => {
                let scheme_ok = match scheme.as_deref() {
                    Some("http") => matches!(embedder.scheme(), "http" | "https"),
                    Some(s) => embedder.scheme() == s,
                    None => matches!(embedder.scheme(), "http" | "https"),
                };

                let embedder_host = embedder.host_str().unwrap_or_default().to_ascii_lowercase();
                let host_ok = match host.strip_prefix("*.") {
                    Some(suffix) => embedder_host.ends_with(&format!(".{}", suffix)),
                    None => embedder_host == *host,
                };

                let port_ok = match port.as_deref() {
                    Some("*") => true,
                    Some(p) => embedder.port_or_known_default().map(|e| e.to_string())
                        == Some(p.to_string()),
                    None => embedder.port().is_none(),
                };

                scheme_ok && host_ok && port_ok
            }
        }
    }
}

/// A parsed `frame-ancestors` directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameAncestors {
    /// Source list as written
    pub sources: Vec<AncestorSource>,
}

impl FrameAncestors {
    /// Extract the `frame-ancestors` directive of every policy in a CSP
    /// header value. Comma-separated values are separate policies; within a
    /// policy only the first occurrence of the directive counts.
    pub fn from_header(csp: &str) -> Vec<FrameAncestors> {
        csp.split(',').filter_map(Self::parse_policy).collect()
    }

    fn parse_policy(policy: &str) -> Option<FrameAncestors> {
        for directive in policy.split(';') {
            let mut parts = directive.split_whitespace();
            let name = match parts.next() {
                Some(n) => n,
                None => continue,
            };
            if name.eq_ignore_ascii_case("frame-ancestors") {
                return Some(FrameAncestors {
                    sources: parts.map(AncestorSource::parse).collect(),
                });
            }
        }
        None
    }

    /// Whether `embedder` may frame `target` under this directive
    pub fn allows(&self, embedder: &Url, target: &Url) -> bool {
        if self.sources.is_empty() || self.sources.contains(&AncestorSource::None) {
            return false;
        }
        self.sources.iter().any(|s| s.matches(embedder, target))
    }

    /// Whether the source list lets arbitrary sites frame the page
    pub fn is_permissive(&self) -> bool {
        self.sources.iter().any(|s| match s {
            AncestorSource::Wildcard => true,
            AncestorSource::Scheme(scheme) => scheme == "https" || scheme == "http",
            AncestorSource::Host { host, .. } => host == "*",
            _ => false,
        })
    }
}

/// Browser-side decision whether `embedder` may frame a response from
/// `target`. `frame-ancestors` supersedes `X-Frame-Options` when present.
/// Returns the name of the blocking mechanism, if any.
pub fn framing_blocked_by(
    x_frame_options: Option<&str>,
    csp: Option<&str>,
    embedder: &Url,
    target: &Url,
) -> Option<&'static str> {
    let policies = csp.map(FrameAncestors::from_header).unwrap_or_default();
    if !policies.is_empty() {
        return if policies.iter().all(|p| p.allows(embedder, target)) {
            None
        } else {
            Some("frame-ancestors")
        };
    }

    let xfo = x_frame_options?.trim().to_ascii_lowercase();
    match xfo.as_str() {
        "deny" => Some("x-frame-options"),
        "sameorigin" if !same_origin(&embedder.origin(), &target.origin()) => {
            Some("x-frame-options")
        }
        _ => None,
    }
}

fn same_origin(a: &Origin, b: &Origin) -> bool {
    a.is_tuple() && a == b
}
