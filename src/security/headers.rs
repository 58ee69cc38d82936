// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Framing-protection header analysis
//!
//! Decides from a response's headers whether the target declares framing
//! protection. Matching is deliberately loose: a header counts as present
//! when its value contains one of the rule's patterns, case-insensitively.
//! `frame-ancestors *` therefore counts as protection even though it allows
//! every embedder. See [`super::FrameAncestors`] for a strict reading.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical name of the legacy framing header
pub const X_FRAME_OPTIONS: &str = "X-Frame-Options";

/// Canonical name of the CSP framing directive
pub const CSP_FRAME_ANCESTORS: &str = "CSP frame-ancestors";

/// Response headers keyed by lower-cased name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderSet(BTreeMap<String, String>);

impl HeaderSet {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header. The name is lower-cased; a repeated name keeps the
    /// last value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a header value by name (any case)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no headers are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate headers in name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Pretty JSON dump (two-space indent, sorted keys) kept for audit
    pub fn snapshot(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Which protection a rule detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protection {
    /// `X-Frame-Options: DENY | SAMEORIGIN`
    FrameDeny,
    /// `Content-Security-Policy: frame-ancestors ...`
    CspFrameAncestors,
}

impl Protection {
    /// Canonical name used in reports
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Protection::FrameDeny => X_FRAME_OPTIONS,
            Protection::CspFrameAncestors => CSP_FRAME_ANCESTORS,
        }
    }
}

/// One row of the matching policy
#[derive(Debug, Clone, Copy)]
pub struct ProtectionRule {
    /// Protection this rule establishes
    pub protection: Protection,
    /// Lower-cased header name the rule reads
    pub header: &'static str,
    /// Lower-cased substrings; any match counts
    pub patterns: &'static [&'static str],
}

impl ProtectionRule {
    /// Whether the header set satisfies this rule
    pub fn matches(&self, headers: &HeaderSet) -> bool {
        headers
            .get(self.header)
            .map(|value| {
                let value = value.to_ascii_lowercase();
                self.patterns.iter().any(|p| value.contains(p))
            })
            .unwrap_or(false)
    }
}

/// Matching policy, in reporting order
pub const PROTECTION_RULES: [ProtectionRule; 2] = [
    ProtectionRule {
        protection: Protection::FrameDeny,
        header: "x-frame-options",
        patterns: &["deny", "sameorigin"],
    },
    ProtectionRule {
        protection: Protection::CspFrameAncestors,
        header: "content-security-policy",
        patterns: &["frame-ancestors"],
    },
];

/// Framing protection found on a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionSignal {
    /// X-Frame-Options is DENY or SAMEORIGIN
    pub has_frame_deny: bool,
    /// CSP carries a frame-ancestors directive
    pub has_csp_frame_ancestors: bool,
    /// Canonical names of absent protections, X-Frame-Options first
    pub missing: Vec<String>,
}

impl ProtectionSignal {
    /// Whether every protection is present
    pub fn is_protected(&self) -> bool {
        self.missing.is_empty()
    }

    /// Whether at least one protection is absent
    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Analyze headers for framing protection. Never fails: absent or
/// malformed values are absent protection.
pub fn analyze(headers: &HeaderSet) -> ProtectionSignal {
    let mut has_frame_deny = false;
    let mut has_csp_frame_ancestors = false;
    let mut missing = Vec::new();

    for rule in &PROTECTION_RULES {
        let present = rule.matches(headers);
        match rule.protection {
            Protection::FrameDeny => has_frame_deny = present,
            Protection::CspFrameAncestors => has_csp_frame_ancestors = present,
        }
        if !present {
            missing.push(rule.protection.canonical_name().to_string());
        }
    }

    ProtectionSignal {
        has_frame_deny,
        has_csp_frame_ancestors,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_deny_any_case() {
        for value in ["DENY", "deny", "Deny", "SAMEORIGIN", "sameOrigin"] {
            let headers = HeaderSet::new().with("x-frame-options", value);
            assert!(analyze(&headers).has_frame_deny, "{}", value);
        }
    }

    #[test]
    fn test_frame_deny_is_substring_match() {
        let headers = HeaderSet::new().with("X-Frame-Options", "  deny, sameorigin ");
        assert!(analyze(&headers).has_frame_deny);

        let headers = HeaderSet::new().with("x-frame-options", "ALLOW-FROM https://a.example");
        assert!(!analyze(&headers).has_frame_deny);
    }

    #[test]
    fn test_csp_frame_ancestors_any_position() {
        let headers = HeaderSet::new().with(
            "content-security-policy",
            "default-src 'self'; FRAME-ANCESTORS 'none'",
        );
        let signal = analyze(&headers);
        assert!(signal.has_csp_frame_ancestors);
        assert_eq!(signal.missing, vec![X_FRAME_OPTIONS.to_string()]);
    }

    // Known limitation: a wildcard source list still counts as protection.
    #[test]
    fn test_wildcard_frame_ancestors_counts_as_present() {
        let headers = HeaderSet::new().with("content-security-policy", "frame-ancestors *");
        assert!(analyze(&headers).has_csp_frame_ancestors);
    }

    #[test]
    fn test_missing_order() {
        let signal = analyze(&HeaderSet::new());
        assert!(!signal.has_frame_deny);
        assert!(!signal.has_csp_frame_ancestors);
        assert_eq!(signal.missing, vec![X_FRAME_OPTIONS, CSP_FRAME_ANCESTORS]);

        let headers = HeaderSet::new().with("x-frame-options", "SAMEORIGIN");
        assert_eq!(analyze(&headers).missing, vec![CSP_FRAME_ANCESTORS]);
    }

    #[test]
    fn test_missing_empty_iff_both_present() {
        let headers = HeaderSet::new()
            .with("x-frame-options", "DENY")
            .with("content-security-policy", "frame-ancestors 'self'");
        let signal = analyze(&headers);
        assert!(signal.is_protected());
        assert!(signal.has_frame_deny && signal.has_csp_frame_ancestors);
    }

    #[test]
    fn test_report_only_csp_is_not_read() {
        let headers =
            HeaderSet::new().with("content-security-policy-report-only", "frame-ancestors 'none'");
        assert!(!analyze(&headers).has_csp_frame_ancestors);
    }

    #[test]
    fn test_rule_table_is_ordered() {
        let names: Vec<_> = PROTECTION_RULES
            .iter()
            .map(|r| r.protection.canonical_name())
            .collect();
        assert_eq!(names, vec![X_FRAME_OPTIONS, CSP_FRAME_ANCESTORS]);
        assert!(PROTECTION_RULES
            .iter()
            .all(|r| r.header == r.header.to_ascii_lowercase()));
    }

    #[test]
    fn test_snapshot_sorted() {
        let headers: HeaderSet = [("Server", "nginx"), ("content-type", "text/html")]
            .into_iter()
            .collect();
        assert_eq!(
            headers.snapshot(),
            "{\n  \"content-type\": \"text/html\",\n  \"server\": \"nginx\"\n}"
        );
        assert_eq!(HeaderSet::new().snapshot(), "{}");
    }
}
