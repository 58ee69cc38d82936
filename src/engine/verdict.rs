// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Verdict synthesis

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::browser::ProbeOutcome;
use crate::http::UNKNOWN_IP;
use crate::security::ProtectionSignal;

/// Why the verdict came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rationale {
    /// Missing headers and the probe could reach into the frame
    Embeddable,
    /// Missing headers but the probe could not confirm interactivity.
    /// The wording gives the site the benefit of the doubt even though
    /// headers are in fact missing.
    RenderedWithHeaders,
    /// Both protections present
    RefusedToRender,
    /// Header retrieval failed
    FetchError,
}

impl Rationale {
    /// Human-readable justification
    pub fn message(&self) -> &'static str {
        match self {
            Rationale::Embeddable => "Page is embeddable and missing required security headers.",
            Rationale::RenderedWithHeaders => "Page rendered but has necessary headers.",
            Rationale::RefusedToRender => {
                "Page refused to render in iframe (likely protected by headers or other mechanisms)."
            }
            Rationale::FetchError => "Error fetching headers.",
        }
    }
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Run metadata carried into the verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictMeta {
    /// URL as entered
    pub url: String,
    /// Resolved address or `-`
    pub ip: String,
    /// When the test ran
    pub tested_at: DateTime<Utc>,
    /// Raw header dump for the report
    pub raw_headers: String,
    /// Display message of a failed header fetch
    pub fetch_error: Option<String>,
}

impl VerdictMeta {
    /// Metadata for `url` stamped now, with unknown IP and no headers
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ip: UNKNOWN_IP.to_string(),
            tested_at: Utc::now(),
            raw_headers: String::new(),
            fetch_error: None,
        }
    }

    /// Set the IP address
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Set the test time
    pub fn tested_at(mut self, at: DateTime<Utc>) -> Self {
        self.tested_at = at;
        self
    }

    /// Set the raw header dump
    pub fn raw_headers(mut self, raw: impl Into<String>) -> Self {
        self.raw_headers = raw.into();
        self
    }

    /// Record a fetch failure message
    pub fn fetch_error(mut self, message: impl Into<String>) -> Self {
        self.fetch_error = Some(message.into());
        self
    }
}

/// Outcome of one test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVerdict {
    pub target_url: String,
    pub source_ip: String,
    pub tested_at: DateTime<Utc>,
    pub protection: ProtectionSignal,
    /// `None` when header retrieval failed before probing
    pub probe: Option<ProbeOutcome>,
    /// `None` means indeterminate
    pub is_vulnerable: Option<bool>,
    pub rationale: Rationale,
    pub raw_headers_snapshot: String,
    pub fetch_error: Option<String>,
}

impl TestVerdict {
    /// Whether the verdict is indeterminate
    pub fn is_indeterminate(&self) -> bool {
        self.is_vulnerable.is_none()
    }

    /// Rationale text
    pub fn rationale_message(&self) -> &'static str {
        self.rationale.message()
    }
}

/// Combine the static and dynamic signals into a verdict. Total: every
/// input maps to exactly one rationale.
pub fn synthesize(
    protection: ProtectionSignal,
    probe: Option<ProbeOutcome>,
    meta: VerdictMeta,
) -> TestVerdict {
    let (is_vulnerable, rationale) = match probe {
        None => (None, Rationale::FetchError),
        Some(outcome) => {
            let vulnerable = protection.has_missing() && outcome.interactive;
            let rationale = if vulnerable {
                Rationale::Embeddable
            } else if protection.has_missing() {
                Rationale::RenderedWithHeaders
            } else {
                Rationale::RefusedToRender
            };
            (Some(vulnerable), rationale)
        }
    };

    TestVerdict {
        target_url: meta.url,
        source_ip: meta.ip,
        tested_at: meta.tested_at,
        protection,
        probe,
        is_vulnerable,
        rationale,
        raw_headers_snapshot: meta.raw_headers,
        fetch_error: meta.fetch_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{analyze, HeaderSet};

    fn outcome(interactive: bool) -> ProbeOutcome {
        ProbeOutcome {
            rendered: interactive,
            interactive,
            timed_out: false,
        }
    }

    fn unprotected() -> ProtectionSignal {
        analyze(&HeaderSet::new())
    }

    fn protected() -> ProtectionSignal {
        analyze(
            &HeaderSet::new()
                .with("x-frame-options", "DENY")
                .with("content-security-policy", "frame-ancestors 'none'"),
        )
    }

    #[test]
    fn test_truth_table() {
        let partially = analyze(&HeaderSet::new().with("x-frame-options", "DENY"));

        let cases = [
            (unprotected(), true, Some(true), Rationale::Embeddable),
            (unprotected(), false, Some(false), Rationale::RenderedWithHeaders),
            (partially.clone(), true, Some(true), Rationale::Embeddable),
            (partially, false, Some(false), Rationale::RenderedWithHeaders),
            (protected(), true, Some(false), Rationale::RefusedToRender),
            (protected(), false, Some(false), Rationale::RefusedToRender),
        ];

        for (signal, interactive, expected, rationale) in cases {
            let verdict = synthesize(signal, Some(outcome(interactive)), VerdictMeta::new("u"));
            assert_eq!(verdict.is_vulnerable, expected);
            assert_eq!(verdict.rationale, rationale);
        }
    }

    #[test]
    fn test_missing_probe_is_indeterminate() {
        for signal in [unprotected(), protected()] {
            let verdict = synthesize(signal, None, VerdictMeta::new("u").fetch_error("boom"));
            assert!(verdict.is_indeterminate());
            assert_eq!(verdict.rationale, Rationale::FetchError);
            assert_eq!(verdict.rationale_message(), "Error fetching headers.");
            assert_eq!(verdict.fetch_error.as_deref(), Some("boom"));
        }
    }

    #[test]
    fn test_vulnerable_requires_missing_and_interactive() {
        let verdict = synthesize(unprotected(), Some(outcome(true)), VerdictMeta::new("u"));
        assert_eq!(verdict.is_vulnerable, Some(true));
        assert!(!verdict.protection.missing.is_empty());
        assert!(verdict.probe.map(|p| p.interactive).unwrap_or(false));
    }

    #[test]
    fn test_meta_carried_through() {
        let at = DateTime::parse_from_rfc3339("2026-10-18T11:51:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let meta = VerdictMeta::new("https://bank.test")
            .ip("203.0.113.7")
            .tested_at(at)
            .raw_headers("{}");
        let verdict = synthesize(protected(), Some(outcome(false)), meta);

        assert_eq!(verdict.target_url, "https://bank.test");
        assert_eq!(verdict.source_ip, "203.0.113.7");
        assert_eq!(verdict.tested_at, at);
        assert_eq!(verdict.raw_headers_snapshot, "{}");
        assert_eq!(verdict.fetch_error, None);
    }

    #[test]
    fn test_default_ip_sentinel() {
        assert_eq!(VerdictMeta::new("u").ip, "-");
    }
}
