// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Kehys - Clickjacking Exposure Tester
//!
//! Decides whether a web page can be framed by a hostile origin and
//! interacted with, and writes the result up as a branded report.
//!
//! A test combines two signals:
//!
//! - Header analysis: `X-Frame-Options` and CSP `frame-ancestors`
//! - A live frame probe that embeds the target from a foreign origin and
//!   checks whether the embedding side can reach into the framed window,
//!   raced against a 3 second timer
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use kehys::{ClickjackTester, JsonReportSink, ReportSink, TesterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tester = ClickjackTester::from_config(&TesterConfig::from_env()?)?;
//!     let session = tester.run("https://example.com").await;
//!
//!     println!("Vulnerable: {:?}", session.verdict.is_vulnerable);
//!     println!("{}", session.verdict.rationale);
//!
//!     if let Some(report) = tester.report() {
//!         JsonReportSink.save(&report, Path::new("clickjacking_report.json"))?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod report;
pub mod security;

// Re-exports for convenience

// Orchestration
pub use engine::{ClickjackTester, TestSession};

// Verdicts
pub use engine::{synthesize, Rationale, TestVerdict, VerdictMeta};

// Probe
pub use browser::{EmbeddedFrame, FrameHost, FrameLoad, FrameProbe, HttpFrameHost, ProbeOutcome};

// Config
pub use config::TesterConfig;

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{
    DirectHeaderFetcher, FetchedHeaders, HeaderFetcher, HeaderServiceClient, HttpClient,
    HttpClientConfig, Response,
};

// Reports
pub use report::{
    create_report_sink, poc_html, render, ImageAsset, JsonReportSink, ReportBranding,
    ReportDocument, ReportFormat, ReportSink, Reporter,
};

// Security
pub use security::{analyze, HeaderSet, ProtectionSignal, PROTECTION_RULES};

/// Kehys version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
