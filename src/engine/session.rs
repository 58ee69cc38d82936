// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Test sessions
//!
//! A [`ClickjackTester`] runs the pipeline fetch, analyze, probe, synthesize
//! for one URL and publishes the result as an immutable [`TestSession`].
//! Each run replaces the previous session wholesale. A run that was
//! superseded by a newer run or a reset is returned to its caller but never
//! published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::verdict::{synthesize, TestVerdict, VerdictMeta};
use crate::browser::{FrameHost, FrameProbe, HttpFrameHost, ProbeOutcome};
use crate::config::TesterConfig;
use crate::error::Result;
use crate::http::{DirectHeaderFetcher, HeaderFetcher, HeaderServiceClient, HttpClient};
use crate::report::{ReportDocument, Reporter};
use crate::security::{analyze, HeaderSet};

/// Result of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSession {
    /// Run number, starting at 1
    pub generation: u64,
    /// URL as entered
    pub target: String,
    pub verdict: TestVerdict,
}

/// Runs clickjacking tests and holds the latest session
pub struct ClickjackTester {
    fetcher: Arc<dyn HeaderFetcher>,
    probe: FrameProbe,
    reporter: Reporter,
    /// Latest run generation handed out
    runs: AtomicU64,
    current: RwLock<Option<Arc<TestSession>>>,
}

impl ClickjackTester {
    /// Create a tester from its collaborators
    pub fn new(fetcher: Arc<dyn HeaderFetcher>, host: Arc<dyn FrameHost>) -> Self {
        Self {
            fetcher,
            probe: FrameProbe::new(host),
            reporter: Reporter::default(),
            runs: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Build the HTTP-backed tester described by `config`
    pub fn from_config(config: &TesterConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http_config())?;

        let fetcher: Arc<dyn HeaderFetcher> = match &config.header_service {
            Some(endpoint) => Arc::new(HeaderServiceClient::new(client.clone(), endpoint)?),
            None => Arc::new(DirectHeaderFetcher::new(client.clone())),
        };
        let host = Arc::new(HttpFrameHost::new(client, config.embedder_origin.clone()));

        Ok(Self::new(fetcher, host)
            .with_probe_timeout(config.probe_timeout)
            .with_reporter(Reporter::new(config.branding.clone())))
    }

    /// Set the probe timer budget
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe = self.probe.with_timeout(timeout);
        self
    }

    /// Set the reporter
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// The live frame probe
    pub fn probe(&self) -> &FrameProbe {
        &self.probe
    }

    /// The reporter
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Test `url`. Never fails: a header fetch failure yields an
    /// indeterminate verdict.
    pub async fn run(&self, url: &str) -> Arc<TestSession> {
        let generation = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Testing {} (run {})", url, generation);

        let meta = VerdictMeta::new(url).tested_at(Utc::now());

        let verdict = match self.fetcher.fetch(url).await {
            Ok(fetched) => {
                let protection = analyze(&fetched.headers);
                debug!(
                    "Fetched {} headers for {} from {}, missing: {:?}",
                    fetched.headers.len(),
                    url,
                    fetched.ip,
                    protection.missing
                );

                // Superseded runs never load; their session is not published
                let outcome = self
                    .probe
                    .run_as(url, generation)
                    .await
                    .unwrap_or_else(ProbeOutcome::load_failed);
                let meta = meta.ip(fetched.ip).raw_headers(fetched.headers.snapshot());
                synthesize(protection, Some(outcome), meta)
            }
            Err(e) => {
                warn!("Header fetch for {} failed: {}", url, e);
                synthesize(
                    analyze(&HeaderSet::new()),
                    None,
                    meta.fetch_error(e.display_message()),
                )
            }
        };

        info!(
            "Verdict for {}: vulnerable={:?} ({})",
            url, verdict.is_vulnerable, verdict.rationale
        );

        let session = Arc::new(TestSession {
            generation,
            target: url.to_string(),
            verdict,
        });

        let mut current = self.current.write();
        if self.runs.load(Ordering::SeqCst) == generation {
            *current = Some(Arc::clone(&session));
        } else {
            debug!("Run {} for {} superseded, not published", generation, url);
        }

        session
    }

    /// Latest published session
    pub fn current(&self) -> Option<Arc<TestSession>> {
        self.current.read().clone()
    }

    /// Clear the session and invalidate any run or probe in flight
    pub fn reset(&self) {
        let mut current = self.current.write();
        let generation = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.reset_to(generation);
        *current = None;
        debug!("Tester reset");
    }

    /// Report for the latest session
    pub fn report(&self) -> Option<ReportDocument> {
        self.current()
            .map(|session| self.reporter.render(&session.verdict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{EmbeddedFrame, FrameLoad, FrameProperty};
    use crate::error::Error;
    use crate::http::FetchedHeaders;
    use async_trait::async_trait;
    use url::Url;

    /// Serves headers after a per-URL delay; `down.test` fails
    struct DelayedFetcher;

    #[async_trait]
    impl HeaderFetcher for DelayedFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedHeaders> {
            if url.contains("down.test") {
                return Err(Error::header_service(None, "Request failed"));
            }
            let delay = if url.contains("slow") { 500 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(FetchedHeaders {
                headers: HeaderSet::new().with("server", "test"),
                ip: "192.0.2.1".to_string(),
            })
        }
    }

    struct OpenHost;

    #[async_trait]
    impl FrameHost for OpenHost {
        async fn load(&self, url: &Url) -> FrameLoad {
            FrameLoad::Loaded(
                EmbeddedFrame::rendered(url.clone(), false)
                    .with_property("length", FrameProperty::Number(0.0)),
            )
        }
    }

    /// Loads an open, interactive frame after a second
    struct SlowOpenHost;

    #[async_trait]
    impl FrameHost for SlowOpenHost {
        async fn load(&self, url: &Url) -> FrameLoad {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            OpenHost.load(url).await
        }
    }

    fn tester() -> ClickjackTester {
        ClickjackTester::new(Arc::new(DelayedFetcher), Arc::new(OpenHost))
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_publishes_session() {
        let tester = tester();
        assert!(tester.current().is_none());

        let session = tester.run("https://open.test/").await;
        assert_eq!(session.generation, 1);
        assert_eq!(session.verdict.is_vulnerable, Some(true));
        assert_eq!(session.verdict.source_ip, "192.0.2.1");
        assert_eq!(tester.current(), Some(session));

        let report = tester.report().unwrap();
        assert_eq!(report.status.lines, vec!["Vulnerability Status: VULNERABLE"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_is_indeterminate() {
        let tester = tester();
        let session = tester.run("https://down.test/").await;

        assert!(session.verdict.is_indeterminate());
        assert!(session.verdict.probe.is_none());
        assert_eq!(session.verdict.fetch_error.as_deref(), Some("Request failed"));
        assert_eq!(session.verdict.source_ip, "-");
        // The probe never started
        assert_eq!(tester.probe().slot().generation(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_run_wins() {
        let tester = tester();

        let (slow, fast) = tokio::join!(
            tester.run("https://slow.test/"),
            tester.run("https://fast.test/")
        );

        assert_eq!(slow.generation, 1);
        assert_eq!(fast.generation, 2);
        assert_eq!(tester.current().unwrap().target, "https://fast.test/");
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_fetch_landing_late_keeps_newer_probe() {
        let tester = ClickjackTester::new(Arc::new(DelayedFetcher), Arc::new(SlowOpenHost));

        // The older run's headers arrive while the newer run is probing
        let (slow, fast) = tokio::join!(
            tester.run("https://slow.test/"),
            tester.run("https://fast.test/")
        );

        assert_eq!(slow.generation, 1);
        assert_eq!(fast.generation, 2);
        assert_eq!(
            fast.verdict.probe,
            Some(ProbeOutcome {
                rendered: true,
                interactive: true,
                timed_out: false
            })
        );
        assert_eq!(fast.verdict.is_vulnerable, Some(true));

        let current = tester.current().unwrap();
        assert_eq!(current.target, "https://fast.test/");
        assert_eq!(current.verdict.is_vulnerable, Some(true));
        assert_eq!(tester.probe().slot().generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_session() {
        let tester = tester();
        tester.run("https://open.test/").await;
        assert!(tester.current().is_some());

        tester.reset();
        assert!(tester.current().is_none());
        assert!(tester.report().is_none());

        let next = tester.run("https://open.test/").await;
        assert_eq!(next.generation, 3);
        assert!(tester.current().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_run_discards_it() {
        let tester = Arc::new(tester());
        let running = {
            let tester = Arc::clone(&tester);
            tokio::spawn(async move { tester.run("https://slow.test/").await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        tester.reset();

        let session = running.await.unwrap();
        assert_eq!(session.generation, 1);
        assert!(tester.current().is_none());
    }
}
