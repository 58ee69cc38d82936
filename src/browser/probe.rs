// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Live frame probe
//!
//! Loads the target into a frame and races the load against a timer. The
//! first of the two to settle decides the outcome. The load itself is left
//! running when the timer wins; when it finishes later its result reaches an
//! [`EmbeddingSlot`] that has already settled (or moved on to a newer
//! generation) and is dropped.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, info};
use url::Url;

use super::frame::{EmbeddedFrame, FrameHost, FrameLoad};

/// Timer budget of a probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Window property read to establish interactivity
pub const ACCESS_CHECK_PROPERTY: &str = "length";

/// What the probe observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// The framed document was committed
    pub rendered: bool,
    /// The embedding side could read a property of the framed window
    pub interactive: bool,
    /// The timer settled before the load
    pub timed_out: bool,
}

impl ProbeOutcome {
    /// Timer fired first
    pub fn timed_out() -> Self {
        Self {
            rendered: false,
            interactive: false,
            timed_out: true,
        }
    }

    /// `error` fired, or the load never started
    pub fn load_failed() -> Self {
        Self::default()
    }

    /// `load` fired: attempt the access check
    pub fn from_frame(frame: &EmbeddedFrame) -> Self {
        let interactive = match frame.read_property(ACCESS_CHECK_PROPERTY) {
            Ok(value) => value.is_defined(),
            Err(e) => {
                debug!("Access check on {} failed: {}", frame.url, e);
                false
            }
        };

        Self {
            rendered: frame.is_rendered(),
            interactive,
            timed_out: false,
        }
    }
}

/// Result of offering an outcome to the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// First settlement of the current generation
    Accepted,
    /// The current generation had already settled
    AlreadySettled,
    /// The generation was superseded by a reset or a newer probe
    Stale,
}

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    settled: Option<ProbeOutcome>,
    discarded: u64,
}

/// The single frame slot a probe renders into, tagged by generation
#[derive(Debug, Default)]
pub struct EmbeddingSlot {
    state: Mutex<SlotState>,
}

impl EmbeddingSlot {
    /// Create an empty slot at generation 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and return its tag
    pub fn begin(&self) -> u64 {
        let mut state = self.state.lock();
        state.generation += 1;
        state.settled = None;
        state.generation
    }

    /// Move the slot to `generation` if it is newer than the current one.
    /// Returns `false`, leaving the slot untouched, when a newer generation
    /// already owns it.
    pub fn begin_at(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        if generation <= state.generation {
            return false;
        }
        state.generation = generation;
        state.settled = None;
        true
    }

    /// Offer an outcome for `generation`. Only the first offer for the
    /// current generation is recorded.
    pub fn settle(&self, generation: u64, outcome: ProbeOutcome) -> Settlement {
        let mut state = self.state.lock();
        if generation != state.generation {
            state.discarded += 1;
            return Settlement::Stale;
        }
        if state.settled.is_some() {
            state.discarded += 1;
            return Settlement::AlreadySettled;
        }
        state.settled = Some(outcome);
        Settlement::Accepted
    }

    /// Recorded outcome of `generation`, if it is current and settled
    pub fn outcome(&self, generation: u64) -> Option<ProbeOutcome> {
        let state = self.state.lock();
        if state.generation == generation {
            state.settled
        } else {
            None
        }
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Number of settlements dropped because they came too late or for a
    /// superseded generation
    pub fn discarded(&self) -> u64 {
        self.state.lock().discarded
    }
}

/// Drives one frame host through timed, generation-tagged probes
pub struct FrameProbe {
    host: Arc<dyn FrameHost>,
    slot: Arc<EmbeddingSlot>,
    timeout: Duration,
}

impl FrameProbe {
    /// Create a probe over `host` with the default timer budget
    pub fn new(host: Arc<dyn FrameHost>) -> Self {
        Self {
            host,
            slot: Arc::new(EmbeddingSlot::new()),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Set the default timer budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default timer budget
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The slot this probe renders into
    pub fn slot(&self) -> &EmbeddingSlot {
        &self.slot
    }

    /// Move the slot to `generation` so no older in-flight probe can be
    /// recorded. Does nothing if the slot is already there or further.
    pub fn reset_to(&self, generation: u64) {
        self.slot.begin_at(generation);
    }

    /// Probe `url` with the default timer budget
    pub async fn run(&self, url: &str) -> ProbeOutcome {
        self.probe(url, self.timeout).await
    }

    /// Probe `url`, racing the load against `timeout`. Never fails.
    pub async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        let generation = self.slot.begin();
        self.race(url, timeout, generation).await
    }

    /// Probe `url` under an externally assigned `generation` with the
    /// default timer budget. Returns `None` without loading anything when a
    /// newer generation already owns the slot.
    pub async fn run_as(&self, url: &str, generation: u64) -> Option<ProbeOutcome> {
        if !self.slot.begin_at(generation) {
            debug!("Probe {} of {} superseded before start", generation, url);
            return None;
        }
        Some(self.race(url, self.timeout, generation).await)
    }

    async fn race(&self, url: &str, timeout: Duration, generation: u64) -> ProbeOutcome {
        let target = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                debug!("Probe {} not started, invalid URL {}: {}", generation, url, e);
                self.slot.settle(generation, ProbeOutcome::load_failed());
                return ProbeOutcome::load_failed();
            }
        };

        let (loaded_tx, loaded_rx) = oneshot::channel();
        let host = Arc::clone(&self.host);
        let slot = Arc::clone(&self.slot);

        tokio::spawn(async move {
            let outcome = match host.load(&target).await {
                FrameLoad::Loaded(frame) => ProbeOutcome::from_frame(&frame),
                FrameLoad::Failed(reason) => {
                    debug!("Frame load of {} failed: {}", target, reason);
                    ProbeOutcome::load_failed()
                }
            };

            match slot.settle(generation, outcome) {
                Settlement::Accepted => {}
                late => debug!("Discarding load of {} for probe {} ({:?})", target, generation, late),
            }
            let _ = loaded_tx.send(());
        });

        // The loader settles for itself; only the timer needs an offer here
        let fallback = tokio::select! {
            _ = loaded_rx => ProbeOutcome::load_failed(),
            _ = tokio::time::sleep(timeout) => {
                self.slot.settle(generation, ProbeOutcome::timed_out());
                ProbeOutcome::timed_out()
            }
        };

        let outcome = self.slot.outcome(generation).unwrap_or(fallback);
        info!(
            "Probe {} of {}: rendered={} interactive={} timed_out={}",
            generation, url, outcome.rendered, outcome.interactive, outcome.timed_out
        );
        outcome
    }
}
