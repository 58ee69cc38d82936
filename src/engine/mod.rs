// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Verdict synthesis and test orchestration

mod session;
mod verdict;

pub use session::{ClickjackTester, TestSession};
pub use verdict::{synthesize, Rationale, TestVerdict, VerdictMeta};
