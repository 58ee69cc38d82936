// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Security analysis modules
//!
//! - Framing-protection header analysis (rule table)
//! - Strict CSP `frame-ancestors` matching used by the frame host

mod csp;
mod headers;

pub use csp::{framing_blocked_by, AncestorSource, FrameAncestors};
pub use headers::{
    analyze, HeaderSet, Protection, ProtectionRule, ProtectionSignal, CSP_FRAME_ANCESTORS,
    PROTECTION_RULES, X_FRAME_OPTIONS,
};
