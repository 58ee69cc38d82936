// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Frame embedding and live probing

mod frame;
mod probe;

pub use frame::{
    AccessError, EmbeddedFrame, FrameHost, FrameLoad, FrameProperty, HttpFrameHost,
    CROSS_ORIGIN_PROPERTIES,
};
pub use probe::{
    EmbeddingSlot, FrameProbe, ProbeOutcome, Settlement, ACCESS_CHECK_PROPERTY,
    DEFAULT_PROBE_TIMEOUT,
};
