// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for Kehys
//!
//! A reqwest-backed client plus the header-fetch collaborators the engine
//! consumes.

mod client;
mod fetcher;
mod response;

pub use client::{HttpClient, HttpClientConfig};
pub use fetcher::{
    resolve_ip, DirectHeaderFetcher, FetchedHeaders, HeaderFetcher, HeaderServiceClient,
    UNKNOWN_IP,
};
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Request headers a browser sends when loading a document into an iframe
pub mod frame_request_headers {
    pub const SEC_FETCH_DEST: (&str, &str) = ("sec-fetch-dest", "iframe");
    pub const SEC_FETCH_MODE: (&str, &str) = ("sec-fetch-mode", "navigate");
    pub const SEC_FETCH_SITE: (&str, &str) = ("sec-fetch-site", "cross-site");

    /// All of the above
    pub const ALL: [(&str, &str); 3] = [SEC_FETCH_DEST, SEC_FETCH_MODE, SEC_FETCH_SITE];
}
