// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Report rendering

mod document;
mod poc;
mod sink;

pub use document::{
    format_test_time, missing_headers_text, render, status_text, wrap_text, Align,
    ImageAsset, ImagePlacement, ReportBranding, ReportDocument, ReportFont, Reporter, Rgb,
    TextBlock, DEFAULT_DISCLAIMER, FETCH_FAILED_HEADERS, NO_MISSING_HEADERS, PAGE_HEIGHT_MM,
    PAGE_WIDTH_MM,
};
pub use poc::{escape_html, poc_html};
#[cfg(feature = "pdf")]
pub use sink::PdfReportSink;
pub use sink::{create_report_sink, JsonReportSink, NullReportSink, ReportFormat, ReportSink};
