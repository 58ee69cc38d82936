// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use kehys::browser::ProbeOutcome;
use kehys::report::NO_MISSING_HEADERS;
use kehys::{
    analyze, create_report_sink, poc_html, synthesize, HeaderSet, ImageAsset, ReportBranding,
    ReportDocument, ReportFormat, ReportSink, Reporter, TestVerdict, VerdictMeta,
};

fn stamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn verdict() -> TestVerdict {
    let headers = HeaderSet::new()
        .with("x-frame-options", "DENY")
        .with("content-security-policy", "frame-ancestors 'none'")
        .with("server", "nginx");
    synthesize(
        analyze(&headers),
        Some(ProbeOutcome::timed_out()),
        VerdictMeta::new("https://bank.test/")
            .ip("203.0.113.7")
            .tested_at(stamp("2026-03-02T08:15:30Z"))
            .raw_headers(headers.snapshot()),
    )
}

fn without_stamp(mut doc: ReportDocument) -> Vec<u8> {
    doc.generated_at = stamp("2000-01-01T00:00:00Z");
    serde_json::to_vec(&doc).unwrap()
}

#[test]
fn test_same_verdict_same_document() {
    let reporter = Reporter::default();
    let v = verdict();

    let first = reporter.render(&v);
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = reporter.render(&v);

    assert_eq!(without_stamp(first), without_stamp(second));
}

#[test]
fn test_protected_verdict_layout() {
    let doc = Reporter::default().render_at(&verdict(), stamp("2027-01-01T00:00:00Z"));

    assert_eq!(doc.time.text(), "Test Time: Mon, 02 Mar 2026 08:15:30 GMT");
    assert_eq!(doc.missing_headers.text(), format!("Missing Headers: {}", NO_MISSING_HEADERS));
    assert_eq!(doc.status.text(), "Vulnerability Status: Not Vulnerable");
    // Copyright year follows generation, not the test
    assert!(doc.disclaimer.lines.join(" ").contains("© 2027"));
    assert!(doc.raw_headers.text().contains("\"x-frame-options\": \"DENY\""));
}

#[test]
fn test_branding() {
    let mut branding = ReportBranding::for_company("Quasar CyberTech");
    branding.watermark = Some(ImageAsset::new("mark.png", Bytes::from_static(b"\x89PNG")));

    let doc = Reporter::new(branding).render(&verdict());
    assert_eq!(doc.title.text(), "Quasar CyberTech - Clickjacking Report");
    assert!(doc.disclaimer.lines.join(" ").contains("proprietary property of Quasar CyberTech"));
    assert_eq!(doc.watermark.asset.as_ref().map(|a| a.name.as_str()), Some("mark.png"));
}

#[test]
fn test_json_report_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(ReportFormat::Json.default_file_name());

    let doc = Reporter::default().render(&verdict());
    create_report_sink(ReportFormat::Json).save(&doc, &path).unwrap();

    let saved: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(saved["vulnerable"], serde_json::json!(false));
    assert_eq!(saved["site"]["lines"][0], "Site Tested: https://bank.test/");
}

#[cfg(not(feature = "pdf"))]
#[test]
fn test_pdf_needs_feature() {
    let doc = Reporter::default().render(&verdict());
    assert!(create_report_sink(ReportFormat::Pdf).write(&doc).is_err());
}

#[cfg(feature = "pdf")]
#[test]
fn test_pdf_report_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(ReportFormat::Pdf.default_file_name());

    let doc = Reporter::default().render(&verdict());
    create_report_sink(ReportFormat::Pdf).save(&doc, &path).unwrap();
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_poc_page() {
    let html = poc_html("https://bank.test/");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("src=\"https://bank.test/\""));
}
