// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Report document model
//!
//! A [`ReportDocument`] is a fully laid-out A4 page: every verdict field has
//! a fixed block with a position in millimetres from the top-left corner, a
//! font and pre-wrapped lines. Sinks only draw what is here.

use bytes::Bytes;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::TestVerdict;

/// A4 width in millimetres
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// A4 height in millimetres
pub const PAGE_HEIGHT_MM: f64 = 297.0;
/// Left margin of all body text
pub const LEFT_MM: f64 = 15.0;
/// Width text is wrapped to
pub const WRAP_WIDTH_MM: f64 = 180.0;

const PT_TO_MM: f64 = 25.4 / 72.0;
const LINE_HEIGHT_FACTOR: f64 = 1.15;

/// Shown instead of header names when none are missing
pub const NO_MISSING_HEADERS: &str = "None - Site is protected";
/// Shown instead of header names when retrieval failed
pub const FETCH_FAILED_HEADERS: &str = "Error fetching headers";

/// Default disclaimer; `{company}` and `{year}` are substituted
pub const DEFAULT_DISCLAIMER: &str = "This report and the information contained herein are the \
proprietary property of {company} and are intended solely for the internal use of the designated \
client. This document may contain confidential or sensitive information and is shared with the \
client for review and informational purposes only. It may not be reproduced, distributed, or \
disclosed to any third party, in whole or in part, without the prior written consent of \
{company}. All rights reserved © {year}.";

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend towards `other` by `alpha` (1.0 keeps self)
    pub fn over(&self, other: Rgb, alpha: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 * alpha + b as f64 * (1.0 - alpha)).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Binary image carried into the report, base64 in JSON form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// File name or label
    pub name: String,
    /// Raw image bytes
    #[serde(with = "base64_bytes")]
    pub data: Bytes,
}

impl ImageAsset {
    pub fn new(name: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(d)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

/// Who the report is issued by and how it looks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportBranding {
    pub company_name: String,
    /// Overrides "<company> - Clickjacking Report"
    pub report_title: Option<String>,
    pub confidential_label: String,
    pub disclaimer_template: String,
    pub background: Rgb,
    pub text_color: Rgb,
    pub watermark: Option<ImageAsset>,
}

impl Default for ReportBranding {
    fn default() -> Self {
        Self {
            company_name: "Bountyy Oy".to_string(),
            report_title: None,
            confidential_label: "Confidential".to_string(),
            disclaimer_template: DEFAULT_DISCLAIMER.to_string(),
            background: Rgb::new(0x4d, 0x0c, 0x26),
            text_color: Rgb::new(0xf3, 0xcd, 0xa2),
            watermark: None,
        }
    }
}

impl ReportBranding {
    /// Branding for another company
    pub fn for_company(name: impl Into<String>) -> Self {
        Self {
            company_name: name.into(),
            ..Default::default()
        }
    }

    /// Page title
    pub fn title(&self) -> String {
        self.report_title
            .clone()
            .unwrap_or_else(|| format!("{} - Clickjacking Report", self.company_name))
    }

    /// Disclaimer for a given year
    pub fn disclaimer(&self, year: i32) -> String {
        self.disclaimer_template
            .replace("{company}", &self.company_name)
            .replace("{year}", &year.to_string())
    }
}

/// Built-in fonts the layout uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFont {
    HelveticaBold,
    Courier,
    Times,
}

impl ReportFont {
    /// Average glyph advance as a fraction of the font size
    fn char_width_em(&self) -> f64 {
        match self {
            ReportFont::HelveticaBold => 0.58,
            ReportFont::Courier => 0.6,
            ReportFont::Times => 0.45,
        }
    }
}

/// Horizontal anchor of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Right,
}

/// A positioned run of lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Anchor x in mm
    pub x: f64,
    /// Baseline of the first line, mm from the top
    pub y: f64,
    pub font: ReportFont,
    /// Size in points
    pub size_pt: f64,
    pub align: Align,
    /// 1.0 is opaque
    pub opacity: f64,
    pub line_height_mm: f64,
    /// May be empty; an empty block is an empty region
    pub lines: Vec<String>,
}

impl TextBlock {
    fn new(x: f64, y: f64, font: ReportFont, size_pt: f64) -> Self {
        Self {
            x,
            y,
            font,
            size_pt,
            align: Align::Left,
            opacity: 1.0,
            line_height_mm: size_pt * LINE_HEIGHT_FACTOR * PT_TO_MM,
            lines: Vec::new(),
        }
    }

    fn line(mut self, text: impl Into<String>) -> Self {
        self.lines = vec![text.into()];
        self
    }

    fn wrapped(mut self, text: &str, width_mm: f64) -> Self {
        self.lines = wrap_text(text, width_mm, self.size_pt, self.font);
        self
    }

    fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    fn line_height(mut self, mm: f64) -> Self {
        self.line_height_mm = mm;
        self
    }

    /// Text of all lines joined with newlines
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Estimated width of a line in mm
    pub fn line_width_mm(&self, line: &str) -> f64 {
        line.chars().count() as f64 * self.size_pt * self.font.char_width_em() * PT_TO_MM
    }
}

/// Where the watermark goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// `None` leaves the region empty
    pub asset: Option<ImageAsset>,
}

/// Laid-out report for one verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub background: Rgb,
    pub text_color: Rgb,
    pub confidential: TextBlock,
    pub title: TextBlock,
    pub site: TextBlock,
    pub ip: TextBlock,
    pub time: TextBlock,
    pub missing_headers: TextBlock,
    pub status: TextBlock,
    /// `None` is indeterminate
    pub vulnerable: Option<bool>,
    pub rationale_label: TextBlock,
    pub rationale: TextBlock,
    pub raw_headers_label: TextBlock,
    pub raw_headers: TextBlock,
    pub watermark: ImagePlacement,
    pub disclaimer: TextBlock,
    /// Excluded when comparing two renderings of the same verdict
    pub generated_at: DateTime<Utc>,
}

impl ReportDocument {
    /// Text blocks in drawing order
    pub fn blocks(&self) -> [&TextBlock; 12] {
        [
            &self.confidential,
            &self.title,
            &self.site,
            &self.ip,
            &self.time,
            &self.missing_headers,
            &self.status,
            &self.rationale_label,
            &self.rationale,
            &self.raw_headers_label,
            &self.raw_headers,
            &self.disclaimer,
        ]
    }

    /// Document title
    pub fn title_text(&self) -> String {
        self.title.text()
    }
}

/// Turns verdicts into report documents
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    branding: ReportBranding,
}

impl Reporter {
    /// Create a reporter with the given branding
    pub fn new(branding: ReportBranding) -> Self {
        Self { branding }
    }

    /// Branding in use
    pub fn branding(&self) -> &ReportBranding {
        &self.branding
    }

    /// Render a verdict, stamped now
    pub fn render(&self, verdict: &TestVerdict) -> ReportDocument {
        self.render_at(verdict, Utc::now())
    }

    /// Render a verdict with an explicit generation time. Each call builds a
    /// fresh document.
    pub fn render_at(&self, verdict: &TestVerdict, generated_at: DateTime<Utc>) -> ReportDocument {
        let b = &self.branding;

        let confidential = TextBlock::new(PAGE_WIDTH_MM - LEFT_MM, 10.0, ReportFont::HelveticaBold, 10.0)
            .align(Align::Right)
            .line(&b.confidential_label);
        let title = TextBlock::new(LEFT_MM, 20.0, ReportFont::HelveticaBold, 22.0).line(b.title());

        let field = |y: f64, text: String| {
            TextBlock::new(LEFT_MM, y, ReportFont::HelveticaBold, 12.0).line(text)
        };

        let site = field(35.0, format!("Site Tested: {}", verdict.target_url));
        let ip = field(45.0, format!("IP Address: {}", verdict.source_ip));
        let time = field(55.0, format!("Test Time: {}", format_test_time(&verdict.tested_at)));
        let missing_headers = field(65.0, format!("Missing Headers: {}", missing_headers_text(verdict)));
        let status = field(75.0, format!("Vulnerability Status: {}", status_text(verdict.is_vulnerable)));
        let rationale_label = field(85.0, "Reason:".to_string());

        let rationale = TextBlock::new(LEFT_MM, 93.0, ReportFont::Courier, 12.0)
            .wrapped(verdict.rationale_message(), WRAP_WIDTH_MM);

        let raw_y = 100.0 + rationale.lines.len() as f64 * 6.0;
        let raw_headers_label = TextBlock::new(LEFT_MM, raw_y, ReportFont::Courier, 12.0).line("Raw Headers:");
        let raw_headers = TextBlock::new(LEFT_MM, raw_y + 8.0, ReportFont::Courier, 12.0)
            .wrapped(&verdict.raw_headers_snapshot, WRAP_WIDTH_MM);

        let watermark = ImagePlacement {
            x: (PAGE_WIDTH_MM - 30.0) / 2.0,
            y: 250.0,
            width: 30.0,
            height: 30.0,
            asset: b.watermark.clone(),
        };

        let mut disclaimer = TextBlock::new(LEFT_MM, 0.0, ReportFont::Times, 8.0)
            .opacity(0.5)
            .line_height(4.0)
            .wrapped(&b.disclaimer(generated_at.year()), WRAP_WIDTH_MM);
        disclaimer.y = PAGE_HEIGHT_MM - 2.0 - disclaimer.lines.len() as f64 * 4.0;

        ReportDocument {
            page_width_mm: PAGE_WIDTH_MM,
            page_height_mm: PAGE_HEIGHT_MM,
            background: b.background,
            text_color: b.text_color,
            confidential,
            title,
            site,
            ip,
            time,
            missing_headers,
            status,
            vulnerable: verdict.is_vulnerable,
            rationale_label,
            rationale,
            raw_headers_label,
            raw_headers,
            watermark,
            disclaimer,
            generated_at,
        }
    }
}

/// Render with default branding
pub fn render(verdict: &TestVerdict) -> ReportDocument {
    Reporter::default().render(verdict)
}

/// RFC 1123 time, as browsers print `Date.toUTCString()`
pub fn format_test_time(at: &DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Missing-headers line for a verdict
pub fn missing_headers_text(verdict: &TestVerdict) -> String {
    if verdict.is_indeterminate() {
        FETCH_FAILED_HEADERS.to_string()
    } else if verdict.protection.missing.is_empty() {
        NO_MISSING_HEADERS.to_string()
    } else {
        verdict.protection.missing.join(", ")
    }
}

/// Status word for a verdict
pub fn status_text(is_vulnerable: Option<bool>) -> &'static str {
    match is_vulnerable {
        Some(true) => "VULNERABLE",
        Some(false) => "Not Vulnerable",
        None => "Indeterminate",
    }
}

/// Word-wrap `text` to `width_mm` for a font. Explicit newlines are kept
/// and words longer than a line are split.
pub fn wrap_text(text: &str, width_mm: f64, size_pt: f64, font: ReportFont) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let max_chars = ((width_mm / (size_pt * font.char_width_em() * PT_TO_MM)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let indent: String = paragraph.chars().take_while(|c| *c == ' ').collect();
        let mut current = indent.clone();

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let used = current.chars().count();
                let sep = usize::from(used > indent.len());
                if used + sep + word.len() <= max_chars {
                    if sep == 1 {
                        current.push(' ');
                    }
                    current.extend(word.iter());
                    break;
                }
                if used > indent.len() {
                    lines.push(std::mem::replace(&mut current, indent.clone()));
                    continue;
                }
                let room = max_chars.saturating_sub(used).max(1);
                let rest = word.split_off(room.min(word.len()));
                current.extend(word.iter());
                lines.push(std::mem::replace(&mut current, indent.clone()));
                word = rest;
                if word.is_empty() {
                    break;
                }
            }
        }

        lines.push(current);
    }

    lines
}
