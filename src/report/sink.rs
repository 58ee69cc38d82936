// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Report output
//!
//! JSON is always available. PDF output is feature-gated on printpdf.

use std::path::Path;

use crate::error::{Error, Result};

use super::document::ReportDocument;

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// PDF report (requires feature)
    Pdf,
    /// JSON data export
    Json,
}

impl ReportFormat {
    /// File extension
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Json => "json",
        }
    }

    /// File name used when no path is given
    pub fn default_file_name(&self) -> String {
        format!("clickjacking_report.{}", self.extension())
    }
}

/// Serializes report documents
pub trait ReportSink: Send + Sync {
    /// Output format
    fn format(&self) -> ReportFormat;

    /// Serialize a document
    fn write(&self, document: &ReportDocument) -> Result<Vec<u8>>;

    /// Serialize a document to a file
    fn save(&self, document: &ReportDocument, path: &Path) -> Result<()> {
        let data = self.write(document)?;
        std::fs::write(path, data)?;
        tracing::info!(path = %path.display(), "Report saved");
        Ok(())
    }
}

/// Pretty-printed JSON of the whole layout
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportSink;

impl ReportSink for JsonReportSink {
    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }

    fn write(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(document)?)
    }
}

/// Single-page PDF drawn with printpdf built-in fonts
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReportSink;

#[cfg(feature = "pdf")]
impl PdfReportSink {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "pdf")]
impl ReportSink for PdfReportSink {
    fn format(&self) -> ReportFormat {
        ReportFormat::Pdf
    }

    fn write(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        use printpdf::path::PaintMode;
        use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rect};

        use super::document::{Align, ReportFont, Rgb};

        fn color(c: Rgb) -> Color {
            Color::Rgb(printpdf::Rgb::new(
                c.r as f32 / 255.0,
                c.g as f32 / 255.0,
                c.b as f32 / 255.0,
                None,
            ))
        }

        let width = document.page_width_mm as f32;
        let height = document.page_height_mm as f32;

        let (pdf_doc, page1, layer1) =
            PdfDocument::new(document.title_text(), Mm(width), Mm(height), "Report");
        let layer = pdf_doc.get_page(page1).get_layer(layer1);

        let font_error =
            |e: printpdf::Error| Error::ReportGeneration(format!("Font error: {:?}", e));
        let helvetica_bold = pdf_doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(font_error)?;
        let courier = pdf_doc
            .add_builtin_font(BuiltinFont::Courier)
            .map_err(font_error)?;
        let times = pdf_doc
            .add_builtin_font(BuiltinFont::TimesRoman)
            .map_err(font_error)?;

        layer.set_fill_color(color(document.background));
        layer.add_rect(
            Rect::new(Mm(0.0), Mm(0.0), Mm(width), Mm(height)).with_mode(PaintMode::Fill),
        );

        // Layout y runs down from the top, PDF y runs up from the bottom
        for block in document.blocks() {
            let font = match block.font {
                ReportFont::HelveticaBold => &helvetica_bold,
                ReportFont::Courier => &courier,
                ReportFont::Times => &times,
            };
            // Opacity is flattened against the page background
            layer.set_fill_color(color(
                document.text_color.over(document.background, block.opacity),
            ));

            for (i, line) in block.lines.iter().enumerate() {
                let x = match block.align {
                    Align::Left => block.x,
                    Align::Right => block.x - block.line_width_mm(line),
                };
                let y = block.y + i as f64 * block.line_height_mm;
                layer.use_text(
                    line.as_str(),
                    block.size_pt as f32,
                    Mm(x as f32),
                    Mm(height - y as f32),
                    font,
                );
            }
        }

        // Raster decoding is not linked in; the watermark region is framed
        // and labelled with the asset name.
        let mark = &document.watermark;
        if let Some(asset) = &mark.asset {
            let top = height - mark.y as f32;
            layer.set_outline_color(color(document.text_color));
            layer.set_outline_thickness(0.5);
            layer.add_rect(
                Rect::new(
                    Mm(mark.x as f32),
                    Mm(top - mark.height as f32),
                    Mm((mark.x + mark.width) as f32),
                    Mm(top),
                )
                .with_mode(PaintMode::Stroke),
            );
            layer.set_fill_color(color(document.text_color));
            layer.use_text(
                asset.name.as_str(),
                6.0,
                Mm(mark.x as f32 + 2.0),
                Mm(top - mark.height as f32 / 2.0),
                &times,
            );
        }

        let mut buffer = Vec::new();
        pdf_doc
            .save(&mut std::io::BufWriter::new(&mut buffer))
            .map_err(|e| Error::ReportGeneration(format!("PDF save error: {:?}", e)))?;

        Ok(buffer)
    }
}

/// Sink used when PDF output is compiled out
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReportSink;

impl ReportSink for NullReportSink {
    fn format(&self) -> ReportFormat {
        ReportFormat::Pdf
    }

    fn write(&self, _document: &ReportDocument) -> Result<Vec<u8>> {
        Err(Error::Config(
            "PDF generation is disabled. Enable the 'pdf' feature.".into(),
        ))
    }
}

/// Create a sink for a format based on enabled features
pub fn create_report_sink(format: ReportFormat) -> Box<dyn ReportSink> {
    match format {
        ReportFormat::Json => Box::new(JsonReportSink),
        ReportFormat::Pdf => create_pdf_sink(),
    }
}

fn create_pdf_sink() -> Box<dyn ReportSink> {
    #[cfg(feature = "pdf")]
    {
        Box::new(PdfReportSink::new())
    }

    #[cfg(not(feature = "pdf"))]
    {
        Box::new(NullReportSink)
    }
}
