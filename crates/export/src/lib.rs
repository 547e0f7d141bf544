//! Precis export renderer
//!
//! Serializes a stored summary into a downloadable document:
//! - TXT (UTF-8 text)
//! - PDF (US-Letter, Helvetica)
//! - DOCX (Heading 1 plus body paragraphs)
//!
//! Everything is produced in memory.

mod docx;
mod filename;
mod pdf;
mod txt;

pub use filename::sanitize_filename;

use precis_common::db::models::Content;
use precis_common::errors::AppError;
use thiserror::Error;
use tracing::debug;

/// Heading used when a record has no title
pub const DEFAULT_HEADING: &str = "Summary";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("DOCX generation failed: {0}")]
    Docx(String),
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::ExportFailed { message: e.to_string() }
    }
}

/// Supported download formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Pdf,
    Docx,
}

impl ExportFormat {
    /// Case-insensitive; anything unrecognized renders as text
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pdf" => ExportFormat::Pdf,
            "docx" => ExportFormat::Docx,
            _ => ExportFormat::Txt,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Fields of a record that appear in an export
#[derive(Debug, Clone, Default)]
pub struct ExportSource {
    pub title: String,
    pub summary: String,
    pub keywords: String,
}

impl ExportSource {
    pub(crate) fn heading(&self) -> &str {
        if self.title.is_empty() {
            DEFAULT_HEADING
        } else {
            &self.title
        }
    }

    pub(crate) fn summary_paragraphs(&self) -> Vec<&str> {
        if self.summary.is_empty() {
            Vec::new()
        } else {
            self.summary.split('\n').collect()
        }
    }
}

impl From<&Content> for ExportSource {
    fn from(content: &Content) -> Self {
        Self {
            title: content.auto_title.clone(),
            summary: content.summary.clone(),
            keywords: content.keywords.clone(),
        }
    }
}

/// A rendered download
#[derive(Debug, Clone)]
pub struct RenderedExport {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Render a record in the requested format
pub fn render(source: &ExportSource, format: ExportFormat) -> Result<RenderedExport, ExportError> {
    let bytes = match format {
        ExportFormat::Txt => txt::render_txt(source),
        ExportFormat::Pdf => pdf::render_pdf(source)?,
        ExportFormat::Docx => docx::render_docx(source)?,
    };

    precis_common::metrics::record_export(format.extension());
    debug!(format = format.extension(), size = bytes.len(), "Rendered export");

    Ok(RenderedExport {
        bytes,
        content_type: format.content_type(),
        filename: format!("{}.{}", sanitize_filename(&source.title), format.extension()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> ExportSource {
        ExportSource {
            title: "Quarterly Report: Q3/2024".into(),
            summary: "Line1\nLine2".into(),
            keywords: "a,b".into(),
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("PDF"), ExportFormat::Pdf);
        assert_eq!(ExportFormat::parse("docx"), ExportFormat::Docx);
        assert_eq!(ExportFormat::parse("txt"), ExportFormat::Txt);
        assert_eq!(ExportFormat::parse("odt"), ExportFormat::Txt);
    }

    #[test]
    fn test_render_metadata() {
        let rendered = render(&source(), ExportFormat::Docx).unwrap();
        assert_eq!(rendered.filename, "Quarterly_Report_Q32024.docx");
        assert_eq!(
            rendered.content_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );

        let rendered = render(&source(), ExportFormat::Pdf).unwrap();
        assert_eq!(rendered.filename, "Quarterly_Report_Q32024.pdf");
        assert!(rendered.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_untitled_record() {
        let untitled = ExportSource { summary: "text".into(), ..Default::default() };
        let rendered = render(&untitled, ExportFormat::Txt).unwrap();
        assert_eq!(rendered.filename, ".txt");
        assert!(String::from_utf8(rendered.bytes).unwrap().starts_with("Summary\n"));
    }

    #[test]
    fn test_from_content() {
        let content = Content {
            id: 7,
            user_id: Some(1),
            original_file: None,
            original_text: Some("x".into()),
            summary_length: "medium".into(),
            created_at: chrono::Utc::now().into(),
            extracted_text: "x".into(),
            summary: "s".into(),
            keywords: "k".into(),
            auto_title: "T".into(),
            document_type: String::new(),
            language: "en".into(),
        };
        let source = ExportSource::from(&content);
        assert_eq!(source.title, "T");
        assert_eq!(source.summary, "s");
        assert_eq!(source.keywords, "k");
    }
}
