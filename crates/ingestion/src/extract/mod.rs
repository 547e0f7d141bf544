//! Text extraction
//!
//! Picks a strategy from the upload's extension and returns plain text.
//! Unknown extensions fall back to plain text decoding.

mod docx;
mod pdf;
mod text;

use crate::errors::ExtractionError;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Map the lower-cased extension after the last `.` to a format
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" | "doc" => DocumentFormat::Docx,
            _ => DocumentFormat::PlainText,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::PlainText => "text",
        }
    }
}

/// Input to the extractor
#[derive(Debug, Clone)]
pub enum SourceInput {
    /// Uploaded file contents with the client-supplied name
    File { bytes: Vec<u8>, filename: String },
    /// Pasted text, returned unchanged
    Text(String),
}

/// Extract plain text from a submission
#[instrument(skip_all)]
pub fn extract(input: SourceInput) -> Result<String, ExtractionError> {
    let (bytes, filename) = match input {
        SourceInput::Text(text) => return Ok(text),
        SourceInput::File { bytes, filename } => (bytes, filename),
    };

    let format = DocumentFormat::from_filename(&filename);
    let start = Instant::now();

    let result = match format {
        DocumentFormat::Pdf => pdf::extract_text_from_pdf(&bytes, &filename),
        DocumentFormat::Docx => docx::extract_text_from_docx(&bytes, &filename),
        DocumentFormat::PlainText => Ok(text::decode_text(&bytes)),
    };

    let elapsed = start.elapsed().as_secs_f64();
    precis_common::metrics::record_extraction(elapsed, format.as_str(), result.is_ok());

    match &result {
        Ok(text) => debug!(
            format = format.as_str(),
            bytes = bytes.len(),
            chars = text.chars().count(),
            elapsed_ms = elapsed * 1000.0,
            "Text extraction complete"
        ),
        Err(e) => warn!(format = format.as_str(), error = %e, "Text extraction failed"),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(DocumentFormat::from_filename("paper.pdf"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_filename("Paper.PDF"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_filename("memo.docx"), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_filename("old.doc"), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_filename("notes.txt"), DocumentFormat::PlainText);
        assert_eq!(DocumentFormat::from_filename("archive.tar.gz"), DocumentFormat::PlainText);
        assert_eq!(DocumentFormat::from_filename("README"), DocumentFormat::PlainText);
    }

    #[test]
    fn test_text_input_is_unchanged() {
        let text = "  keep\n  my whitespace ";
        assert_eq!(extract(SourceInput::Text(text.to_string())).unwrap(), text);
    }

    #[test]
    fn test_unknown_extension_decodes_as_text() {
        let input = SourceInput::File {
            bytes: "plain words".as_bytes().to_vec(),
            filename: "data.csv".to_string(),
        };
        assert_eq!(extract(input).unwrap(), "plain words");
    }

    #[test]
    fn test_garbage_pdf_fails() {
        let input = SourceInput::File {
            bytes: b"not a pdf at all".to_vec(),
            filename: "broken.pdf".to_string(),
        };
        assert!(matches!(extract(input), Err(ExtractionError::Pdf { .. })));
    }

    #[test]
    fn test_garbage_docx_fails() {
        let input = SourceInput::File {
            bytes: b"PK but not really".to_vec(),
            filename: "broken.docx".to_string(),
        };
        assert!(matches!(extract(input), Err(ExtractionError::Docx { .. })));
    }
}
