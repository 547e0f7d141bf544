//! Ingestion error types

use precis_common::errors::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("PDF parse error for {filename}: {message}")]
    Pdf { filename: String, message: String },

    #[error("DOCX parse error for {filename}: {message}")]
    Docx { filename: String, message: String },
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        AppError::ExtractionFailed { message: e.to_string() }
    }
}
