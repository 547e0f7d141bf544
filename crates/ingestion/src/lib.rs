//! Precis ingestion pipeline
//!
//! Turns a submitted document into a stored content record:
//! 1. Extract plain text (PDF, DOCX or plain text)
//! 2. Guess the language from the first characters
//! 3. Ask the generative model for an analysis and a summary
//! 4. Persist the enriched record for its owner

pub mod errors;
pub mod extract;
pub mod language;
pub mod processor;
pub mod summarizer;

pub use errors::ExtractionError;
pub use extract::{extract, DocumentFormat, SourceInput};
pub use language::detect_language;
pub use processor::{ContentProcessor, Submission, SubmittedFile};
pub use summarizer::{parse_analysis, Analysis, Summarizer, SummaryLength, SummaryResult};
