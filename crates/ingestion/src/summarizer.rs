//! Summarization client
//!
//! Provides:
//! - Summary length parsing and target word counts
//! - Analysis prompt (keywords, title, document type, language)
//! - Summary prompt with an explicit word budget
//! - Pure parsing of the analysis response
//!
//! Model failures never escape: they become a degraded result carrying the
//! error message, so the record is still stored.

use crate::language::detect_language;
use precis_common::TextGenerator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Only this many characters of the source are sent to the model
pub const PROMPT_CHAR_LIMIT: usize = 15_000;

/// Title used when the analysis does not provide one
pub const DEFAULT_TITLE: &str = "Content Summary";

const EMPTY_SUMMARY: &str = "No text content found to summarize";
const EMPTY_TITLE: &str = "Empty Document";

const ANALYSIS_INSTRUCTION: &str =
    "You are a precise document analyst. Follow the requested output format exactly.";
const SUMMARY_INSTRUCTION: &str =
    "You are an expert summarizer. Respond with the summary text only.";

/// Requested summary length as submitted by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
    /// Percentage of the source word count
    Percent(i64),
    /// Unrecognized value, kept verbatim and treated like medium
    Other(String),
}

impl SummaryLength {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "short" => SummaryLength::Short,
            "medium" => SummaryLength::Medium,
            "long" => SummaryLength::Long,
            _ => match trimmed.parse::<i64>() {
                Ok(p) => SummaryLength::Percent(p),
                Err(_) => SummaryLength::Other(value.to_string()),
            },
        }
    }

    /// Target word count for a source with `source_words` words
    pub fn target_words(&self, source_words: usize) -> usize {
        match self {
            SummaryLength::Short => (source_words * 10 / 100).max(20),
            SummaryLength::Medium | SummaryLength::Other(_) => source_words * 25 / 100,
            SummaryLength::Long => source_words * 50 / 100,
            SummaryLength::Percent(p) => {
                let pct = (*p).clamp(5, 90) as usize;
                source_words * pct / 100
            }
        }
    }
}

/// Source and target word counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCounts {
    pub source: usize,
    pub target: usize,
}

/// Everything the model produced for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub keywords: String,
    pub title: String,
    pub document_type: String,
    pub language: String,
    pub word_counts: WordCounts,
    /// Set when the model call failed and the result is degraded
    pub error: Option<String>,
}

/// Fields read from the analysis response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub keywords: Option<String>,
    pub title: Option<String>,
    pub document_type: Option<String>,
    pub language: Option<String>,
}

/// Parse a `KEYWORDS:` / `TITLE:` / `TYPE:` / `LANGUAGE:` response
///
/// Prefixes must start the line. Unmatched lines are ignored and later lines
/// override earlier ones.
pub fn parse_analysis(response: &str) -> Analysis {
    let mut analysis = Analysis::default();

    for line in response.lines() {
        if let Some(rest) = line.strip_prefix("KEYWORDS:") {
            analysis.keywords = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("TITLE:") {
            analysis.title = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("TYPE:") {
            analysis.document_type = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("LANGUAGE:") {
            analysis.language = Some(rest.trim().to_string());
        }
    }

    analysis
}

/// Summarization client over an injected text generator
#[derive(Clone)]
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Produce summary, keywords, title, type and language for a text
    #[instrument(skip(self, text), fields(model = %self.generator.model_name()))]
    pub async fn summarize(&self, text: &str, length: &SummaryLength) -> SummaryResult {
        let start = Instant::now();
        let language = detect_language(text);
        let source_words = text.split_whitespace().count();
        let word_counts = WordCounts {
            source: source_words,
            target: length.target_words(source_words),
        };

        if text.trim().is_empty() {
            precis_common::metrics::record_summary(start.elapsed().as_secs_f64(), "empty");
            return SummaryResult {
                summary: EMPTY_SUMMARY.to_string(),
                keywords: String::new(),
                title: EMPTY_TITLE.to_string(),
                document_type: String::new(),
                language: language.to_string(),
                word_counts,
                error: None,
            };
        }

        let excerpt: String = text.chars().take(PROMPT_CHAR_LIMIT).collect();

        let result = match self.run_prompts(&excerpt, language, word_counts.target).await {
            Ok((analysis, summary)) => {
                let language = analysis
                    .language
                    .map(|l| l.to_lowercase())
                    .filter(|l| l.chars().count() == 2)
                    .unwrap_or_else(|| language.to_string());

                SummaryResult {
                    summary: summary.trim().to_string(),
                    keywords: analysis.keywords.unwrap_or_default(),
                    title: analysis.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                    document_type: analysis.document_type.unwrap_or_default(),
                    language,
                    word_counts,
                    error: None,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Summarization failed, storing degraded result");
                SummaryResult {
                    summary: format!("Error generating content: {}", message),
                    keywords: String::new(),
                    title: DEFAULT_TITLE.to_string(),
                    document_type: String::new(),
                    language: language.to_string(),
                    word_counts,
                    error: Some(message),
                }
            }
        };

        let outcome = if result.error.is_some() { "degraded" } else { "success" };
        let elapsed = start.elapsed().as_secs_f64();
        precis_common::metrics::record_summary(elapsed, outcome);

        info!(
            source_words = word_counts.source,
            target_words = word_counts.target,
            language = %result.language,
            outcome,
            elapsed_ms = elapsed * 1000.0,
            "Summarization complete"
        );

        result
    }

    async fn run_prompts(
        &self,
        excerpt: &str,
        language: &str,
        target_words: usize,
    ) -> precis_common::Result<(Analysis, String)> {
        let analysis_response = self
            .generator
            .generate(&analysis_prompt(excerpt), Some(ANALYSIS_INSTRUCTION))
            .await?;
        let analysis = parse_analysis(&analysis_response);

        let summary = self
            .generator
            .generate(&summary_prompt(excerpt, language, target_words), Some(SUMMARY_INSTRUCTION))
            .await?;

        Ok((analysis, summary))
    }
}

fn analysis_prompt(excerpt: &str) -> String {
    format!(
        "Analyze this text and:\n\
         1. Identify the 5-10 most important keywords (comma-separated)\n\
         2. Create a concise 3-7 word title\n\
         3. Classify the document type (for example: article, report, letter, contract, manual, notes)\n\
         4. Identify the language as a two-letter ISO 639-1 code\n\
         \n\
         Return in this format:\n\
         KEYWORDS: [comma, separated, keywords]\n\
         TITLE: [title text here]\n\
         TYPE: [document type]\n\
         LANGUAGE: [two-letter code]\n\
         \n\
         Text: {}",
        excerpt
    )
}

fn summary_prompt(excerpt: &str, language: &str, target_words: usize) -> String {
    format!(
        "Write a comprehensive summary of the following text in exactly {} words.\n\
         Focus on the main ideas and key points.\n\
         Write the summary in the same language as the text (detected language code: {}).\n\
         \n\
         Text: {}",
        target_words, language, excerpt
    )
}
