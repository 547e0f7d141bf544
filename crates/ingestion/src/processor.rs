//! Content processor
//!
//! Core logic for creating a content record: input validation, text
//! extraction, upload storage, summarization and persistence. Extraction runs
//! before anything is written, so a failed extraction leaves no record and no
//! stored file behind.

use crate::extract::{extract, SourceInput};
use crate::summarizer::{Summarizer, SummaryLength};
use precis_common::db::models::{Content, DEFAULT_SUMMARY_LENGTH};
use precis_common::db::{NewContent, Repository};
use precis_common::errors::{AppError, Result};
use precis_common::storage::LocalFileStore;
use tracing::{info, instrument};

/// Maximum stored length of `summary_length`
pub const SUMMARY_LENGTH_MAX_CHARS: usize = 10;

/// An uploaded document
#[derive(Debug, Clone)]
pub struct SubmittedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A creation request after transport decoding
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub user_id: i32,
    pub file: Option<SubmittedFile>,
    pub text: Option<String>,
    pub summary_length: Option<String>,
}

enum Source {
    File(SubmittedFile),
    Text(String),
}

impl Submission {
    /// Enforce that exactly one of file or text is present
    fn into_source(self) -> Result<(Source, String)> {
        let summary_length = self
            .summary_length
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUMMARY_LENGTH.to_string());

        if summary_length.chars().count() > SUMMARY_LENGTH_MAX_CHARS {
            return Err(AppError::Validation {
                message: format!(
                    "Ensure summary_length has no more than {} characters.",
                    SUMMARY_LENGTH_MAX_CHARS
                ),
                field: Some("summary_length".to_string()),
            });
        }

        let file = self.file.filter(|f| !f.bytes.is_empty());
        let text = self.text.filter(|t| !t.trim().is_empty());

        let source = match (file, text) {
            (Some(file), None) => Source::File(file),
            (None, Some(text)) => Source::Text(text),
            (None, None) => {
                return Err(AppError::validation("Either file or text must be provided."))
            }
            (Some(_), Some(_)) => {
                return Err(AppError::validation("Provide either a file or text, not both."))
            }
        };

        Ok((source, summary_length))
    }
}

/// Creation pipeline shared by the HTTP handlers
#[derive(Clone)]
pub struct ContentProcessor {
    repository: Repository,
    store: LocalFileStore,
    summarizer: Summarizer,
}

impl ContentProcessor {
    pub fn new(repository: Repository, store: LocalFileStore, summarizer: Summarizer) -> Self {
        Self {
            repository,
            store,
            summarizer,
        }
    }

    /// Validate, extract, summarize and persist one submission
    #[instrument(skip_all, fields(user_id = submission.user_id))]
    pub async fn create(&self, submission: Submission) -> Result<Content> {
        let user_id = submission.user_id;
        let (source, summary_length) = submission.into_source()?;

        let (extracted_text, original_file, original_text) = match source {
            Source::File(file) => {
                let input = SourceInput::File {
                    bytes: file.bytes.clone(),
                    filename: file.filename.clone(),
                };
                let text = tokio::task::spawn_blocking(move || extract(input))
                    .await
                    .map_err(|e| AppError::Internal {
                        message: format!("Extraction task failed: {}", e),
                    })??;

                let stored = self.store.save(&file.filename, &file.bytes).await?;
                info!(path = %stored, "Upload stored");
                (text, Some(stored), None)
            }
            Source::Text(text) => (extract(SourceInput::Text(text.clone()))?, None, Some(text)),
        };

        let result = self
            .summarizer
            .summarize(&extracted_text, &SummaryLength::parse(&summary_length))
            .await;

        let content = self
            .repository
            .create_content(NewContent {
                user_id: Some(user_id),
                original_file,
                original_text,
                summary_length,
                extracted_text,
                summary: result.summary,
                keywords: result.keywords,
                auto_title: result.title,
                document_type: result.document_type,
                language: result.language,
            })
            .await?;

        info!(content_id = content.id, "Content created");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use precis_common::db::DbPool;
    use precis_common::llm::MockGenerator;
    use sea_orm::{ConnectOptions, Database};
    use std::sync::Arc;

    struct Fixture {
        processor: ContentProcessor,
        repo: Repository,
        mock: Arc<MockGenerator>,
        user_id: i32,
        _dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let pool = DbPool::from_connection(Database::connect(opts).await.unwrap());
        pool.migrate().await.unwrap();
        let repo = Repository::new(pool);
        let user = repo
            .create_user("owner".into(), "o@example.com".into(), "h".into())
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockGenerator::new());
        let processor = ContentProcessor::new(
            repo.clone(),
            LocalFileStore::new(dir.path()),
            Summarizer::new(mock.clone()),
        );

        Fixture { processor, repo, mock, user_id: user.id, _dir: dir }
    }

    #[tokio::test]
    async fn test_text_submission() {
        let f = fixture().await;
        let content = f
            .processor
            .create(Submission {
                user_id: f.user_id,
                text: Some("The report covers the quarterly results.".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(content.original_text.as_deref(), Some("The report covers the quarterly results."));
        assert!(content.original_file.is_none());
        assert_eq!(content.extracted_text, "The report covers the quarterly results.");
        assert_eq!(content.summary_length, "medium");
        assert_eq!(content.auto_title, "Mock Document Summary");
        assert_eq!(content.user_id, Some(f.user_id));
        assert_eq!(f.mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_file_submission_is_stored() {
        let f = fixture().await;
        let content = f
            .processor
            .create(Submission {
                user_id: f.user_id,
                file: Some(SubmittedFile {
                    filename: "notes.txt".into(),
                    bytes: b"Plain notes from a meeting".to_vec(),
                }),
                summary_length: Some("short".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let stored = content.original_file.unwrap();
        assert!(stored.starts_with("documents/"));
        assert!(content.original_text.is_none());
        assert_eq!(content.extracted_text, "Plain notes from a meeting");
        assert_eq!(content.summary_length, "short");
    }

    #[tokio::test]
    async fn test_requires_exactly_one_input() {
        let f = fixture().await;

        let err = f
            .processor
            .create(Submission { user_id: f.user_id, text: Some("   ".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Either file or text must be provided.");

        let err = f
            .processor
            .create(Submission {
                user_id: f.user_id,
                text: Some("text".into()),
                file: Some(SubmittedFile { filename: "a.txt".into(), bytes: b"file".to_vec() }),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Provide either a file or text, not both.");
        assert_eq!(f.mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_summary_length_limit() {
        let f = fixture().await;
        let err = f
            .processor
            .create(Submission {
                user_id: f.user_id,
                text: Some("text".into()),
                summary_length: Some("extremely-long".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_extraction_failure_persists_nothing() {
        let f = fixture().await;
        let err = f
            .processor
            .create(Submission {
                user_id: f.user_id,
                file: Some(SubmittedFile { filename: "broken.pdf".into(), bytes: b"nope".to_vec() }),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ExtractionFailed { .. }));
        assert!(f.repo.list_contents_for_user(f.user_id).await.unwrap().is_empty());
        assert_eq!(f.mock.call_count(), 0);
    }
}
