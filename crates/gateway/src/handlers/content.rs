//! Content handlers
//!
//! Creation accepts either `multipart/form-data` (file upload or text) or a
//! JSON body with pasted text. Every lookup is scoped to the caller, so other
//! users' records answer 404.

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::AppState;
use precis_common::{
    auth::AuthUser,
    db::models::Content,
    errors::{AppError, Result},
};
use precis_export::{render, ExportFormat, ExportSource};
use precis_ingestion::{Submission, SubmittedFile};

/// Format used when the client does not ask for one
pub const DEFAULT_DOWNLOAD_FORMAT: &str = "pdf";

/// JSON creation body; generated fields sent by clients are ignored
#[derive(Debug, Default, Deserialize)]
pub struct CreateContentRequest {
    pub original_text: Option<String>,
    pub summary_length: Option<String>,
}

/// Full record representation
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub id: i32,
    pub original_file: Option<String>,
    pub original_text: Option<String>,
    pub summary_length: String,
    pub created_at: DateTime<FixedOffset>,
    pub extracted_text: String,
    pub summary: String,
    pub keywords: String,
    pub auto_title: String,
    pub document_type: String,
    pub language: String,
}

impl From<Content> for ContentResponse {
    fn from(c: Content) -> Self {
        Self {
            id: c.id,
            original_file: c.original_file,
            original_text: c.original_text,
            summary_length: c.summary_length,
            created_at: c.created_at,
            extracted_text: c.extracted_text,
            summary: c.summary,
            keywords: c.keywords,
            auto_title: c.auto_title,
            document_type: c.document_type,
            language: c.language,
        }
    }
}

/// Detail view with a preview of the extracted text
#[derive(Debug, Serialize)]
pub struct ContentDetailResponse {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub keywords: String,
    pub original_text: Option<String>,
    pub summary_length: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<Content> for ContentDetailResponse {
    fn from(c: Content) -> Self {
        let original_text = c.text_preview();
        Self {
            id: c.id,
            title: c.auto_title,
            summary: c.summary,
            keywords: c.keywords,
            original_text,
            summary_length: c.summary_length,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub format: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// List the caller's records, newest first
pub async fn list_contents(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ContentResponse>>> {
    let contents = state.repo.list_contents_for_user(auth.user_id).await?;
    Ok(Json(contents.into_iter().map(Into::into).collect()))
}

/// Create a record from an upload or pasted text
pub async fn create_content(
    State(state): State<AppState>,
    auth: AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<ContentResponse>)> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let limit = state.config.storage.max_upload_bytes;
    let mut submission = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::InvalidFormat { message: e.body_text() })?;
        read_multipart(multipart, limit).await?
    } else {
        let Json(body) = Json::<CreateContentRequest>::from_request(request, &state)
            .await
            .map_err(|e| match e.status() {
                StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge { limit },
                _ => AppError::InvalidFormat { message: e.body_text() },
            })?;
        Submission {
            text: body.original_text,
            summary_length: body.summary_length,
            ..Default::default()
        }
    };
    submission.user_id = auth.user_id;

    let content = state.processor.create(submission).await?;
    Ok((StatusCode::CREATED, Json(content.into())))
}

/// One record of the caller
pub async fn get_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ContentDetailResponse>> {
    let content = find_owned(&state, id, auth.user_id).await?;
    Ok(Json(content.into()))
}

/// Download with the format taken from `?format=`
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let format = query.format.unwrap_or_else(|| DEFAULT_DOWNLOAD_FORMAT.to_string());
    render_download(&state, id, auth.user_id, &format).await
}

/// Download with the format in the path; `?format=` still wins
pub async fn download_as(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, format)): Path<(i32, String)>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let format = query.format.unwrap_or(format);
    render_download(&state, id, auth.user_id, &format).await
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_owned(state: &AppState, id: i32, user_id: i32) -> Result<Content> {
    state
        .repo
        .find_content_for_user(id, user_id)
        .await?
        .ok_or(AppError::ContentNotFound { id })
}

async fn render_download(state: &AppState, id: i32, user_id: i32, format: &str) -> Result<Response> {
    let content = find_owned(state, id, user_id).await?;
    let rendered = render(&ExportSource::from(&content), ExportFormat::parse(format))?;

    tracing::info!(content_id = id, filename = %rendered.filename, "Serving download");

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(rendered.content_type)),
        (header::CONTENT_DISPOSITION, content_disposition(&rendered.filename)?),
    ];
    Ok((headers, rendered.bytes).into_response())
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(filename: &str) -> Result<HeaderValue> {
    let safe = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-');

    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() && safe(c as u8) { c } else { '_' })
        .collect();
    let encoded: String = filename
        .bytes()
        .map(|b| if safe(b) { (b as char).to_string() } else { format!("%{:02X}", b) })
        .collect();

    HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    ))
    .map_err(|e| AppError::Internal {
        message: format!("Invalid Content-Disposition: {}", e),
    })
}

async fn read_multipart(mut multipart: Multipart, limit: usize) -> Result<Submission> {
    let mut submission = Submission::default();

    let field_error = |e: axum::extract::multipart::MultipartError| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge { limit },
        _ => AppError::InvalidFormat { message: e.body_text() },
    };

    while let Some(field) = multipart.next_field().await.map_err(field_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "original_file" => {
                let filename = field
                    .file_name()
                    .filter(|f| !f.is_empty())
                    .unwrap_or("upload")
                    .to_string();
                let bytes = field.bytes().await.map_err(field_error)?;
                submission.file = Some(SubmittedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            "original_text" => submission.text = Some(field.text().await.map_err(field_error)?),
            "summary_length" => {
                submission.summary_length = Some(field.text().await.map_err(field_error)?)
            }
            _ => {}
        }
    }

    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        let value = content_disposition("Hello_World_2024.pdf").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"Hello_World_2024.pdf\"; filename*=UTF-8''Hello_World_2024.pdf"
        );
    }

    #[test]
    fn test_content_disposition_unicode() {
        let value = content_disposition("Café.txt").unwrap();
        let text = value.to_str().unwrap();
        assert!(text.contains("filename=\"Caf_.txt\""));
        assert!(text.contains("filename*=UTF-8''Caf%C3%A9.txt"));
    }
}
