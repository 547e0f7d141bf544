//! Generative model client abstraction
//!
//! The model is treated as an opaque text-in/text-out service. Clients are
//! constructed explicitly at startup and injected where needed:
//! - Gemini (`generateContent` REST endpoint)
//! - Mock (deterministic, for development and tests)

use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default Gemini REST endpoint
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Trait for text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a prompt with an optional system instruction
    async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Gemini client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent<'a>>,
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e)
            })?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| GEMINI_API_BASE.to_string()),
        })
    }

    async fn make_request(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let request = GenerateRequest {
            system_instruction: system_instruction.map(|text| RequestContent {
                role: None,
                parts: vec![RequestPart { text }],
            }),
            contents: vec![RequestContent {
                role: Some("user"),
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ModelError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ModelError {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: GenerateResponse = response.json().await.map_err(|e| {
            AppError::ModelError {
                message: format!("Failed to parse response: {}", e),
            }
        })?;

        extract_text(result)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(response: GenerateResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AppError::ModelError {
            message: format!("Prompt blocked: {}", reason),
        });
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(AppError::ModelError {
            message: "Empty response".to_string(),
        });
    }

    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        let start = Instant::now();
        let result = self.make_request(prompt, system_instruction).await;

        crate::metrics::record_model_call(
            start.elapsed().as_secs_f64(),
            &self.model,
            result.is_ok(),
        );

        if let Err(ref e) = result {
            tracing::warn!(model = %self.model, error = %e, "Model request failed");
        }

        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Mock generator for development and testing
///
/// Answers prompts that ask for the `KEYWORDS:` block with the analysis
/// response and everything else with the summary response.
pub struct MockGenerator {
    analysis: String,
    summary: String,
    calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::with_responses(
            "KEYWORDS: mock, summary, document\nTITLE: Mock Document Summary\nTYPE: document\nLANGUAGE: en",
            "This is a mock summary of the submitted document.",
        )
    }

    pub fn with_responses(analysis: &str, summary: &str) -> Self {
        Self {
            analysis: analysis.to_string(),
            summary: summary.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, _system_instruction: Option<&str>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.contains("KEYWORDS:") {
            Ok(self.analysis.clone())
        } else {
            Ok(self.summary.clone())
        }
    }

    fn model_name(&self) -> &str {
        "mock-generator"
    }
}

/// Create a text generator based on configuration
pub fn create_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>> {
    match config.provider.as_str() {
        "gemini" => {
            let key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| AppError::Configuration {
                    message: "llm.api_key is required for the gemini provider".to_string(),
                })?;
            Ok(Arc::new(GeminiClient::new(
                key,
                config.model.clone(),
                config.api_base.clone(),
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        "mock" => {
            tracing::warn!("Using mock text generator");
            Ok(Arc::new(MockGenerator::new()))
        }
        other => Err(AppError::Configuration {
            message: format!("Unknown llm provider: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_routes_by_prompt() {
        let mock = MockGenerator::with_responses("KEYWORDS: a\nTITLE: T", "S");
        assert_eq!(mock.generate("Return KEYWORDS: ...", None).await.unwrap(), "KEYWORDS: a\nTITLE: T");
        assert_eq!(mock.generate("Summarize this", Some("sys")).await.unwrap(), "S");
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "world" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let response: GenerateResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(matches!(extract_text(response), Err(AppError::ModelError { .. })));
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            system_instruction: Some(RequestContent {
                role: None,
                parts: vec![RequestPart { text: "be brief" }],
            }),
            contents: vec![RequestContent {
                role: Some("user"),
                parts: vec![RequestPart { text: "hi" }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_factory_requires_key_for_gemini() {
        let mut config = crate::config::AppConfig::default().llm;
        assert!(create_generator(&config).is_err());

        config.provider = "mock".to_string();
        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.model_name(), "mock-generator");

        config.provider = "unknown".to_string();
        assert!(create_generator(&config).is_err());
    }
}
