/// LLM client: the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Generation code depends on the `TextGenerator` trait; `LlmClient` is the production impl.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No candidates returned (block reason: {reason})")]
    NoCandidates { reason: String },

    #[error("Generation stopped without text (finish reason: {finish_reason})")]
    Blocked { finish_reason: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Per-call sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: Option<f32>,
    /// Ask the API for `application/json` output.
    pub json_output: bool,
}

impl GenerationParams {
    pub fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            max_output_tokens,
            top_p: None,
            json_output: false,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Anything that turns a prompt into text. Carried as `&dyn TextGenerator` through generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str, params: GenerationParams)
        -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Returns the first candidate's first text part, classifying the failure otherwise.
    pub fn into_text(self) -> Result<String, LlmError> {
        let block_reason = self
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "unspecified".to_string());

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(LlmError::NoCandidates {
                reason: block_reason,
            })?;

        let text = candidate
            .content
            .into_iter()
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .find(|t| !t.trim().is_empty());

        match (text, candidate.finish_reason.as_deref()) {
            (Some(text), _) => Ok(text),
            (None, None | Some("STOP") | Some("MAX_TOKENS")) => Err(LlmError::EmptyContent),
            (None, Some(reason)) => Err(LlmError::Blocked {
                finish_reason: reason.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini `generateContent` client with retry on rate limits and server errors.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<GenerateContentResponse, LlmError> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
                top_p: params.top_p,
                response_mime_type: params.json_output.then_some("application/json"),
            },
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&request_body)
                .send()
                .await;

            // Transport failures are not retried; only the statuses below are.
            let response = response?;
            let status = response.status();

            if is_retryable_status(status.as_u16()) {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: GenerateContentResponse = response.json().await?;

            if let Some(usage) = &llm_response.usage_metadata {
                debug!(
                    model = %self.model,
                    "LLM call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Rate limits and server errors are retried; any other failure returns immediately.
fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate_text(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError> {
        self.call(prompt, params).await?.into_text()
    }
}

/// Calls the generator in JSON mode and deserializes the reply.
/// The prompt must describe the expected JSON shape.
pub async fn generate_json<T: DeserializeOwned>(
    llm: &dyn TextGenerator,
    prompt: &str,
    params: GenerationParams,
) -> Result<T, LlmError> {
    let text = llm.generate_text(prompt, params.json()).await?;
    serde_json::from_str(strip_code_fences(&text)).map_err(LlmError::Parse)
}

/// Strips ```lang ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag, if any, up to the first newline.
    let rest = match rest.find('\n') {
        Some(idx) if !rest[..idx].contains(char::is_whitespace) => &rest[idx + 1..],
        _ => rest,
    };
    let rest = rest.trim();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted generator for pipeline tests: pops one reply per call and records prompts.
    pub(crate) struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub(crate) prompts: Mutex<Vec<(String, GenerationParams)>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn ok(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        pub(crate) fn recorded(&self) -> Vec<(String, GenerationParams)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate_text(
            &self,
            prompt: &str,
            params: GenerationParams,
        ) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), params));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }

    #[test]
    fn test_only_rate_limits_and_server_errors_are_retried() {
        for status in [429, 500, 502, 503, 599] {
            assert!(is_retryable_status(status), "{status} should retry");
        }
        for status in [200, 400, 401, 403, 404, 600] {
            assert!(!is_retryable_status(status), "{status} should not retry");
        }
    }

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_code_fences_without_tag() {
        let input = "```\nPython, SQL\n```";
        assert_eq!(strip_code_fences(input), "Python, SQL");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        let input = "  {\"key\": \"value\"} ";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_request_serializes_gemini_shape() {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 200,
                top_p: None,
                response_mime_type: Some("application/json"),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 200);
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert!(json["generationConfig"].get("topP").is_none());
    }

    #[test]
    fn test_response_text_extracted() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Python, SQL"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.into_text().unwrap(), "Python, SQL");
    }

    #[test]
    fn test_response_without_candidates_reports_block_reason() {
        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        match resp.into_text() {
            Err(LlmError::NoCandidates { reason }) => assert_eq!(reason, "SAFETY"),
            other => panic!("expected NoCandidates, got {other:?}"),
        }
    }

    #[test]
    fn test_response_safety_stop_is_blocked() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[]},"finishReason":"SAFETY"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            resp.into_text(),
            Err(LlmError::Blocked { finish_reason }) if finish_reason == "SAFETY"
        ));
    }

    #[test]
    fn test_response_max_tokens_without_text_is_empty() {
        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#).unwrap();
        assert!(matches!(resp.into_text(), Err(LlmError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_generate_json_parses_fenced_reply() {
        let llm = ScriptedGenerator::ok(&["```json\n{\"ats_score\": 81}\n```"]);
        let value: serde_json::Value =
            generate_json(&llm, "prompt", GenerationParams::new(0.1, 300))
                .await
                .unwrap();
        assert_eq!(value["ats_score"], 81);
        let recorded = llm.recorded();
        assert!(recorded[0].1.json_output);
    }
}
