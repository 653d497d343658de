use std::fmt;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{
    common::LLMConfig,
    food_analysis::{
        entities::AnalysisRequest,
        errors::{AnalysisError, NetworkError},
        ports::LLMClient,
    },
};

const FINISH_REASON_STOP: &str = "STOP";
const RESPONSE_MIME_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct GeminiLLMClient {
    model_name: String,
    endpoint: Url,
    client: Client,
}

impl fmt::Debug for GeminiLLMClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiLLMClient")
            .field("model_name", &self.model_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

impl From<AnalysisRequest> for GeminiRequest {
    fn from(request: AnalysisRequest) -> Self {
        let image = request.image().clone();

        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: request.prompt().to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: image.data,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            },
        }
    }
}

/// Body of a `generateContent` response: either an error envelope or candidates.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeminiEnvelope {
    Failure { error: GeminiErrorBody },
    Success(GeminiResponse),
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    code: Option<i64>,
    message: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    /// An `error` member that did not match the documented error shape.
    error: Option<serde_json::Value>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    finish_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SafetyRating {
    #[serde(default)]
    category: String,
    #[serde(default)]
    probability: HarmProbability,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum HarmProbability {
    #[default]
    #[serde(rename = "HARM_PROBABILITY_UNSPECIFIED")]
    Unspecified,
    Negligible,
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

impl HarmProbability {
    fn is_flagged(self) -> bool {
        matches!(self, HarmProbability::Medium | HarmProbability::High)
    }

    fn as_str(self) -> &'static str {
        match self {
            HarmProbability::Unspecified => "HARM_PROBABILITY_UNSPECIFIED",
            HarmProbability::Negligible => "NEGLIGIBLE",
            HarmProbability::Low => "LOW",
            HarmProbability::Medium => "MEDIUM",
            HarmProbability::High => "HIGH",
            HarmProbability::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
    total_token_count: Option<u64>,
}

impl GeminiErrorBody {
    fn into_api_error(self, status: StatusCode) -> AnalysisError {
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status_text(status));

        AnalysisError::Api {
            code: self.code.or(Some(i64::from(status.as_u16()))),
            status: self.status,
            message,
        }
    }
}

impl GeminiLLMClient {
    pub fn new(config: &LLMConfig) -> Result<Self, AnalysisError> {
        let endpoint = build_endpoint(
            &config.gemini_base_url,
            &config.gemini_model,
            &config.gemini_api_key,
        )?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AnalysisError::Configuration(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            model_name: config.gemini_model.clone(),
            endpoint,
            client,
        })
    }

    async fn call_gemini_api(&self, request: GeminiRequest) -> Result<String, AnalysisError> {
        tracing::info!("Sending food image to Gemini model {}", self.model_name);

        // The endpoint carries the API key, so URLs are stripped from transport errors.
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let error = network_error(e);
                tracing::error!("Gemini API request failed: {}", error);
                error
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let error = network_error(e);
            tracing::error!("Failed to read Gemini response: {}", error);
            error
        })?;

        tracing::debug!("Gemini responded with {} ({} bytes)", status, body.len());

        extract_payload_text(status, &body)
    }
}

impl LLMClient for GeminiLLMClient {
    async fn generate_with_image(&self, request: AnalysisRequest) -> Result<String, AnalysisError> {
        self.call_gemini_api(GeminiRequest::from(request)).await
    }
}

fn network_error(error: reqwest::Error) -> AnalysisError {
    if error.is_timeout() {
        return AnalysisError::Network(NetworkError::Timeout);
    }

    let error = error.without_url();
    let mut message = error.to_string();
    let mut source = std::error::Error::source(&error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }

    AnalysisError::Network(NetworkError::Transport(message))
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Builds `{base}/v1beta/models/{model}:generateContent?key={api_key}`.
fn build_endpoint(base_url: &str, model: &str, api_key: &str) -> Result<Url, AnalysisError> {
    if api_key.trim().is_empty() {
        return Err(AnalysisError::Configuration(
            "missing Gemini API key".to_string(),
        ));
    }
    if api_key.chars().any(char::is_whitespace) {
        return Err(AnalysisError::Configuration(
            "Gemini API key must not contain whitespace".to_string(),
        ));
    }
    if model.trim().is_empty() || model.contains(['/', '?', '#']) {
        return Err(AnalysisError::Configuration(format!(
            "invalid Gemini model name: {:?}",
            model
        )));
    }

    let mut base = Url::parse(base_url).map_err(|e| {
        AnalysisError::Configuration(format!("invalid Gemini base URL {:?}: {}", base_url, e))
    })?;
    if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
        return Err(AnalysisError::Configuration(format!(
            "Gemini base URL must be an http(s) URL: {:?}",
            base_url
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut endpoint = base
        .join(&format!("v1beta/models/{}:generateContent", model))
        .map_err(|e| AnalysisError::Configuration(format!("invalid Gemini endpoint: {}", e)))?;
    endpoint.query_pairs_mut().append_pair("key", api_key);

    Ok(endpoint)
}

/// Validates a `generateContent` response and returns the first candidate's text.
fn extract_payload_text(status: StatusCode, body: &str) -> Result<String, AnalysisError> {
    if !status.is_success() {
        return Err(match serde_json::from_str::<GeminiErrorEnvelope>(body) {
            Ok(envelope) => {
                let error = envelope.error.into_api_error(status);
                tracing::error!("Gemini API error: {}", error);
                error
            }
            Err(_) => {
                tracing::error!("Gemini API error: {} - {}", status, body);
                let body = body.trim();
                AnalysisError::Api {
                    code: Some(i64::from(status.as_u16())),
                    status: None,
                    message: if body.is_empty() {
                        status_text(status)
                    } else {
                        body.to_string()
                    },
                }
            }
        });
    }

    let response = match serde_json::from_str::<GeminiEnvelope>(body) {
        Ok(GeminiEnvelope::Success(response)) => response,
        Ok(GeminiEnvelope::Failure { error }) => {
            let error = error.into_api_error(status);
            tracing::error!("Gemini API error in successful response: {}", error);
            return Err(error);
        }
        Err(e) => {
            tracing::error!("Failed to parse Gemini response: {}", e);
            return Err(AnalysisError::Network(NetworkError::InvalidEnvelope(
                e.to_string(),
            )));
        }
    };

    if let Some(usage) = &response.usage_metadata {
        tracing::debug!(
            "Gemini usage: {:?} prompt, {:?} candidates, {:?} total tokens",
            usage.prompt_token_count,
            usage.candidates_token_count,
            usage.total_token_count
        );
    }

    if response.candidates.is_empty() && response.error.is_some() {
        tracing::error!("Gemini API error in successful response: {}", body);
        return Err(AnalysisError::Api {
            code: Some(i64::from(status.as_u16())),
            status: None,
            message: body.trim().to_string(),
        });
    }

    let Some(candidate) = response.candidates.first() else {
        let block_reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason);
        return Err(AnalysisError::MalformedResponse(match block_reason {
            Some(reason) => format!("no candidates (prompt blocked: {})", reason),
            None => "no candidates".to_string(),
        }));
    };

    // An absent finish reason counts as a normal stop.
    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != FINISH_REASON_STOP {
            return Err(finish_reason_error(reason, &candidate.safety_ratings));
        }
    }

    candidate
        .content
        .as_ref()
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.as_deref())
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| AnalysisError::MalformedResponse("no text payload".to_string()))
}

fn finish_reason_error(reason: &str, ratings: &[SafetyRating]) -> AnalysisError {
    let flagged: Vec<String> = ratings
        .iter()
        .filter(|rating| rating.probability.is_flagged())
        .map(|rating| format!("{}: {}", rating.category, rating.probability.as_str()))
        .collect();

    let message = if flagged.is_empty() {
        format!("model stopped generating: {}", reason)
    } else {
        format!(
            "model stopped generating: {} (flagged: {})",
            reason,
            flagged.join(", ")
        )
    };
    tracing::error!("Gemini candidate rejected: {}", message);

    AnalysisError::Api {
        code: None,
        status: Some(reason.to_string()),
        message,
    }
}
