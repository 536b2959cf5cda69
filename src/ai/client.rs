//! HTTP client for a hosted AI provider API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::athletes::{Role, WeeklyPlan};
use crate::context::ContextSnapshot;

use super::provider::{AgentMessage, AiError, AiProvider, VideoAnalysis};

/// Default provider API base URL.
const DEFAULT_API_URL: &str = "https://api.peakform.io/v1";

/// HTTP-backed AI provider.
pub struct HttpAiProvider {
    /// HTTP client
    http: reqwest::Client,
    /// Base URL for the API
    base_url: String,
    /// API key for authentication
    api_key: String,
}

impl HttpAiProvider {
    /// Create a client against the default endpoint.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_URL.to_string())
    }

    /// Create a client against a custom endpoint.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// POST a request and decode the response envelope.
    async fn request<T, R>(&self, endpoint: &str, body: &T) -> Result<R, AiError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else if e.is_connect() {
                    AiError::Offline
                } else {
                    AiError::Api(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AiError::RateLimited);
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AiError::Auth);
        }
        if !status.is_success() {
            return Err(AiError::Api(format!("API returned status {}", status)));
        }

        let envelope: ApiResponse<R> = response
            .json()
            .await
            .map_err(|e| AiError::Serialization(e.to_string()))?;

        if envelope.success {
            envelope
                .data
                .ok_or_else(|| AiError::Api("API returned success but no data".to_string()))
        } else {
            let error = envelope.error.unwrap_or_default();
            Err(AiError::Api(error.message))
        }
    }
}

#[async_trait]
impl AiProvider for HttpAiProvider {
    async fn generate_plan(&self, ctx: &ContextSnapshot) -> Result<Option<WeeklyPlan>, AiError> {
        let response: PlanResponse = self
            .request("/plans/generate", &PlanRequest { context: ctx })
            .await?;
        Ok(response.plan)
    }

    async fn run_critic_loop(
        &self,
        ctx: &ContextSnapshot,
        topic: &str,
        knowledge: &str,
    ) -> Result<Vec<AgentMessage>, AiError> {
        let response: CriticResponse = self
            .request(
                "/agents/critic",
                &CriticRequest {
                    context: ctx,
                    topic,
                    knowledge,
                },
            )
            .await?;
        Ok(response.messages)
    }

    async fn chat(
        &self,
        message: &str,
        ctx: &ContextSnapshot,
        knowledge: &str,
        role: Role,
    ) -> Result<String, AiError> {
        let response: ChatResponse = self
            .request(
                "/chat",
                &ChatRequest {
                    message,
                    context: ctx,
                    knowledge,
                    role,
                },
            )
            .await?;
        Ok(response.reply)
    }

    async fn analyze_video(
        &self,
        frames: &[String],
        context_text: &str,
    ) -> Result<VideoAnalysis, AiError> {
        self.request(
            "/vision/analyze",
            &VisionRequest {
                frames,
                context: context_text,
            },
        )
        .await
    }
}

/// API response wrapper.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<ApiError>,
}

/// API error details.
#[derive(Debug, Default, Deserialize)]
#[allow(dead_code)]
struct ApiError {
    code: String,
    message: String,
}

#[derive(Serialize)]
struct PlanRequest<'a> {
    context: &'a ContextSnapshot,
}

#[derive(Deserialize)]
struct PlanResponse {
    plan: Option<WeeklyPlan>,
}

#[derive(Serialize)]
struct CriticRequest<'a> {
    context: &'a ContextSnapshot,
    topic: &'a str,
    knowledge: &'a str,
}

#[derive(Deserialize)]
struct CriticResponse {
    messages: Vec<AgentMessage>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    context: &'a ContextSnapshot,
    knowledge: &'a str,
    role: Role,
}

#[derive(Deserialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Serialize)]
struct VisionRequest<'a> {
    frames: &'a [String],
    context: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpAiProvider::new("test-api-key".to_string());
        assert_eq!(client.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_envelope_decoding() {
        let raw = r#"{"success": true, "data": {"reply": "rest today"}, "error": null}"#;
        let envelope: ApiResponse<ChatResponse> = serde_json::from_str(raw).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.unwrap().reply, "rest today");

        let failed = r#"{"success": false, "data": null, "error": {"code": "quota", "message": "out of quota"}}"#;
        let envelope: ApiResponse<ChatResponse> = serde_json::from_str(failed).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.error.unwrap().message, "out of quota");
    }
}
