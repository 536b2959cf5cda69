//! AI provider contract and shared types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::athletes::{Role, WeeklyPlan};
use crate::context::ContextSnapshot;

/// Errors from the AI provider.
#[derive(Debug, Error)]
pub enum AiError {
    /// Rate limited by the provider
    #[error("rate limited - try again later")]
    RateLimited,

    /// Call exceeded its deadline
    #[error("provider call timed out")]
    Timeout,

    /// Authentication rejected
    #[error("provider rejected credentials")]
    Auth,

    /// Network unavailable
    #[error("provider unreachable")]
    Offline,

    /// Provider-side error
    #[error("provider error: {0}")]
    Api(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::Serialization(err.to_string())
    }
}

/// Failure buckets for user-facing chat errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    RateLimit,
    Timeout,
    Auth,
    Other,
}

impl FailureCategory {
    /// Bucket a provider error.
    pub fn classify(error: &AiError) -> Self {
        match error {
            AiError::RateLimited => FailureCategory::RateLimit,
            AiError::Timeout => FailureCategory::Timeout,
            AiError::Auth => FailureCategory::Auth,
            AiError::Offline | AiError::Api(_) | AiError::Serialization(_) => {
                FailureCategory::Other
            }
        }
    }
}

/// One turn in a critic-loop debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Speaking agent
    pub agent: String,
    /// Message content
    pub content: String,
}

/// Result of a video technique analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysis {
    /// Technical score 0-10
    pub technical_score: f64,
    /// Observed issues or strengths
    pub findings: Vec<String>,
    /// One-paragraph summary
    pub summary: String,
    /// Confidence 0.0-1.0
    pub confidence: f32,
}

impl VideoAnalysis {
    /// Neutral result used when no provider analysis is available.
    pub fn unavailable() -> Self {
        Self {
            technical_score: 0.0,
            findings: Vec::new(),
            summary: "Video analysis unavailable; no findings recorded.".to_string(),
            confidence: 0.0,
        }
    }
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    User,
    Assistant,
}

/// A persisted chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier
    pub id: Uuid,
    /// Author
    pub sender: ChatSender,
    /// Message text
    pub content: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message from the given sender.
    pub fn new(sender: ChatSender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// The AI provider seam.
///
/// Every method is fallible; callers wrap each call with a deadline and a
/// deterministic fallback so provider failures never surface raw.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Generate a weekly plan. `None` means the provider declined.
    async fn generate_plan(&self, ctx: &ContextSnapshot) -> Result<Option<WeeklyPlan>, AiError>;

    /// Run a critic-loop debate over a topic.
    async fn run_critic_loop(
        &self,
        ctx: &ContextSnapshot,
        topic: &str,
        knowledge: &str,
    ) -> Result<Vec<AgentMessage>, AiError>;

    /// Answer a chat message.
    async fn chat(
        &self,
        message: &str,
        ctx: &ContextSnapshot,
        knowledge: &str,
        role: Role,
    ) -> Result<String, AiError>;

    /// Analyze extracted video frames.
    async fn analyze_video(
        &self,
        frames: &[String],
        context_text: &str,
    ) -> Result<VideoAnalysis, AiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        assert_eq!(
            FailureCategory::classify(&AiError::RateLimited),
            FailureCategory::RateLimit
        );
        assert_eq!(
            FailureCategory::classify(&AiError::Timeout),
            FailureCategory::Timeout
        );
        assert_eq!(FailureCategory::classify(&AiError::Auth), FailureCategory::Auth);
        assert_eq!(
            FailureCategory::classify(&AiError::Api("500".into())),
            FailureCategory::Other
        );
        assert_eq!(
            FailureCategory::classify(&AiError::Offline),
            FailureCategory::Other
        );
    }

    #[test]
    fn test_unavailable_analysis_is_neutral() {
        let analysis = VideoAnalysis::unavailable();
        assert!(analysis.findings.is_empty());
        assert_eq!(analysis.confidence, 0.0);
    }
}
