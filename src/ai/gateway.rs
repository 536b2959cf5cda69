//! Provider call gateway: deadlines, retries, deterministic fallbacks.
//!
//! Every provider call goes through here. Failures and timeouts never
//! escape: plan generation falls back to the rule-based planner, critic
//! review to templated messages, video analysis to a neutral result, and
//! chat to a categorized user-facing message after bounded retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::athletes::Role;
use crate::config::ProviderConfig;
use crate::context::ContextSnapshot;

use super::fallback::{critic_fallback, FallbackPlanner};
use super::messages::chat_failure_message;
use super::provider::{
    AgentMessage, AiError, AiProvider, FailureCategory, VideoAnalysis,
};
use crate::athletes::WeeklyPlan;

/// Where a generated plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    /// The AI provider produced it
    Provider,
    /// The deterministic fallback planner produced it
    Fallback,
}

impl PlanSource {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            PlanSource::Provider => "provider",
            PlanSource::Fallback => "fallback",
        }
    }
}

/// A plan plus its provenance.
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: WeeklyPlan,
    pub source: PlanSource,
}

/// Gateway wrapping the provider seam.
pub struct AiGateway {
    provider: Arc<dyn AiProvider>,
    planner: FallbackPlanner,
    call_timeout: Duration,
    chat_max_retries: u32,
    chat_backoff: Duration,
    locale: String,
}

impl AiGateway {
    /// Create a gateway over a provider.
    pub fn new(provider: Arc<dyn AiProvider>, config: &ProviderConfig, locale: &str) -> Self {
        Self {
            provider,
            planner: FallbackPlanner,
            call_timeout: Duration::from_secs(config.timeout_secs),
            chat_max_retries: config.chat_max_retries,
            chat_backoff: Duration::from_millis(config.chat_backoff_ms),
            locale: locale.to_string(),
        }
    }

    /// Generate a weekly plan, falling back to the rule-based planner when
    /// the provider fails, times out, or declines.
    pub async fn generate_plan(&self, ctx: &ContextSnapshot) -> GeneratedPlan {
        match timeout(self.call_timeout, self.provider.generate_plan(ctx)).await {
            Ok(Ok(Some(plan))) => GeneratedPlan {
                plan,
                source: PlanSource::Provider,
            },
            Ok(Ok(None)) => {
                tracing::warn!(athlete_id = %ctx.athlete.id, "provider declined plan generation");
                self.fallback_plan(ctx)
            }
            Ok(Err(err)) => {
                tracing::warn!(athlete_id = %ctx.athlete.id, %err, "plan generation failed");
                self.fallback_plan(ctx)
            }
            Err(_) => {
                tracing::warn!(athlete_id = %ctx.athlete.id, "plan generation timed out");
                self.fallback_plan(ctx)
            }
        }
    }

    fn fallback_plan(&self, ctx: &ContextSnapshot) -> GeneratedPlan {
        GeneratedPlan {
            plan: self.planner.generate(ctx),
            source: PlanSource::Fallback,
        }
    }

    /// Run the critic loop, falling back to templated messages.
    pub async fn critic_loop(
        &self,
        ctx: &ContextSnapshot,
        topic: &str,
        knowledge: &str,
    ) -> Vec<AgentMessage> {
        match timeout(
            self.call_timeout,
            self.provider.run_critic_loop(ctx, topic, knowledge),
        )
        .await
        {
            Ok(Ok(messages)) if !messages.is_empty() => messages,
            Ok(Ok(_)) => critic_fallback(topic, knowledge),
            Ok(Err(err)) => {
                tracing::warn!(%err, topic, "critic loop failed");
                critic_fallback(topic, knowledge)
            }
            Err(_) => {
                tracing::warn!(topic, "critic loop timed out");
                critic_fallback(topic, knowledge)
            }
        }
    }

    /// Chat with bounded retries. The final failure is classified into a
    /// user-facing message; attempt `n` backs off `base * (n + 1)`.
    pub async fn chat(
        &self,
        message: &str,
        ctx: &ContextSnapshot,
        knowledge: &str,
        role: Role,
    ) -> String {
        let mut last_error = AiError::Api("no attempt made".into());

        for attempt in 0..=self.chat_max_retries {
            match timeout(
                self.call_timeout,
                self.provider.chat(message, ctx, knowledge, role),
            )
            .await
            {
                Ok(Ok(reply)) => return reply,
                Ok(Err(err)) => last_error = err,
                Err(_) => last_error = AiError::Timeout,
            }

            if attempt < self.chat_max_retries {
                tracing::debug!(attempt, %last_error, "chat attempt failed, retrying");
                tokio::time::sleep(self.chat_backoff * (attempt + 1)).await;
            }
        }

        let category = FailureCategory::classify(&last_error);
        tracing::warn!(%last_error, "chat failed after retries");
        chat_failure_message(&self.locale, category).to_string()
    }

    /// Analyze video frames, falling back to a neutral result.
    pub async fn analyze_video(&self, frames: &[String], context_text: &str) -> VideoAnalysis {
        match timeout(
            self.call_timeout,
            self.provider.analyze_video(frames, context_text),
        )
        .await
        {
            Ok(Ok(analysis)) => analysis,
            Ok(Err(err)) => {
                tracing::warn!(%err, "video analysis failed");
                VideoAnalysis::unavailable()
            }
            Err(_) => {
                tracing::warn!("video analysis timed out");
                VideoAnalysis::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::athletes::{Athlete, AthleteStatus};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider that always fails with a fixed error kind.
    struct FailingProvider {
        error: fn() -> AiError,
        calls: AtomicU32,
    }

    impl FailingProvider {
        fn new(error: fn() -> AiError) -> Self {
            Self {
                error,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl AiProvider for FailingProvider {
        async fn generate_plan(
            &self,
            _ctx: &ContextSnapshot,
        ) -> Result<Option<WeeklyPlan>, AiError> {
            Err((self.error)())
        }

        async fn run_critic_loop(
            &self,
            _ctx: &ContextSnapshot,
            _topic: &str,
            _knowledge: &str,
        ) -> Result<Vec<AgentMessage>, AiError> {
            Err((self.error)())
        }

        async fn chat(
            &self,
            _message: &str,
            _ctx: &ContextSnapshot,
            _knowledge: &str,
            _role: Role,
        ) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err((self.error)())
        }

        async fn analyze_video(
            &self,
            _frames: &[String],
            _context_text: &str,
        ) -> Result<VideoAnalysis, AiError> {
            Err((self.error)())
        }
    }

    fn fast_config() -> ProviderConfig {
        ProviderConfig {
            timeout_secs: 1,
            chat_max_retries: 2,
            chat_backoff_ms: 1,
        }
    }

    fn snapshot() -> ContextSnapshot {
        let mut athlete = Athlete::new("Jo");
        athlete.status = AthleteStatus::Optimal;
        ContextSnapshot::assemble(athlete, None, Vec::new(), None)
    }

    #[tokio::test]
    async fn test_plan_falls_back_on_error() {
        let provider = Arc::new(FailingProvider::new(|| AiError::Offline));
        let gateway = AiGateway::new(provider, &fast_config(), "en");

        let generated = gateway.generate_plan(&snapshot()).await;
        assert_eq!(generated.source, PlanSource::Fallback);
        assert_eq!(generated.plan.sessions.len(), 7);
    }

    #[tokio::test]
    async fn test_chat_retries_then_classifies() {
        let provider = Arc::new(FailingProvider::new(|| AiError::RateLimited));
        let gateway = AiGateway::new(provider.clone(), &fast_config(), "en");

        let reply = gateway.chat("how hard today?", &snapshot(), "", Role::Athlete).await;
        // Initial attempt plus two retries
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            reply,
            chat_failure_message("en", FailureCategory::RateLimit)
        );
    }

    #[tokio::test]
    async fn test_chat_success_after_transient_failure() {
        struct FlakyProvider {
            calls: AtomicU32,
        }

        #[async_trait]
        impl AiProvider for FlakyProvider {
            async fn generate_plan(
                &self,
                _ctx: &ContextSnapshot,
            ) -> Result<Option<WeeklyPlan>, AiError> {
                Ok(None)
            }

            async fn run_critic_loop(
                &self,
                _ctx: &ContextSnapshot,
                _topic: &str,
                _knowledge: &str,
            ) -> Result<Vec<AgentMessage>, AiError> {
                Ok(Vec::new())
            }

            async fn chat(
                &self,
                _message: &str,
                _ctx: &ContextSnapshot,
                _knowledge: &str,
                _role: Role,
            ) -> Result<String, AiError> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(AiError::Offline)
                } else {
                    Ok("easy spin today".into())
                }
            }

            async fn analyze_video(
                &self,
                _frames: &[String],
                _context_text: &str,
            ) -> Result<VideoAnalysis, AiError> {
                Ok(VideoAnalysis::unavailable())
            }
        }

        let provider = Arc::new(FlakyProvider {
            calls: AtomicU32::new(0),
        });
        let gateway = AiGateway::new(provider, &fast_config(), "en");

        let reply = gateway.chat("plan?", &snapshot(), "", Role::Athlete).await;
        assert_eq!(reply, "easy spin today");
    }

    #[tokio::test]
    async fn test_critic_falls_back_to_templates() {
        let provider = Arc::new(FailingProvider::new(|| AiError::Api("500".into())));
        let gateway = AiGateway::new(provider, &fast_config(), "en");

        let messages = gateway.critic_loop(&snapshot(), "taper week", "").await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].agent, "planner");
    }

    #[tokio::test]
    async fn test_video_falls_back_to_neutral() {
        let provider = Arc::new(FailingProvider::new(|| AiError::Timeout));
        let gateway = AiGateway::new(provider, &fast_config(), "en");

        let analysis = gateway.analyze_video(&[], "context").await;
        assert!(analysis.findings.is_empty());
        assert_eq!(analysis.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_localized_chat_failure() {
        let provider = Arc::new(FailingProvider::new(|| AiError::Auth));
        let gateway = AiGateway::new(provider, &fast_config(), "es");

        let reply = gateway.chat("hola", &snapshot(), "", Role::Athlete).await;
        assert_eq!(reply, chat_failure_message("es", FailureCategory::Auth));
    }
}
