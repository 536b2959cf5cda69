//! AI provider integration.
//!
//! The [`AiProvider`] trait is the external seam; [`AiGateway`] is how the
//! rest of the crate calls it - with deadlines, retries and deterministic
//! fallbacks so an unavailable provider never blocks the core.

pub mod client;
pub mod fallback;
pub mod gateway;
pub mod messages;
pub mod provider;

pub use client::HttpAiProvider;
pub use fallback::{critic_fallback, FallbackPlanner};
pub use gateway::{AiGateway, GeneratedPlan, PlanSource};
pub use messages::chat_failure_message;
pub use provider::{
    AgentMessage, AiError, AiProvider, ChatMessage, ChatSender, FailureCategory, VideoAnalysis,
};
