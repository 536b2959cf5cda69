//! PeakForm - athlete readiness and training-load orchestration core.
//!
//! Coordinates athlete state (injuries, load, training sessions) across many
//! asynchronous writers and keeps a single consistent view from which safety
//! rules derive risk alerts and gate AI-authored training plans. Ingestion is
//! serialized per athlete, every state change is published on the in-process
//! event bus, and all AI provider calls are wrapped with deterministic
//! fallbacks.

pub mod ai;
pub mod athletes;
pub mod config;
pub mod context;
pub mod events;
pub mod knowledge;
pub mod metrics;
pub mod notify;
pub mod orchestrator;
pub mod processors;
pub mod rules;
pub mod storage;

// Re-export commonly used types
pub use ai::{AiGateway, AiProvider, HttpAiProvider};
pub use athletes::{Athlete, AthleteStatus, TrainingPhase, WeeklyPlan};
pub use config::CoreConfig;
pub use context::ContextSnapshot;
pub use events::{Event, EventBus, EventKind};
pub use knowledge::KnowledgeBase;
pub use metrics::{AcwrCalculator, RiskInputs};
pub use notify::Notifier;
pub use orchestrator::StateOrchestrator;
pub use processors::DataKind;
pub use rules::RuleEngine;
pub use storage::{AthleteStore, InMemoryStore, SqliteStore};
