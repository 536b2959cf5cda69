//! Ingestion processors.
//!
//! Each data kind maps to one processor that transforms the athlete
//! aggregate from a typed payload. The kind set is closed: dispatch is an
//! exhaustive match, so adding a kind without wiring a processor fails to
//! compile rather than at runtime. Kinds arriving with an unknown wire tag
//! are the caller's problem and are skipped with a warning upstream.

pub mod feedback;
pub mod injury;
pub mod linking;
pub mod payloads;
pub mod profile;
pub mod recovery;
pub mod stats;
pub mod therapy;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::athletes::Athlete;
use crate::config::CoreConfig;
use crate::notify::Notifier;

pub use feedback::FeedbackProcessor;
pub use injury::InjuryProcessor;
pub use linking::LinkProcessor;
pub use payloads::{
    FeedbackPayload, IngestPayload, InjuryPayload, InjuryResolvedPayload, LinkAction, LinkPayload,
    ProfilePayload, RecoveryPayload, StatPayload, TherapyPayload,
};
pub use profile::ProfileProcessor;
pub use recovery::RecoveryProcessor;
pub use stats::StatProcessor;
pub use therapy::TherapyProcessor;

/// The closed set of data kinds the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataKind {
    /// Daily wellness check-in with session load
    RecoveryMetrics,
    /// Injury report or update
    InjuryUpdate,
    /// Injury resolution
    InjuryResolved,
    /// Therapy session record
    TherapySession,
    /// Performance stat upsert or removal
    StatUpdate,
    /// Shallow profile merge
    ProfileUpdate,
    /// Human feedback on AI output
    AiFeedback,
    /// Staff link-request action
    LinkRequest,
    /// A weekly plan was regenerated (published, never ingested)
    PlanGenerated,
}

impl DataKind {
    /// Parse a wire tag. Unknown tags return `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "recovery-metrics" => Some(DataKind::RecoveryMetrics),
            "injury-update" => Some(DataKind::InjuryUpdate),
            "injury-resolved" => Some(DataKind::InjuryResolved),
            "therapy-session" => Some(DataKind::TherapySession),
            "stat-update" => Some(DataKind::StatUpdate),
            "profile-update" => Some(DataKind::ProfileUpdate),
            "ai-feedback" => Some(DataKind::AiFeedback),
            "link-request" => Some(DataKind::LinkRequest),
            "plan-generated" => Some(DataKind::PlanGenerated),
            _ => None,
        }
    }

    /// The wire tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            DataKind::RecoveryMetrics => "recovery-metrics",
            DataKind::InjuryUpdate => "injury-update",
            DataKind::InjuryResolved => "injury-resolved",
            DataKind::TherapySession => "therapy-session",
            DataKind::StatUpdate => "stat-update",
            DataKind::ProfileUpdate => "profile-update",
            DataKind::AiFeedback => "ai-feedback",
            DataKind::LinkRequest => "link-request",
            DataKind::PlanGenerated => "plan-generated",
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Errors from a processor.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The decoded payload does not match the dispatched processor.
    /// Indicates a wiring bug, not bad input.
    #[error("payload does not match processor")]
    PayloadMismatch,

    /// Structurally valid payload with unusable content
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Result of processing one payload.
#[derive(Debug, Clone)]
pub struct ProcessorOutcome {
    /// The transformed athlete
    pub athlete: Athlete,
    /// Payload for the update event
    pub event_data: Value,
    /// Skip the store write (a server-side writer already persisted)
    pub skip_persistence: bool,
}

impl ProcessorOutcome {
    /// Outcome that persists the athlete.
    pub fn persist(athlete: Athlete, event_data: Value) -> Self {
        Self {
            athlete,
            event_data,
            skip_persistence: false,
        }
    }

    /// Outcome that leaves the store untouched.
    pub fn pass_through(athlete: Athlete, event_data: Value) -> Self {
        Self {
            athlete,
            event_data,
            skip_persistence: true,
        }
    }
}

/// A pluggable payload handler.
pub trait Processor: Send + Sync {
    /// Transform the athlete from one payload.
    fn process(
        &self,
        payload: &IngestPayload,
        athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError>;
}

/// The fixed processor table, built once at startup.
pub struct ProcessorSet {
    recovery: RecoveryProcessor,
    injury: InjuryProcessor,
    therapy: TherapyProcessor,
    stats: StatProcessor,
    profile: ProfileProcessor,
    feedback: FeedbackProcessor,
    linking: LinkProcessor,
}

impl ProcessorSet {
    /// Build the table with its collaborators.
    pub fn new(notifier: Arc<dyn Notifier>, config: &CoreConfig) -> Self {
        Self {
            recovery: RecoveryProcessor::new(notifier, config),
            injury: InjuryProcessor,
            therapy: TherapyProcessor,
            stats: StatProcessor,
            profile: ProfileProcessor,
            feedback: FeedbackProcessor,
            linking: LinkProcessor,
        }
    }

    /// The processor for a kind, or `None` for kinds that are published
    /// but never ingested.
    pub fn for_kind(&self, kind: DataKind) -> Option<&dyn Processor> {
        match kind {
            DataKind::RecoveryMetrics => Some(&self.recovery),
            DataKind::InjuryUpdate | DataKind::InjuryResolved => Some(&self.injury),
            DataKind::TherapySession => Some(&self.therapy),
            DataKind::StatUpdate => Some(&self.stats),
            DataKind::ProfileUpdate => Some(&self.profile),
            DataKind::AiFeedback => Some(&self.feedback),
            DataKind::LinkRequest => Some(&self.linking),
            DataKind::PlanGenerated => None,
        }
    }
}
