//! Durable store contract, schema validation and document encoding.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::ai::ChatMessage;
use crate::athletes::{Athlete, Macrocycle, WeeklyPlan};
use crate::metrics::RATIO_CAP;

/// Default serialized-document size limit in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 1_000_000;

/// Errors from the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document failed schema validation
    #[error("document validation failed: {0}")]
    Validation(String),

    /// Serialized document exceeds the size limit even after offload
    #[error("document too large: {bytes} bytes (limit {limit})")]
    DocumentTooLarge { bytes: usize, limit: usize },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Document-store contract for athlete state.
///
/// Writes are schema-validated before persistence. `update_athlete`
/// enforces the document size limit: on breach the implementation strips
/// bulky analysis payloads and retries once before failing with
/// [`StoreError::DocumentTooLarge`].
#[async_trait]
pub trait AthleteStore: Send + Sync {
    /// Fetch one athlete.
    async fn athlete(&self, id: Uuid) -> Result<Option<Athlete>, StoreError>;

    /// Fetch every athlete.
    async fn all_athletes(&self) -> Result<Vec<Athlete>, StoreError>;

    /// Persist an athlete document.
    async fn update_athlete(&self, athlete: &Athlete) -> Result<(), StoreError>;

    /// Fetch an athlete's current weekly plan.
    async fn weekly_plan(&self, athlete_id: Uuid) -> Result<Option<WeeklyPlan>, StoreError>;

    /// Persist a weekly plan, replacing the athlete's previous one.
    async fn update_weekly_plan(&self, plan: &WeeklyPlan) -> Result<(), StoreError>;

    /// Fetch an athlete's macrocycle.
    async fn macrocycle(&self, athlete_id: Uuid) -> Result<Option<Macrocycle>, StoreError>;

    /// Persist an athlete's macrocycle.
    async fn save_macrocycle(
        &self,
        athlete_id: Uuid,
        cycle: &Macrocycle,
    ) -> Result<(), StoreError>;

    /// Append a chat message to an athlete's conversation log.
    async fn save_chat_message(
        &self,
        athlete_id: Uuid,
        message: &ChatMessage,
    ) -> Result<(), StoreError>;
}

/// Validate an athlete document before persistence.
pub fn validate_athlete(athlete: &Athlete) -> Result<(), StoreError> {
    if athlete.id.is_nil() {
        return Err(StoreError::Validation("athlete id must be set".into()));
    }
    if athlete.name.trim().is_empty() {
        return Err(StoreError::Validation("athlete name must not be empty".into()));
    }
    if !athlete.load_ratio.is_finite() || athlete.load_ratio < 0.0 || athlete.load_ratio > RATIO_CAP
    {
        return Err(StoreError::Validation(format!(
            "load ratio out of range: {}",
            athlete.load_ratio
        )));
    }
    if !athlete.hrv.is_finite() || athlete.hrv < 0.0 {
        return Err(StoreError::Validation(format!("invalid hrv: {}", athlete.hrv)));
    }
    if athlete.load_history.iter().any(|l| !l.is_finite() || *l < 0.0) {
        return Err(StoreError::Validation("load history contains invalid values".into()));
    }
    for log in &athlete.daily_logs {
        if log.pain > 10
            || log.rpe.is_some_and(|r| r > 10)
            || log.sleep_quality.is_some_and(|s| s > 10)
        {
            return Err(StoreError::Validation(format!(
                "daily log for {} has out-of-range scores",
                log.date
            )));
        }
    }
    for injury in &athlete.injuries {
        if injury.severity > 5 {
            return Err(StoreError::Validation(format!(
                "injury severity out of range: {}",
                injury.severity
            )));
        }
    }
    Ok(())
}

/// Validate a weekly plan document before persistence.
pub fn validate_plan(plan: &WeeklyPlan) -> Result<(), StoreError> {
    if plan.athlete_id.is_nil() {
        return Err(StoreError::Validation("plan athlete id must be set".into()));
    }
    for session in &plan.sessions {
        if !(1..=5).contains(&session.zone) {
            return Err(StoreError::Validation(format!(
                "session '{}' has zone {} outside 1-5",
                session.title, session.zone
            )));
        }
        for block in &session.sub_phases {
            if !(1..=5).contains(&block.zone) {
                return Err(StoreError::Validation(format!(
                    "block '{}' has zone {} outside 1-5",
                    block.name, block.zone
                )));
            }
        }
    }
    Ok(())
}

/// Validate a macrocycle document before persistence.
pub fn validate_macrocycle(cycle: &Macrocycle) -> Result<(), StoreError> {
    if cycle.athlete_id.is_nil() {
        return Err(StoreError::Validation("macrocycle athlete id must be set".into()));
    }
    for phase in &cycle.phases {
        if phase.start > phase.end {
            return Err(StoreError::Validation(format!(
                "macrocycle phase '{}' ends before it starts",
                phase.focus
            )));
        }
    }
    Ok(())
}

/// Validate a chat message before persistence.
pub fn validate_chat_message(message: &ChatMessage) -> Result<(), StoreError> {
    if message.content.trim().is_empty() {
        return Err(StoreError::Validation("chat message must not be empty".into()));
    }
    Ok(())
}

/// Serialize an athlete for persistence, enforcing the size limit.
///
/// On breach, bulky analysis payloads are stripped from a copy and the
/// encode is retried once before failing.
pub fn encode_athlete_document(athlete: &Athlete, limit: usize) -> Result<String, StoreError> {
    let encoded = serde_json::to_string(athlete)?;
    if encoded.len() <= limit {
        return Ok(encoded);
    }

    let mut slim = athlete.clone();
    let stripped = slim.offload_bulky_payloads();
    let retried = serde_json::to_string(&slim)?;
    if retried.len() <= limit {
        tracing::warn!(
            athlete_id = %athlete.id,
            stripped,
            bytes = encoded.len(),
            "document over size limit; persisted with offloaded payloads"
        );
        return Ok(retried);
    }

    Err(StoreError::DocumentTooLarge {
        bytes: retried.len(),
        limit,
    })
}
