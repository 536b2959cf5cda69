//! Typed ingestion payloads.
//!
//! Wire payloads arrive as JSON and are decoded into the variant matching
//! their data kind before dispatch. A payload that fails to decode is
//! treated like an unknown kind: logged and skipped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::athletes::{Injury, PerformanceStat, StaffRef, TherapyEntry};

use super::DataKind;

/// A recovery check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryPayload {
    /// Target athlete
    pub athlete_id: Uuid,
    /// Check-in date; defaults to today when omitted
    pub date: Option<NaiveDate>,
    /// Session load
    pub load: f64,
    /// Reported pain 0-10
    pub pain: u8,
    /// RPE 0-10, if reported
    pub rpe: Option<u8>,
    /// Sleep quality 0-10, if reported
    pub sleep_quality: Option<u8>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// An injury report or update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryPayload {
    /// Target athlete
    pub athlete_id: Uuid,
    /// Injury to upsert, matched by id
    pub injury: Injury,
}

/// An injury resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryResolvedPayload {
    /// Target athlete
    pub athlete_id: Uuid,
    /// Injury being resolved
    pub injury_id: Uuid,
}

/// A therapy session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapyPayload {
    /// Target athlete
    pub athlete_id: Uuid,
    /// Entry to prepend to the therapy log
    pub entry: TherapyEntry,
}

/// A performance stat upsert or removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatPayload {
    /// Target athlete
    pub athlete_id: Uuid,
    /// When true, the stat is removed instead of upserted
    #[serde(default)]
    pub remove: bool,
    /// The stat, matched by id
    pub stat: PerformanceStat,
}

/// A shallow profile merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePayload {
    /// Target athlete
    pub athlete_id: Uuid,
    /// New display name, if changing
    pub name: Option<String>,
    /// New primary sport, if changing
    pub sport: Option<String>,
    /// New age, if changing
    pub age: Option<u8>,
}

/// Human feedback on AI output. Recorded, never mutates the athlete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackPayload {
    /// Target athlete
    pub athlete_id: Uuid,
    /// What the feedback is about (plan id, message id, ...)
    pub subject: String,
    /// Thumbs up or down
    pub helpful: bool,
    /// Free-form comments
    pub comments: Option<String>,
}

/// Link-request state machine actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkAction {
    Send,
    Accept,
    Reject,
    Unlink,
}

/// A staff-athlete link action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkPayload {
    /// Target athlete
    pub athlete_id: Uuid,
    /// Action to apply
    pub action: LinkAction,
    /// Request being decided; required for accept and reject
    pub request_id: Option<Uuid>,
    /// Requesting staff member; required for send
    pub staff: Option<StaffRef>,
    /// Staff member to unlink; required for unlink
    pub staff_id: Option<Uuid>,
}

/// A decoded ingestion payload.
#[derive(Debug, Clone)]
pub enum IngestPayload {
    Recovery(RecoveryPayload),
    Injury(InjuryPayload),
    InjuryResolved(InjuryResolvedPayload),
    Therapy(TherapyPayload),
    Stat(StatPayload),
    Profile(ProfilePayload),
    Feedback(FeedbackPayload),
    Link(LinkPayload),
}

impl IngestPayload {
    /// Decode a wire payload for a data kind. Returns `None` for kinds
    /// that carry no ingestable payload.
    pub fn decode(kind: DataKind, value: Value) -> Result<Option<Self>, serde_json::Error> {
        let payload = match kind {
            DataKind::RecoveryMetrics => IngestPayload::Recovery(serde_json::from_value(value)?),
            DataKind::InjuryUpdate => IngestPayload::Injury(serde_json::from_value(value)?),
            DataKind::InjuryResolved => {
                IngestPayload::InjuryResolved(serde_json::from_value(value)?)
            }
            DataKind::TherapySession => IngestPayload::Therapy(serde_json::from_value(value)?),
            DataKind::StatUpdate => IngestPayload::Stat(serde_json::from_value(value)?),
            DataKind::ProfileUpdate => IngestPayload::Profile(serde_json::from_value(value)?),
            DataKind::AiFeedback => IngestPayload::Feedback(serde_json::from_value(value)?),
            DataKind::LinkRequest => IngestPayload::Link(serde_json::from_value(value)?),
            DataKind::PlanGenerated => return Ok(None),
        };
        Ok(Some(payload))
    }

    /// The athlete this payload targets.
    pub fn athlete_id(&self) -> Uuid {
        match self {
            IngestPayload::Recovery(p) => p.athlete_id,
            IngestPayload::Injury(p) => p.athlete_id,
            IngestPayload::InjuryResolved(p) => p.athlete_id,
            IngestPayload::Therapy(p) => p.athlete_id,
            IngestPayload::Stat(p) => p.athlete_id,
            IngestPayload::Profile(p) => p.athlete_id,
            IngestPayload::Feedback(p) => p.athlete_id,
            IngestPayload::Link(p) => p.athlete_id,
        }
    }
}
