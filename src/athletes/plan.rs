//! Weekly training plan types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macrocycle phase a weekly plan belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPhase {
    /// General preparation, building volume
    PreSeason,
    /// In-season, maintaining sharpness
    Competitive,
    /// Between seasons, unloading
    Transition,
    /// Pre-competition load reduction
    Tapering,
}

impl TrainingPhase {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            TrainingPhase::PreSeason => "Pre-Season",
            TrainingPhase::Competitive => "Competitive",
            TrainingPhase::Transition => "Transition",
            TrainingPhase::Tapering => "Tapering",
        }
    }
}

impl std::fmt::Display for TrainingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Day a session is scheduled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days in week order.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Kind of training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    Endurance,
    HighIntensity,
    Strength,
    Technique,
    Recovery,
    Rest,
}

impl SessionType {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Endurance => "Endurance",
            SessionType::HighIntensity => "High Intensity",
            SessionType::Strength => "Strength",
            SessionType::Technique => "Technique",
            SessionType::Recovery => "Recovery",
            SessionType::Rest => "Rest",
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Execution status of a planned session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Scheduled, not yet done
    #[default]
    Planned,
    /// Done as planned
    Completed,
    /// Deliberately skipped
    Skipped,
}

/// A structured block within a session (warmup, main set, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSubPhase {
    /// Block name
    pub name: String,
    /// Block duration in minutes
    pub minutes: u16,
    /// Intensity zone 1-5 for the block
    pub zone: u8,
}

/// One training session within a weekly plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Unique identifier
    pub id: Uuid,
    /// Scheduled day
    pub day: DayOfWeek,
    /// Session title for display
    pub title: String,
    /// Session kind
    pub session_type: SessionType,
    /// Intensity zone 1-5
    pub zone: u8,
    /// Execution status
    pub status: SessionStatus,
    /// Structured blocks, if the session is structured
    pub sub_phases: Vec<SessionSubPhase>,
    /// Athlete feedback after completion
    pub feedback: Option<String>,
    /// When the session was completed, if it was
    pub completed_at: Option<DateTime<Utc>>,
}

impl TrainingSession {
    /// Whether this session counts as high intensity for safety gating.
    pub fn is_high_intensity(&self) -> bool {
        self.zone >= 4 || self.session_type == SessionType::HighIntensity
    }
}

/// A weekly training plan. At most one plan per athlete is live at a time;
/// regeneration replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyPlan {
    /// Unique identifier
    pub id: Uuid,
    /// Owning athlete
    pub athlete_id: Uuid,
    /// Training phase this week sits in
    pub phase: TrainingPhase,
    /// Sessions in day order
    pub sessions: Vec<TrainingSession>,
    /// When the plan was generated
    pub generated_at: DateTime<Utc>,
}

impl WeeklyPlan {
    /// Create an empty plan for an athlete.
    pub fn new(athlete_id: Uuid, phase: TrainingPhase) -> Self {
        Self {
            id: Uuid::new_v4(),
            athlete_id,
            phase,
            sessions: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    /// Whether any still-planned session is high intensity.
    pub fn has_planned_high_intensity(&self) -> bool {
        self.sessions
            .iter()
            .any(|s| s.status == SessionStatus::Planned && s.is_high_intensity())
    }

    /// Completed sessions carrying athlete feedback, most recent first,
    /// capped at `limit`.
    pub fn recent_feedback(&self, limit: usize) -> Vec<&TrainingSession> {
        let mut completed: Vec<&TrainingSession> = self
            .sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Completed && s.feedback.is_some())
            .collect();
        completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        completed.truncate(limit);
        completed
    }
}
