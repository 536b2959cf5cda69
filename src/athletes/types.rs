//! Athlete aggregate types and enums.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum daily-log entries retained on the aggregate.
pub const DAILY_LOG_RETENTION: usize = 60;

/// Derived athlete risk status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AthleteStatus {
    /// Training normally, no elevated risk markers
    #[default]
    Optimal,
    /// Elevated markers, monitor closely
    Caution,
    /// Acute risk, high-intensity work should be gated
    HighRisk,
}

impl AthleteStatus {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            AthleteStatus::Optimal => "Optimal",
            AthleteStatus::Caution => "Caution",
            AthleteStatus::HighRisk => "High Risk",
        }
    }
}

impl std::fmt::Display for AthleteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Direction of the heart-rate-variability trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrvTrend {
    Rising,
    #[default]
    Stable,
    Falling,
}

impl HrvTrend {
    /// Classify the trend from consecutive HRV values.
    pub fn from_delta(previous: f64, current: f64) -> Self {
        let delta = current - previous;
        if delta > 1.0 {
            HrvTrend::Rising
        } else if delta < -1.0 {
            HrvTrend::Falling
        } else {
            HrvTrend::Stable
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            HrvTrend::Rising => "Rising",
            HrvTrend::Stable => "Stable",
            HrvTrend::Falling => "Falling",
        }
    }
}

impl std::fmt::Display for HrvTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Caller role, used to scope cache refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// An athlete sees only their own record
    #[default]
    Athlete,
    /// Coaches see every athlete on their roster
    Coach,
    /// Admins see everything
    Admin,
}

impl Role {
    /// Whether this role loads the full athlete roster on refresh.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Coach | Role::Admin)
    }
}

/// Status of a reported injury.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryStatus {
    /// Injury is current and limits training
    Active,
    /// Cleared for progressive return
    Recovering,
    /// No longer a factor
    Resolved,
}

/// A reported injury.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Injury {
    /// Unique identifier
    pub id: Uuid,
    /// Affected body part or short description
    pub body_part: String,
    /// Severity 0-5 (severity > 2 forces high-risk status while active)
    pub severity: u8,
    /// Current status
    pub status: InjuryStatus,
    /// When the injury was reported
    pub reported_at: DateTime<Utc>,
    /// When the injury was resolved, if it was
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Injury {
    /// Whether this injury alone forces high-risk status.
    pub fn is_blocking(&self) -> bool {
        self.status == InjuryStatus::Active && self.severity > 2
    }
}

/// One entry in the therapy log. Newest entries are prepended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapyEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Treating practitioner, if recorded
    pub therapist: Option<String>,
    /// Treatment modality (massage, physio, cryo, ...)
    pub modality: String,
    /// Session notes
    pub notes: String,
    /// When the session took place
    pub performed_at: DateTime<Utc>,
}

/// A scheduled competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competition {
    /// Unique identifier
    pub id: Uuid,
    /// Competition name
    pub name: String,
    /// Competition date
    pub date: NaiveDate,
    /// Venue or location, if known
    pub location: Option<String>,
}

/// A recorded performance result for one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceStat {
    /// Unique identifier
    pub id: Uuid,
    /// Event name (e.g. "100m", "clean & jerk")
    pub event: String,
    /// Result value
    pub value: f64,
    /// Unit of the value (s, kg, m, ...)
    pub unit: String,
    /// Whether this is the athlete's personal best for the event.
    /// Invariant: at most one PB per event name.
    pub is_pb: bool,
    /// When the result was recorded
    pub recorded_at: DateTime<Utc>,
}

/// A daily wellness check-in. One entry per calendar date, most recent wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLogEntry {
    /// Calendar date of the check-in
    pub date: NaiveDate,
    /// Reported pain 0-10
    pub pain: u8,
    /// Rate of perceived exertion 0-10, if reported
    pub rpe: Option<u8>,
    /// Sleep quality 0-10, if reported
    pub sleep_quality: Option<u8>,
    /// Session load recorded with the check-in
    pub load: f64,
    /// Free-form notes
    pub notes: Option<String>,
}

/// A technique analysis record, typically produced from video review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Technical score 0-10
    pub technical_score: f64,
    /// Short analysis summary
    pub summary: String,
    /// Raw analysis payload. Bulky; stripped first when a document
    /// approaches the store size limit.
    pub raw_payload: Option<serde_json::Value>,
    /// When the analysis was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Staff role for linked coaches and practitioners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Coach,
    Physio,
    Nutritionist,
}

impl StaffRole {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            StaffRole::Coach => "Coach",
            StaffRole::Physio => "Physiotherapist",
            StaffRole::Nutritionist => "Nutritionist",
        }
    }
}

/// Reference to a staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRef {
    /// Staff member's identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Their role
    pub role: StaffRole,
}

/// Status of a staff-athlete link request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A pending or decided staff-athlete link request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRequest {
    /// Unique identifier
    pub id: Uuid,
    /// Requesting staff member
    pub staff: StaffRef,
    /// Current status
    pub status: LinkRequestStatus,
    /// When the request was sent
    pub requested_at: DateTime<Utc>,
}

/// Athlete aggregate root.
///
/// Mutated exclusively by ingestion processors; cached copies handed out by
/// the orchestrator are read-only snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Primary sport, if recorded
    pub sport: Option<String>,
    /// Age in years, if recorded
    pub age: Option<u8>,
    /// Derived risk status
    pub status: AthleteStatus,
    /// Current acute:chronic load ratio
    pub load_ratio: f64,
    /// Readiness score 0-100
    pub readiness: u8,
    /// Heart-rate variability in ms
    pub hrv: f64,
    /// HRV trend direction
    pub hrv_trend: HrvTrend,
    /// Daily loads, oldest first
    pub load_history: Vec<f64>,
    /// Reported injuries
    pub injuries: Vec<Injury>,
    /// Therapy log, newest first
    pub therapy_log: Vec<TherapyEntry>,
    /// Scheduled competitions
    pub competitions: Vec<Competition>,
    /// Performance results
    pub performance_stats: Vec<PerformanceStat>,
    /// Daily check-ins, one per date, oldest first
    pub daily_logs: Vec<DailyLogEntry>,
    /// Technique analysis history, oldest first
    pub analysis_history: Vec<AnalysisRecord>,
    /// Staff link requests
    pub pending_requests: Vec<LinkRequest>,
    /// Linked staff
    pub assigned_staff: Vec<StaffRef>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Athlete {
    /// Create a new athlete with neutral baseline values.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sport: None,
            age: None,
            status: AthleteStatus::Optimal,
            load_ratio: 1.0,
            readiness: 100,
            hrv: 65.0,
            hrv_trend: HrvTrend::Stable,
            load_history: Vec::new(),
            injuries: Vec::new(),
            therapy_log: Vec::new(),
            competitions: Vec::new(),
            performance_stats: Vec::new(),
            daily_logs: Vec::new(),
            analysis_history: Vec::new(),
            pending_requests: Vec::new(),
            assigned_staff: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Whether any active injury forces high-risk status.
    pub fn has_blocking_injury(&self) -> bool {
        self.injuries.iter().any(Injury::is_blocking)
    }

    /// Insert or replace the daily log for `entry.date`, keeping entries
    /// date-ordered and trimming to the retention window.
    pub fn upsert_daily_log(&mut self, entry: DailyLogEntry) {
        self.daily_logs.retain(|e| e.date != entry.date);
        self.daily_logs.push(entry);
        self.daily_logs.sort_by_key(|e| e.date);
        if self.daily_logs.len() > DAILY_LOG_RETENTION {
            let excess = self.daily_logs.len() - DAILY_LOG_RETENTION;
            self.daily_logs.drain(..excess);
        }
    }

    /// Today's daily log entry, if any.
    pub fn daily_log_for(&self, date: NaiveDate) -> Option<&DailyLogEntry> {
        self.daily_logs.iter().find(|e| e.date == date)
    }

    /// Strip bulky analysis payloads. Used when the serialized document
    /// approaches the store size limit.
    pub fn offload_bulky_payloads(&mut self) -> usize {
        let mut stripped = 0;
        for record in &mut self.analysis_history {
            if record.raw_payload.take().is_some() {
                stripped += 1;
            }
        }
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_daily_log_same_date_wins() {
        let mut athlete = Athlete::new("Jo");
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        athlete.upsert_daily_log(DailyLogEntry {
            date,
            pain: 1,
            rpe: Some(4),
            sleep_quality: Some(7),
            load: 300.0,
            notes: None,
        });
        athlete.upsert_daily_log(DailyLogEntry {
            date,
            pain: 3,
            rpe: Some(6),
            sleep_quality: Some(5),
            load: 450.0,
            notes: Some("evening session".into()),
        });

        assert_eq!(athlete.daily_logs.len(), 1);
        assert_eq!(athlete.daily_logs[0].pain, 3);
        assert_eq!(athlete.daily_logs[0].load, 450.0);
    }

    #[test]
    fn test_daily_log_retention_window() {
        let mut athlete = Athlete::new("Jo");
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        for offset in 0..70 {
            athlete.upsert_daily_log(DailyLogEntry {
                date: start + chrono::Duration::days(offset),
                pain: 0,
                rpe: None,
                sleep_quality: None,
                load: 100.0,
                notes: None,
            });
        }

        assert_eq!(athlete.daily_logs.len(), DAILY_LOG_RETENTION);
        // Oldest entries were dropped
        assert_eq!(
            athlete.daily_logs[0].date,
            start + chrono::Duration::days(10)
        );
    }

    #[test]
    fn test_blocking_injury_detection() {
        let mut athlete = Athlete::new("Jo");
        assert!(!athlete.has_blocking_injury());

        athlete.injuries.push(Injury {
            id: Uuid::new_v4(),
            body_part: "hamstring".into(),
            severity: 3,
            status: InjuryStatus::Active,
            reported_at: Utc::now(),
            resolved_at: None,
        });
        assert!(athlete.has_blocking_injury());

        athlete.injuries[0].status = InjuryStatus::Resolved;
        assert!(!athlete.has_blocking_injury());
    }

    #[test]
    fn test_offload_strips_raw_payloads() {
        let mut athlete = Athlete::new("Jo");
        athlete.analysis_history.push(AnalysisRecord {
            id: Uuid::new_v4(),
            technical_score: 7.5,
            summary: "solid hip drive".into(),
            raw_payload: Some(serde_json::json!({"frames": [1, 2, 3]})),
            recorded_at: Utc::now(),
        });

        assert_eq!(athlete.offload_bulky_payloads(), 1);
        assert!(athlete.analysis_history[0].raw_payload.is_none());
        // Idempotent
        assert_eq!(athlete.offload_bulky_payloads(), 0);
    }

    #[test]
    fn test_hrv_trend_from_delta() {
        assert_eq!(HrvTrend::from_delta(60.0, 63.0), HrvTrend::Rising);
        assert_eq!(HrvTrend::from_delta(60.0, 60.5), HrvTrend::Stable);
        assert_eq!(HrvTrend::from_delta(60.0, 52.0), HrvTrend::Falling);
    }
}
