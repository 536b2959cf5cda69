//! Athlete domain model.
//!
//! The aggregate root ([`Athlete`]) plus the weekly plan and the
//! season-level types used during context assembly.

pub mod memory;
pub mod plan;
pub mod types;

pub use memory::{Macrocycle, MacrocyclePhase, WeeklySummary};
pub use plan::{
    DayOfWeek, SessionStatus, SessionSubPhase, SessionType, TrainingPhase, TrainingSession,
    WeeklyPlan,
};
pub use types::{
    AnalysisRecord, Athlete, AthleteStatus, Competition, DailyLogEntry, HrvTrend, Injury,
    InjuryStatus, LinkRequest, LinkRequestStatus, PerformanceStat, Role, StaffRef, StaffRole,
    TherapyEntry, DAILY_LOG_RETENTION,
};
