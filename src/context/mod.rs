//! Context snapshot assembly.
//!
//! A snapshot is the fully-assembled view of one athlete handed to the rule
//! engine and every AI call. It is rebuilt from source data on every use and
//! never cached: rule evaluation must see current state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::athletes::{
    AnalysisRecord, Athlete, DayOfWeek, Macrocycle, TrainingPhase, WeeklyPlan, WeeklySummary,
};

/// Feedback entries carried into a snapshot.
pub const FEEDBACK_LIMIT: usize = 3;

/// How much recorded data backs this athlete's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilingLevel {
    /// Little recorded history; treat derived signals with care
    Baseline,
    /// Enough history for trend work
    Developing,
    /// Rich history; derived signals are dependable
    Established,
}

impl ProfilingLevel {
    /// Classify from the number of recorded data points.
    pub fn from_data_points(count: usize) -> Self {
        if count < 10 {
            ProfilingLevel::Baseline
        } else if count < 30 {
            ProfilingLevel::Developing
        } else {
            ProfilingLevel::Established
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            ProfilingLevel::Baseline => "Baseline",
            ProfilingLevel::Developing => "Developing",
            ProfilingLevel::Established => "Established",
        }
    }
}

/// Direction of the athlete's technical scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalTrend {
    /// Not enough analyses to call a direction
    Unknown,
    Improving,
    Stable,
    Declining,
}

impl TechnicalTrend {
    /// Classify from the analysis history, oldest first.
    ///
    /// Compares the mean technical score of the three most recent analyses
    /// against the three before them; a half-point band counts as stable.
    pub fn classify(history: &[AnalysisRecord]) -> Self {
        let recent_start = history.len().saturating_sub(3);
        let recent = &history[recent_start..];
        let prior_start = recent_start.saturating_sub(3);
        let prior = &history[prior_start..recent_start];

        if recent.is_empty() || prior.is_empty() {
            return TechnicalTrend::Unknown;
        }

        let delta = mean_score(recent) - mean_score(prior);
        if delta > 0.5 {
            TechnicalTrend::Improving
        } else if delta < -0.5 {
            TechnicalTrend::Declining
        } else {
            TechnicalTrend::Stable
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            TechnicalTrend::Unknown => "Unknown",
            TechnicalTrend::Improving => "Improving",
            TechnicalTrend::Stable => "Stable",
            TechnicalTrend::Declining => "Declining",
        }
    }
}

fn mean_score(records: &[AnalysisRecord]) -> f64 {
    records.iter().map(|r| r.technical_score).sum::<f64>() / records.len() as f64
}

/// Athlete feedback from one completed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFeedback {
    /// Session day
    pub day: DayOfWeek,
    /// Session title
    pub title: String,
    /// What the athlete reported
    pub feedback: String,
}

/// An ephemeral, fully-assembled view of one athlete.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
    /// The athlete record
    pub athlete: Athlete,
    /// Their current plan, if one exists
    pub plan: Option<WeeklyPlan>,
    /// Training phase for generation (the plan's phase, falling back to
    /// the macrocycle block containing today, then pre-season)
    pub phase: TrainingPhase,
    /// Rolling weekly summaries, oldest first
    pub memory: Vec<WeeklySummary>,
    /// Season macrocycle, if one exists
    pub macrocycle: Option<Macrocycle>,
    /// Data richness classification
    pub profiling_level: ProfilingLevel,
    /// Technical score direction
    pub technical_trend: TechnicalTrend,
    /// Most recent session feedback, newest first
    pub recent_feedback: Vec<SessionFeedback>,
    /// When the snapshot was built
    pub assembled_at: DateTime<Utc>,
}

impl ContextSnapshot {
    /// Build a snapshot from source data.
    pub fn assemble(
        athlete: Athlete,
        plan: Option<WeeklyPlan>,
        memory: Vec<WeeklySummary>,
        macrocycle: Option<Macrocycle>,
    ) -> Self {
        let data_points =
            athlete.daily_logs.len() + athlete.performance_stats.len() + athlete.analysis_history.len();
        let profiling_level = ProfilingLevel::from_data_points(data_points);
        let technical_trend = TechnicalTrend::classify(&athlete.analysis_history);

        let recent_feedback = plan
            .as_ref()
            .map(|p| {
                p.recent_feedback(FEEDBACK_LIMIT)
                    .into_iter()
                    .filter_map(|s| {
                        s.feedback.as_ref().map(|feedback| SessionFeedback {
                            day: s.day,
                            title: s.title.clone(),
                            feedback: feedback.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let today = Utc::now().date_naive();
        let phase = plan
            .as_ref()
            .map(|p| p.phase)
            .or_else(|| {
                macrocycle
                    .as_ref()
                    .and_then(|m| m.phase_on(today))
                    .map(|block| block.phase)
            })
            .unwrap_or(TrainingPhase::PreSeason);

        Self {
            athlete,
            plan,
            phase,
            memory,
            macrocycle,
            profiling_level,
            technical_trend,
            recent_feedback,
            assembled_at: Utc::now(),
        }
    }

    /// Short text description used as context for vision analysis.
    pub fn summary_line(&self) -> String {
        format!(
            "{} | status: {} | load ratio: {:.2} | trend: {} | phase: {}",
            self.athlete.name,
            self.athlete.status,
            self.athlete.load_ratio,
            self.technical_trend.label(),
            self.phase
        )
    }
}
