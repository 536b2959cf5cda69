//! Long-term memory and macrocycle types used in context assembly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::TrainingPhase;

/// A rolling weekly summary kept in the rule engine's long-term memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    /// Monday of the summarized week
    pub week_start: NaiveDate,
    /// One-paragraph summary of the week
    pub summary: String,
}

/// One phase block of a macrocycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacrocyclePhase {
    /// Phase kind
    pub phase: TrainingPhase,
    /// Phase start date
    pub start: NaiveDate,
    /// Phase end date
    pub end: NaiveDate,
    /// Training focus for the block
    pub focus: String,
}

/// A season-level training macrocycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Macrocycle {
    /// Owning athlete
    pub athlete_id: Uuid,
    /// Season title
    pub title: String,
    /// Ordered phase blocks
    pub phases: Vec<MacrocyclePhase>,
}

impl Macrocycle {
    /// The phase block containing `date`, if any.
    pub fn phase_on(&self, date: NaiveDate) -> Option<&MacrocyclePhase> {
        self.phases
            .iter()
            .find(|p| p.start <= date && date <= p.end)
    }
}
