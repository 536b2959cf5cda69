//! Safety rule catalog.
//!
//! A rule is data: a condition over the context snapshot, a knowledge
//! keyword that must appear in the retrieved text, and an alert template.
//! The engine iterates the catalog; adding a rule means adding an entry,
//! not another branch.

use crate::context::ContextSnapshot;
use crate::knowledge::LOAD_RATIO_KEYWORD;

/// One safety rule.
#[derive(Debug, Clone)]
pub struct SafetyRule {
    /// Stable rule name, used in logs
    pub name: &'static str,
    /// Lowercase keyword that must appear in the retrieved knowledge for
    /// the rule to fire
    pub required_knowledge: &'static str,
    /// Condition over the assembled context
    pub condition: fn(&ContextSnapshot) -> bool,
    /// Alert message template
    pub message: fn(&ContextSnapshot) -> String,
}

/// The built-in catalog.
pub fn default_rules() -> Vec<SafetyRule> {
    vec![high_intensity_gate()]
}

/// The high-intensity gate: a high-risk athlete with high-intensity work
/// still planned, confirmed by retrieved load-management knowledge.
pub fn high_intensity_gate() -> SafetyRule {
    SafetyRule {
        name: "high-intensity-gate",
        required_knowledge: LOAD_RATIO_KEYWORD,
        condition: |ctx| {
            ctx.athlete.status == crate::athletes::AthleteStatus::HighRisk
                && ctx
                    .plan
                    .as_ref()
                    .is_some_and(|plan| plan.has_planned_high_intensity())
        },
        message: |ctx| {
            format!(
                "{} is high risk (load ratio {:.2}) with high-intensity work still planned. \
                 Withhold zone 4+ sessions until risk markers normalize.",
                ctx.athlete.name, ctx.athlete.load_ratio
            )
        },
    }
}
