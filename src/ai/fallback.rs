//! Deterministic fallbacks for provider outages.
//!
//! The fallback planner builds a phase-appropriate week from fixed
//! templates, then bends it to the athlete's risk status. Same context in,
//! same plan out.

use uuid::Uuid;

use crate::athletes::{
    AthleteStatus, DayOfWeek, SessionStatus, SessionSubPhase, SessionType, TrainingPhase,
    TrainingSession, WeeklyPlan,
};
use crate::context::ContextSnapshot;

use super::provider::AgentMessage;

/// Rule-based weekly plan generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackPlanner;

impl FallbackPlanner {
    /// Build a plan for the snapshot's phase and status.
    pub fn generate(&self, ctx: &ContextSnapshot) -> WeeklyPlan {
        let mut plan = WeeklyPlan::new(ctx.athlete.id, ctx.phase);

        for (day, (session_type, zone)) in DayOfWeek::ALL.into_iter().zip(phase_template(ctx.phase))
        {
            let (session_type, zone) = adjust_for_status(ctx.athlete.status, session_type, zone);
            plan.sessions.push(build_session(day, session_type, zone));
        }

        plan
    }
}

/// Base week per training phase: one (type, zone) pair per day Mon-Sun.
fn phase_template(phase: TrainingPhase) -> [(SessionType, u8); 7] {
    match phase {
        TrainingPhase::PreSeason => [
            (SessionType::Endurance, 3),
            (SessionType::Strength, 3),
            (SessionType::Endurance, 2),
            (SessionType::HighIntensity, 4),
            (SessionType::Technique, 2),
            (SessionType::Endurance, 3),
            (SessionType::Rest, 1),
        ],
        TrainingPhase::Competitive => [
            (SessionType::HighIntensity, 4),
            (SessionType::Technique, 2),
            (SessionType::Endurance, 2),
            (SessionType::HighIntensity, 5),
            (SessionType::Recovery, 1),
            (SessionType::Endurance, 3),
            (SessionType::Rest, 1),
        ],
        TrainingPhase::Transition => [
            (SessionType::Recovery, 1),
            (SessionType::Endurance, 2),
            (SessionType::Rest, 1),
            (SessionType::Technique, 2),
            (SessionType::Endurance, 2),
            (SessionType::Recovery, 1),
            (SessionType::Rest, 1),
        ],
        TrainingPhase::Tapering => [
            (SessionType::Technique, 2),
            (SessionType::HighIntensity, 4),
            (SessionType::Recovery, 1),
            (SessionType::Technique, 2),
            (SessionType::Recovery, 1),
            (SessionType::Endurance, 2),
            (SessionType::Rest, 1),
        ],
    }
}

/// Bend a template entry to the athlete's risk status.
fn adjust_for_status(
    status: AthleteStatus,
    session_type: SessionType,
    zone: u8,
) -> (SessionType, u8) {
    match status {
        AthleteStatus::Optimal => (session_type, zone),
        AthleteStatus::Caution => {
            if session_type == SessionType::HighIntensity {
                (SessionType::Endurance, zone.min(3))
            } else {
                (session_type, zone.min(3))
            }
        }
        AthleteStatus::HighRisk => {
            if zone >= 3 || session_type == SessionType::HighIntensity {
                (SessionType::Recovery, 1)
            } else {
                (session_type, zone.min(2))
            }
        }
    }
}

fn build_session(day: DayOfWeek, session_type: SessionType, zone: u8) -> TrainingSession {
    let sub_phases = if session_type == SessionType::HighIntensity {
        vec![
            SessionSubPhase {
                name: "Warmup".into(),
                minutes: 15,
                zone: 1,
            },
            SessionSubPhase {
                name: "Main set".into(),
                minutes: 30,
                zone,
            },
            SessionSubPhase {
                name: "Cooldown".into(),
                minutes: 10,
                zone: 1,
            },
        ]
    } else {
        Vec::new()
    };

    TrainingSession {
        id: Uuid::new_v4(),
        day,
        title: format!("{} (zone {})", session_type.label(), zone),
        session_type,
        zone,
        status: SessionStatus::Planned,
        sub_phases,
        feedback: None,
        completed_at: None,
    }
}

/// Templated critic debate used when the provider is unavailable.
pub fn critic_fallback(topic: &str, knowledge: &str) -> Vec<AgentMessage> {
    let first_source = knowledge
        .lines()
        .find(|line| line.starts_with("[SOURCE:"))
        .unwrap_or("[SOURCE: first principles]");

    vec![
        AgentMessage {
            agent: "planner".into(),
            content: format!(
                "Proposal on {}: keep the current structure and progress load by no more \
                 than 10% week over week.",
                topic
            ),
        },
        AgentMessage {
            agent: "risk-reviewer".into(),
            content: format!(
                "Challenge: verify the proposal against {}. Any planned high-intensity \
                 work must be conditional on the athlete's risk status.",
                first_source
            ),
        },
        AgentMessage {
            agent: "planner".into(),
            content: "Accepted: high-intensity sessions stay gated on risk status; \
                      revisit once fresh check-in data arrives."
                .into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::athletes::Athlete;

    fn snapshot(status: AthleteStatus, phase: TrainingPhase) -> ContextSnapshot {
        let mut athlete = Athlete::new("Jo");
        athlete.status = status;
        let plan = WeeklyPlan::new(athlete.id, phase);
        ContextSnapshot::assemble(athlete, Some(plan), Vec::new(), None)
    }

    #[test]
    fn test_full_week_generated() {
        let plan = FallbackPlanner.generate(&snapshot(
            AthleteStatus::Optimal,
            TrainingPhase::Competitive,
        ));
        assert_eq!(plan.sessions.len(), 7);
        assert_eq!(plan.phase, TrainingPhase::Competitive);
        assert!(plan.sessions.iter().any(|s| s.is_high_intensity()));
    }

    #[test]
    fn test_high_risk_strips_intensity() {
        let plan = FallbackPlanner.generate(&snapshot(
            AthleteStatus::HighRisk,
            TrainingPhase::Competitive,
        ));
        assert!(!plan.sessions.iter().any(|s| s.is_high_intensity()));
        assert!(plan.sessions.iter().all(|s| s.zone <= 2));
    }

    #[test]
    fn test_caution_caps_zone_three() {
        let plan = FallbackPlanner.generate(&snapshot(
            AthleteStatus::Caution,
            TrainingPhase::PreSeason,
        ));
        assert!(plan.sessions.iter().all(|s| s.zone <= 3));
        assert!(plan
            .sessions
            .iter()
            .all(|s| s.session_type != SessionType::HighIntensity));
    }

    #[test]
    fn test_intensity_sessions_are_structured() {
        let plan = FallbackPlanner.generate(&snapshot(
            AthleteStatus::Optimal,
            TrainingPhase::Tapering,
        ));
        let intense = plan
            .sessions
            .iter()
            .find(|s| s.session_type == SessionType::HighIntensity)
            .unwrap();
        assert_eq!(intense.sub_phases.len(), 3);
        assert_eq!(intense.sub_phases[1].zone, intense.zone);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let ctx = snapshot(AthleteStatus::Optimal, TrainingPhase::PreSeason);
        let a = FallbackPlanner.generate(&ctx);
        let b = FallbackPlanner.generate(&ctx);
        let shape = |p: &WeeklyPlan| -> Vec<(SessionType, u8)> {
            p.sessions.iter().map(|s| (s.session_type, s.zone)).collect()
        };
        assert_eq!(shape(&a), shape(&b));
    }

    #[test]
    fn test_critic_fallback_cites_knowledge() {
        let messages = critic_fallback(
            "next week's intervals",
            "[SOURCE: Gabbett 2016]\n\"load ratio guidance\"",
        );
        assert_eq!(messages.len(), 3);
        assert!(messages[1].content.contains("Gabbett"));
    }
}
