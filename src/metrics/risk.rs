//! Risk status state machine.
//!
//! Maps a recovery check-in (pain, RPE, load ratio, sleep) plus the current
//! status onto the next status, an independent alert flag, and an HRV
//! adjustment. Escalation rules are evaluated first-match-wins; thresholds
//! follow the ACWR injury-risk bands.

use serde::{Deserialize, Serialize};

use crate::athletes::AthleteStatus;

/// HRV floor after escalation penalties.
pub const HRV_FLOOR: f64 = 30.0;

/// HRV ceiling after recovery credit.
pub const HRV_CAP: f64 = 100.0;

/// Inputs to one risk evaluation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskInputs {
    /// Reported pain 0-10
    pub pain: u8,
    /// Rate of perceived exertion 0-10, if reported
    pub rpe: Option<u8>,
    /// Current acute:chronic load ratio
    pub load_ratio: f64,
    /// Sleep quality 0-10, if reported
    pub sleep_quality: Option<u8>,
}

/// Outcome of one risk evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    /// Next athlete status
    pub status: AthleteStatus,
    /// Whether the escalation path fired
    pub escalated: bool,
    /// Whether an external notification should be sent
    pub should_alert: bool,
}

/// Evaluate the state machine for one check-in.
pub fn next_status(current: AthleteStatus, inputs: &RiskInputs) -> RiskAssessment {
    let rpe = inputs.rpe.unwrap_or(0);
    let escalated = is_escalation(inputs.pain, inputs.rpe, inputs.load_ratio);

    let status = if escalated {
        AthleteStatus::HighRisk
    } else {
        match current {
            AthleteStatus::HighRisk => AthleteStatus::Caution,
            AthleteStatus::Caution if inputs.pain == 0 && rpe < 5 => AthleteStatus::Optimal,
            other => other,
        }
    };

    RiskAssessment {
        status,
        escalated,
        should_alert: should_alert(inputs.pain, inputs.rpe, inputs.load_ratio),
    }
}

/// First-match-wins escalation rules.
fn is_escalation(pain: u8, rpe: Option<u8>, ratio: f64) -> bool {
    if pain >= 4 {
        return true;
    }
    if rpe.is_some_and(|r| r >= 8) {
        return true;
    }
    if ratio >= 1.5 {
        return true;
    }
    (pain >= 2 && rpe.is_some_and(|r| r >= 6)) || ratio > 1.3
}

/// Alert gate, independent of the status transition.
fn should_alert(pain: u8, rpe: Option<u8>, ratio: f64) -> bool {
    pain >= 5 || (pain >= 3 && rpe.is_some_and(|r| r >= 8)) || ratio >= 1.7
}

/// Apply the HRV side effect of an assessment.
///
/// Escalation drains HRV by `pain*2 + rpe` plus a spike penalty when the
/// ratio exceeds 1.5, floored at [`HRV_FLOOR`]. A non-escalating check-in
/// with good sleep credits 5, capped at [`HRV_CAP`].
pub fn adjust_hrv(hrv: f64, assessment: &RiskAssessment, inputs: &RiskInputs) -> f64 {
    if assessment.escalated {
        let spike_penalty = if inputs.load_ratio > 1.5 { 10.0 } else { 0.0 };
        let drain =
            f64::from(inputs.pain) * 2.0 + f64::from(inputs.rpe.unwrap_or(0)) + spike_penalty;
        (hrv - drain).max(HRV_FLOOR)
    } else if inputs.sleep_quality.is_some_and(|s| s >= 8) {
        (hrv + 5.0).min(HRV_CAP)
    } else {
        hrv
    }
}
