//! Recovery check-in processor.
//!
//! The busiest path in the pipeline: appends the session load, upserts the
//! daily log, recomputes the load ratio, runs the risk state machine and
//! its HRV side effect, refreshes readiness, and raises a notification
//! when the alert gate fires.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::athletes::{Athlete, AthleteStatus, DailyLogEntry, HrvTrend};
use crate::config::CoreConfig;
use crate::metrics::{adjust_hrv, next_status, AcwrCalculator, RiskInputs};
use crate::notify::{NotificationKind, Notifier};

use super::{IngestPayload, Processor, ProcessorError, ProcessorOutcome, RecoveryPayload};

/// Processor for recovery check-ins.
pub struct RecoveryProcessor {
    calculator: AcwrCalculator,
    notifier: Arc<dyn Notifier>,
}

impl RecoveryProcessor {
    /// Create with the configured ACWR windows.
    pub fn new(notifier: Arc<dyn Notifier>, config: &CoreConfig) -> Self {
        Self {
            calculator: AcwrCalculator::with_windows(
                config.acwr.acute_days,
                config.acwr.chronic_days,
            ),
            notifier,
        }
    }

    fn apply(&self, payload: &RecoveryPayload, mut athlete: Athlete) -> ProcessorOutcome {
        let date = payload.date.unwrap_or_else(|| Utc::now().date_naive());

        athlete.load_history.push(payload.load);
        athlete.upsert_daily_log(DailyLogEntry {
            date,
            pain: payload.pain,
            rpe: payload.rpe,
            sleep_quality: payload.sleep_quality,
            load: payload.load,
            notes: payload.notes.clone(),
        });

        let ratio = self.calculator.ratio(&athlete.load_history);
        athlete.load_ratio = ratio;

        let inputs = RiskInputs {
            pain: payload.pain,
            rpe: payload.rpe,
            load_ratio: ratio,
            sleep_quality: payload.sleep_quality,
        };
        let assessment = next_status(athlete.status, &inputs);

        // An active severe injury pins high-risk status; the state machine
        // may not de-escalate past it.
        athlete.status = if athlete.has_blocking_injury() {
            AthleteStatus::HighRisk
        } else {
            assessment.status
        };

        let previous_hrv = athlete.hrv;
        athlete.hrv = adjust_hrv(previous_hrv, &assessment, &inputs);
        athlete.hrv_trend = HrvTrend::from_delta(previous_hrv, athlete.hrv);
        athlete.readiness = readiness_score(payload.pain, payload.rpe, payload.sleep_quality);
        athlete.updated_at = Utc::now();

        if assessment.should_alert {
            self.notifier.notify(
                athlete.id,
                NotificationKind::RiskAlert,
                json!({
                    "pain": payload.pain,
                    "rpe": payload.rpe,
                    "load_ratio": ratio,
                    "status": athlete.status,
                }),
            );
        }

        let event_data = json!({
            "date": date,
            "load": payload.load,
            "load_ratio": ratio,
            "status": athlete.status,
            "alerted": assessment.should_alert,
        });
        ProcessorOutcome::persist(athlete, event_data)
    }
}

impl Processor for RecoveryProcessor {
    fn process(
        &self,
        payload: &IngestPayload,
        athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError> {
        match payload {
            IngestPayload::Recovery(p) => Ok(self.apply(p, athlete)),
            _ => Err(ProcessorError::PayloadMismatch),
        }
    }
}

/// Readiness heuristic from the check-in scores, clamped to 0-100.
fn readiness_score(pain: u8, rpe: Option<u8>, sleep_quality: Option<u8>) -> u8 {
    let mut score = 100i32;
    score -= i32::from(pain) * 8;
    score -= i32::from(rpe.unwrap_or(0)) * 3;
    if let Some(sleep) = sleep_quality {
        score += (i32::from(sleep) - 5) * 4;
    }
    score.clamp(0, 100) as u8
}
