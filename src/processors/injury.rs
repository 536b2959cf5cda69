//! Injury update and resolution processor.

use chrono::Utc;
use serde_json::json;

use crate::athletes::{Athlete, AthleteStatus, InjuryStatus};

use super::{
    IngestPayload, InjuryPayload, InjuryResolvedPayload, Processor, ProcessorError,
    ProcessorOutcome,
};

/// Processor for injury reports and resolutions.
///
/// Status handling is a direct override, independent of the risk state
/// machine: an active severity>2 injury forces high risk, and resolving
/// the last such injury returns the athlete to optimal.
pub struct InjuryProcessor;

impl InjuryProcessor {
    fn upsert(&self, payload: &InjuryPayload, mut athlete: Athlete) -> ProcessorOutcome {
        let injury = payload.injury.clone();

        if let Some(existing) = athlete.injuries.iter_mut().find(|i| i.id == injury.id) {
            *existing = injury.clone();
        } else {
            athlete.injuries.push(injury.clone());
        }

        if injury.is_blocking() {
            athlete.status = AthleteStatus::HighRisk;
        }
        athlete.updated_at = Utc::now();

        let event_data = json!({
            "injury_id": injury.id,
            "severity": injury.severity,
            "status": injury.status,
            "athlete_status": athlete.status,
        });
        ProcessorOutcome::persist(athlete, event_data)
    }

    fn resolve(
        &self,
        payload: &InjuryResolvedPayload,
        mut athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError> {
        let injury = athlete
            .injuries
            .iter_mut()
            .find(|i| i.id == payload.injury_id)
            .ok_or_else(|| {
                ProcessorError::InvalidPayload(format!(
                    "no injury with id {}",
                    payload.injury_id
                ))
            })?;

        let was_blocking = injury.is_blocking();
        injury.status = InjuryStatus::Resolved;
        injury.resolved_at = Some(Utc::now());

        if was_blocking && !athlete.has_blocking_injury() {
            athlete.status = AthleteStatus::Optimal;
        }
        athlete.updated_at = Utc::now();

        let event_data = json!({
            "injury_id": payload.injury_id,
            "athlete_status": athlete.status,
        });
        Ok(ProcessorOutcome::persist(athlete, event_data))
    }
}

impl Processor for InjuryProcessor {
    fn process(
        &self,
        payload: &IngestPayload,
        athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError> {
        match payload {
            IngestPayload::Injury(p) => Ok(self.upsert(p, athlete)),
            IngestPayload::InjuryResolved(p) => self.resolve(p, athlete),
            _ => Err(ProcessorError::PayloadMismatch),
        }
    }
}
