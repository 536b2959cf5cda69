//! Staff link-request processor.

use chrono::Utc;
use serde_json::json;

use crate::athletes::{Athlete, LinkRequest, LinkRequestStatus};

use super::{IngestPayload, LinkAction, LinkPayload, Processor, ProcessorError, ProcessorOutcome};

/// State machine over staff-athlete link requests.
///
/// Send creates a pending request, accept flips it and links the staff
/// member (deduplicated by id), reject flips it only, unlink removes the
/// staff member from the assigned list.
pub struct LinkProcessor;

impl LinkProcessor {
    fn apply(
        &self,
        payload: &LinkPayload,
        mut athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError> {
        match payload.action {
            LinkAction::Send => {
                let staff = payload.staff.clone().ok_or_else(|| {
                    ProcessorError::InvalidPayload("link send requires staff".into())
                })?;

                let already_pending = athlete.pending_requests.iter().any(|r| {
                    r.staff.id == staff.id && r.status == LinkRequestStatus::Pending
                });
                if !already_pending {
                    athlete.pending_requests.push(LinkRequest {
                        id: uuid::Uuid::new_v4(),
                        staff,
                        status: LinkRequestStatus::Pending,
                        requested_at: Utc::now(),
                    });
                }
            }
            LinkAction::Accept => {
                let request_id = payload.request_id.ok_or_else(|| {
                    ProcessorError::InvalidPayload("link accept requires request_id".into())
                })?;
                let request = athlete
                    .pending_requests
                    .iter_mut()
                    .find(|r| r.id == request_id)
                    .ok_or_else(|| {
                        ProcessorError::InvalidPayload(format!(
                            "no link request with id {}",
                            request_id
                        ))
                    })?;

                request.status = LinkRequestStatus::Accepted;
                let staff = request.staff.clone();
                if !athlete.assigned_staff.iter().any(|s| s.id == staff.id) {
                    athlete.assigned_staff.push(staff);
                }
            }
            LinkAction::Reject => {
                let request_id = payload.request_id.ok_or_else(|| {
                    ProcessorError::InvalidPayload("link reject requires request_id".into())
                })?;
                let request = athlete
                    .pending_requests
                    .iter_mut()
                    .find(|r| r.id == request_id)
                    .ok_or_else(|| {
                        ProcessorError::InvalidPayload(format!(
                            "no link request with id {}",
                            request_id
                        ))
                    })?;
                request.status = LinkRequestStatus::Rejected;
            }
            LinkAction::Unlink => {
                let staff_id = payload.staff_id.ok_or_else(|| {
                    ProcessorError::InvalidPayload("unlink requires staff_id".into())
                })?;
                athlete.assigned_staff.retain(|s| s.id != staff_id);
            }
        }
        athlete.updated_at = Utc::now();

        let event_data = json!({
            "action": payload.action,
            "pending": athlete.pending_requests.len(),
            "assigned": athlete.assigned_staff.len(),
        });
        Ok(ProcessorOutcome::persist(athlete, event_data))
    }
}

impl Processor for LinkProcessor {
    fn process(
        &self,
        payload: &IngestPayload,
        athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError> {
        match payload {
            IngestPayload::Link(p) => self.apply(p, athlete),
            _ => Err(ProcessorError::PayloadMismatch),
        }
    }
}
