//! Enrollment status history validation
//!
//! Runs in three steps:
//! 1. [`validate_structure`]: pairing with locations, status parsing,
//!    order-flow allow list and date checks (both flows)
//! 2. [`validate_for_creating`]: mandatory entry and activated-status rule
//! 3. [`validate_for_updating`]: transition rules against persisted history
//!
//! Every error is nested under `enrollment_status_histories[i]`.

use super::FieldResult;
use crate::enrollment::{check_transition, PersistedHistories, TransitionFlags};
use crate::field_error::{Field, FieldError, InvalidReason, NestedField};
use crate::models::{EnrollmentStatus, EnrollmentStatusHistory, Location, StudentRecord};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use usermgmt_common::time::day_of;

/// Validation clock and caller mode
#[derive(Debug, Clone, Copy)]
pub struct EnrollmentContext {
    pub order_flow: bool,
    pub now: DateTime<Utc>,
}

/// A structurally valid entry and its position in the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedStatus {
    pub position: usize,
    pub history: EnrollmentStatusHistory,
}

fn nested_invalid(field: Field, index: usize, position: usize, reason: InvalidReason) -> FieldError {
    FieldError::invalid(field, index, reason).nested(NestedField::EnrollmentStatusHistories, position)
}

/// Pair statuses with resolved locations and check each entry
///
/// `locations` is the record's resolved location list, in request order.
/// A record without any status entries yields no entries.
pub fn validate_structure(
    record: &StudentRecord,
    locations: &[Location],
    student_id: &str,
    ctx: EnrollmentContext,
) -> FieldResult<Vec<RequestedStatus>> {
    let index = record.index;
    let inputs = &record.enrollment_status_histories;
    if inputs.is_empty() {
        return Ok(Vec::new());
    }

    let today = day_of(ctx.now);
    let mut requested = Vec::with_capacity(inputs.len());

    for position in 0..inputs.len().max(locations.len()) {
        let input = inputs.get(position);
        let raw_status = input.map(|i| i.status.trim()).filter(|s| !s.is_empty());
        let location = locations.get(position);

        let (input, raw_status, location) = match (input, raw_status, location) {
            (Some(input), Some(raw), Some(location)) => (input, raw, location),
            (_, None, Some(_)) => {
                return Err(nested_invalid(
                    Field::EnrollmentStatus,
                    index,
                    position,
                    InvalidReason::Empty,
                ))
            }
            (_, Some(_), None) => {
                return Err(nested_invalid(Field::Locations, index, position, InvalidReason::Empty))
            }
            _ => continue,
        };

        let status = EnrollmentStatus::parse(raw_status).ok_or_else(|| {
            nested_invalid(
                Field::EnrollmentStatus,
                index,
                position,
                InvalidReason::NotMatchingEnum,
            )
        })?;

        if ctx.order_flow && !status.is_erp_status() {
            return Err(nested_invalid(
                Field::EnrollmentStatus,
                index,
                position,
                InvalidReason::NotInAllowListEnrollmentStatus,
            ));
        }

        let start_date = input.start_date.unwrap_or(ctx.now);
        if let Some(end_date) = input.end_date {
            if end_date < start_date {
                return Err(nested_invalid(
                    Field::EnrollmentStatusStartDate,
                    index,
                    position,
                    InvalidReason::StartDateAfterEndDate,
                ));
            }
        }

        // Potential may be scheduled ahead
        if status.requires_current_start() && day_of(start_date) > today {
            return Err(nested_invalid(
                Field::EnrollmentStatusStartDate,
                index,
                position,
                InvalidReason::StartDateAfterCurrentDate,
            ));
        }

        requested.push(RequestedStatus {
            position,
            history: EnrollmentStatusHistory {
                student_id: student_id.to_string(),
                location_id: location.location_id.clone(),
                status,
                start_date,
                end_date: input.end_date,
                order_id: input.order_id.clone(),
            },
        });
    }

    Ok(requested)
}

/// A new student needs at least one entry, and Temporary never alone
pub fn validate_for_creating(index: usize, requested: &[RequestedStatus]) -> FieldResult<()> {
    if requested.is_empty() {
        return Err(FieldError::missing(Field::EnrollmentStatus, index));
    }

    let has_activated = requested.iter().any(|r| r.history.status.is_activated());
    if let Some(temporary) = requested
        .iter()
        .find(|r| r.history.status == EnrollmentStatus::Temporary)
    {
        if !has_activated {
            return Err(nested_invalid(
                Field::EnrollmentStatus,
                index,
                temporary.position,
                InvalidReason::MissingActivatedEnrollmentStatus,
            ));
        }
    }

    Ok(())
}

/// Compare each requested entry with the persisted history at its location
pub fn validate_for_updating(
    record: &StudentRecord,
    student_id: &str,
    requested: &[RequestedStatus],
    persisted: &PersistedHistories,
    ctx: EnrollmentContext,
) -> FieldResult<()> {
    if record.enrollment_status_histories.is_empty() && record.locations.is_empty() {
        return Ok(());
    }

    let index = record.index;
    let flags = TransitionFlags {
        order_flow: ctx.order_flow,
        today: day_of(ctx.now),
    };

    let requested_locations: HashSet<&str> = requested
        .iter()
        .map(|r| r.history.location_id.as_str())
        .collect();
    let keeps_activated_status = requested.iter().any(|r| r.history.status.is_activated())
        || persisted
            .active_statuses_outside(student_id, &requested_locations, ctx.now)
            .iter()
            .any(EnrollmentStatus::is_activated);

    for req in requested {
        if persisted.exact_match(&req.history).is_some() {
            continue;
        }

        let previous = persisted.reference_for(student_id, &req.history.location_id, ctx.now);

        if req.history.status == EnrollmentStatus::Temporary
            && previous.map(|p| p.status) != Some(EnrollmentStatus::Temporary)
            && !keeps_activated_status
        {
            return Err(nested_invalid(
                Field::EnrollmentStatus,
                index,
                req.position,
                InvalidReason::MissingActivatedEnrollmentStatus,
            ));
        }

        // First enrollment at this location
        let Some(previous) = previous else {
            continue;
        };

        check_transition(previous, &req.history, flags).map_err(|rejection| {
            nested_invalid(rejection.field, index, req.position, rejection.reason)
        })?;
    }

    Ok(())
}
