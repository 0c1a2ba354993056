//! Per-location enrollment status transition rules
//!
//! [`check_transition`] compares the persisted entry in effect at a
//! location with the entry requested for it. Rules are evaluated top to
//! bottom and the first match decides:
//!
//! | # | condition                                         | result |
//! |---|---------------------------------------------------|--------|
//! | 1 | Temporary → Temporary                             | allowed |
//! | 2 | same status, same start day                       | allowed |
//! | 3 | order flow, previous status not ERP-sourced       | ChangingNonErpStatusToOtherStatusAtOrderFlow |
//! | 4 | NonPotential → anything else                      | ChangingNonPotentialToOtherStatus |
//! | 5 | requested Temporary                               | allowed |
//! | 6 | same status, different start day                  | ChangingStartDateWithoutChangingStatus |
//! | 7 | status change, both entries starting today        | allowed |
//! | 8 | previous start day after requested start day      | ActivatedStartDateAfterRequestedStartDate |
//! | 9 | status change on the previous start day           | ChangingStatusWithoutChangingStartDate |
//! | 10| otherwise                                         | allowed |
//!
//! Dates are compared at UTC day precision.

use crate::field_error::{Field, InvalidReason};
use crate::models::{EnrollmentStatus, EnrollmentStatusHistory};
use chrono::NaiveDate;
use usermgmt_common::time::day_of;

/// Caller-supplied context for a transition check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionFlags {
    /// Batch submitted by the order/ERP flow
    pub order_flow: bool,
    /// Current UTC day
    pub today: NaiveDate,
}

/// Why a transition was refused, and which field to blame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub field: Field,
    pub reason: InvalidReason,
}

impl Rejection {
    fn on_status(reason: InvalidReason) -> Self {
        Self {
            field: Field::EnrollmentStatus,
            reason,
        }
    }

    fn on_start_date(reason: InvalidReason) -> Self {
        Self {
            field: Field::EnrollmentStatusStartDate,
            reason,
        }
    }
}

/// Check one requested entry against the persisted entry at its location
pub fn check_transition(
    previous: &EnrollmentStatusHistory,
    requested: &EnrollmentStatusHistory,
    flags: TransitionFlags,
) -> Result<(), Rejection> {
    use EnrollmentStatus::{NonPotential, Temporary};

    let prev_status = previous.status;
    let req_status = requested.status;
    let prev_day = day_of(previous.start_date);
    let req_day = day_of(requested.start_date);
    let same_status = prev_status == req_status;

    if prev_status == Temporary && req_status == Temporary {
        return Ok(());
    }

    if same_status && prev_day == req_day {
        return Ok(());
    }

    if flags.order_flow && !prev_status.is_erp_status() {
        return Err(Rejection::on_status(
            InvalidReason::ChangingNonErpStatusToOtherStatusAtOrderFlow,
        ));
    }

    if prev_status == NonPotential && req_status != NonPotential {
        return Err(Rejection::on_status(
            InvalidReason::ChangingNonPotentialToOtherStatus,
        ));
    }

    if req_status == Temporary {
        return Ok(());
    }

    if same_status {
        return Err(Rejection::on_start_date(
            InvalidReason::ChangingStartDateWithoutChangingStatus,
        ));
    }

    if req_day == flags.today && prev_day == flags.today {
        return Ok(());
    }

    if prev_day > req_day {
        return Err(Rejection::on_start_date(
            InvalidReason::ActivatedStartDateAfterRequestedStartDate,
        ));
    }

    if prev_day == req_day {
        return Err(Rejection::on_start_date(
            InvalidReason::ChangingStatusWithoutChangingStartDate,
        ));
    }

    Ok(())
}
