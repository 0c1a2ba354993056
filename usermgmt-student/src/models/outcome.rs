//! Validation result types

use super::enrollment::EnrollmentStatusHistory;
use super::reference::{Grade, Location, Prefecture, School, SchoolCourse, Tag};
use super::student::{Gender, PhoneNumberInput, StudentRecord};
use crate::field_error::FieldError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSchoolHistory {
    pub school: School,
    pub school_course: Option<SchoolCourse>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAddress {
    pub prefecture: Option<Prefecture>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub first_street: Option<String>,
    pub second_street: Option<String>,
}

/// A record that passed every validator, with resolved values written back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedStudent {
    pub record: StudentRecord,
    /// Existing ID for updates, freshly generated for creates
    pub user_id: String,
    pub login_email: String,
    pub gender: Option<Gender>,
    pub grade: Grade,
    pub tags: Vec<Tag>,
    pub locations: Vec<Location>,
    pub school_histories: Vec<ResolvedSchoolHistory>,
    pub phone_numbers: Vec<PhoneNumberInput>,
    pub address: Option<ResolvedAddress>,
    pub enrollment_status_histories: Vec<EnrollmentStatusHistory>,
}

impl ValidatedStudent {
    pub fn index(&self) -> usize {
        self.record.index
    }
}

/// How a caller treats a batch containing errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Valid records proceed; errors are reported alongside
    #[default]
    Lenient,
    /// Any error rejects the whole batch
    Strict,
}

/// Whole batch rejected in strict mode
#[derive(Debug, Clone, Error)]
#[error("batch rejected: {} record(s) failed validation", .errored_records)]
pub struct BatchRejected {
    pub errored_records: usize,
    pub errors: Vec<FieldError>,
}

/// Split of a batch into creations, updates and per-record errors
///
/// Each batch index appears in exactly one of the three collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub to_create: Vec<ValidatedStudent>,
    pub to_update: Vec<ValidatedStudent>,
    pub errors: Vec<FieldError>,
}

impl ValidationOutcome {
    /// Distinct indices of failed records, ascending
    pub fn errored_indices(&self) -> BTreeSet<usize> {
        self.errors.iter().map(FieldError::index).collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of records accounted for
    pub fn total(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.errored_indices().len()
    }

    /// Records accepted under `mode`
    ///
    /// Lenient mode returns the create and update lists, dropping errors.
    /// Strict mode fails with every error when any record failed.
    pub fn into_accepted(
        self,
        mode: ValidationMode,
    ) -> Result<(Vec<ValidatedStudent>, Vec<ValidatedStudent>), BatchRejected> {
        if mode == ValidationMode::Strict && self.has_errors() {
            return Err(BatchRejected {
                errored_records: self.errored_indices().len(),
                errors: self.errors,
            });
        }
        Ok((self.to_create, self.to_update))
    }
}
