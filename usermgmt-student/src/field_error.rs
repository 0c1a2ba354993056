//! Per-record validation errors
//!
//! Every error carries its entity, field and batch index, plus the
//! parent collection and element index when the failing value sits inside
//! a repeated sub-structure (school histories, enrollment status
//! histories, phone numbers). Callers branch on the variant and on
//! [`InvalidReason`]; the `Display` rendering is for humans only.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Entity a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Student,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Student => "student",
        }
    }
}

/// Field of a candidate student record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    UserId,
    ExternalUserId,
    Email,
    Username,
    FirstName,
    LastName,
    Gender,
    Grade,
    Tags,
    Locations,
    School,
    SchoolCourse,
    SchoolHistoryStartDate,
    StudentPhoneNumber,
    HomePhoneNumber,
    Prefecture,
    EnrollmentStatus,
    EnrollmentStatusStartDate,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::UserId => "user_id",
            Field::ExternalUserId => "external_user_id",
            Field::Email => "email",
            Field::Username => "username",
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::Gender => "gender",
            Field::Grade => "grade",
            Field::Tags => "tags",
            Field::Locations => "locations",
            Field::School => "school",
            Field::SchoolCourse => "school_course",
            Field::SchoolHistoryStartDate => "start_date",
            Field::StudentPhoneNumber => "student_phone_number",
            Field::HomePhoneNumber => "home_phone_number",
            Field::Prefecture => "prefecture",
            Field::EnrollmentStatus => "enrollment_status",
            Field::EnrollmentStatusStartDate => "start_date",
        }
    }
}

/// Repeated sub-structure of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedField {
    SchoolHistories,
    EnrollmentStatusHistories,
    PhoneNumbers,
}

impl NestedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            NestedField::SchoolHistories => "school_histories",
            NestedField::EnrollmentStatusHistories => "enrollment_status_histories",
            NestedField::PhoneNumbers => "phone_numbers",
        }
    }
}

/// Position of an element inside a repeated sub-structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NestedPosition {
    pub field: NestedField,
    pub index: usize,
}

/// Exact source position of a failing value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldLocation {
    pub entity: Entity,
    pub field: Field,
    /// Batch index of the record
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<NestedPosition>,
}

impl FieldLocation {
    pub fn student(field: Field, index: usize) -> Self {
        Self {
            entity: Entity::Student,
            field,
            index,
            nested: None,
        }
    }
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.entity.as_str(), self.index)?;
        if let Some(nested) = &self.nested {
            write!(f, ".{}[{}]", nested.field.as_str(), nested.index)?;
        }
        write!(f, ".{}", self.field.as_str())
    }
}

/// Closed set of reasons for [`FieldError::InvalidField`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    NotMatchingEnum,
    NotMatchingPattern,
    NotMatchingConstants,
    Empty,
    Archived,
    AlreadyRegistered,
    NotMatching,
    StartDateAfterEndDate,
    StartDateAfterCurrentDate,
    MissingActivatedEnrollmentStatus,
    NotInAllowListEnrollmentStatus,
    ChangingNonPotentialToOtherStatus,
    ChangingStatusWithoutChangingStartDate,
    ChangingStartDateWithoutChangingStatus,
    ChangingNonErpStatusToOtherStatusAtOrderFlow,
    ActivatedStartDateAfterRequestedStartDate,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidReason::NotMatchingEnum => "not matching enum",
            InvalidReason::NotMatchingPattern => "not matching pattern",
            InvalidReason::NotMatchingConstants => "not matching constants",
            InvalidReason::Empty => "empty",
            InvalidReason::Archived => "archived",
            InvalidReason::AlreadyRegistered => "already registered",
            InvalidReason::NotMatching => "not matching",
            InvalidReason::StartDateAfterEndDate => "start date after end date",
            InvalidReason::StartDateAfterCurrentDate => "start date after current date",
            InvalidReason::MissingActivatedEnrollmentStatus => {
                "missing activated enrollment status"
            }
            InvalidReason::NotInAllowListEnrollmentStatus => {
                "enrollment status not in allow list"
            }
            InvalidReason::ChangingNonPotentialToOtherStatus => {
                "changing non-potential to other status"
            }
            InvalidReason::ChangingStatusWithoutChangingStartDate => {
                "changing status without changing start date"
            }
            InvalidReason::ChangingStartDateWithoutChangingStatus => {
                "changing start date without changing status"
            }
            InvalidReason::ChangingNonErpStatusToOtherStatusAtOrderFlow => {
                "changing non-ERP status to other status at order flow"
            }
            InvalidReason::ActivatedStartDateAfterRequestedStartDate => {
                "activated start date after requested start date"
            }
        };
        f.write_str(text)
    }
}

/// Validation failure of one record
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    #[error("{location}: missing mandatory field")]
    MissingMandatoryField { location: FieldLocation },

    #[error("{location}: {reason}")]
    InvalidField {
        location: FieldLocation,
        reason: InvalidReason,
    },

    /// Reference lookup miss
    #[error("{location}: {} not found", .value.as_deref().unwrap_or("value"))]
    NotFound {
        location: FieldLocation,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    /// Collision with an earlier record of the same batch or element of
    /// the same record
    #[error("{location}: duplicated")]
    Duplicated { location: FieldLocation },

    /// Collision with persisted data
    #[error("{location}: already exists")]
    ExistingData { location: FieldLocation },

    /// Attempt to change an immutable field
    #[error("{location}: cannot be updated")]
    UpdateField { location: FieldLocation },
}

impl FieldError {
    pub fn missing(field: Field, index: usize) -> Self {
        FieldError::MissingMandatoryField {
            location: FieldLocation::student(field, index),
        }
    }

    pub fn invalid(field: Field, index: usize, reason: InvalidReason) -> Self {
        FieldError::InvalidField {
            location: FieldLocation::student(field, index),
            reason,
        }
    }

    pub fn not_found(field: Field, index: usize, value: impl Into<String>) -> Self {
        FieldError::NotFound {
            location: FieldLocation::student(field, index),
            value: Some(value.into()),
        }
    }

    pub fn duplicated(field: Field, index: usize) -> Self {
        FieldError::Duplicated {
            location: FieldLocation::student(field, index),
        }
    }

    pub fn existing(field: Field, index: usize) -> Self {
        FieldError::ExistingData {
            location: FieldLocation::student(field, index),
        }
    }

    pub fn update(field: Field, index: usize) -> Self {
        FieldError::UpdateField {
            location: FieldLocation::student(field, index),
        }
    }

    /// Attach the parent collection and element index
    pub fn nested(mut self, field: NestedField, index: usize) -> Self {
        self.location_mut().nested = Some(NestedPosition { field, index });
        self
    }

    pub fn location(&self) -> &FieldLocation {
        match self {
            FieldError::MissingMandatoryField { location }
            | FieldError::InvalidField { location, .. }
            | FieldError::NotFound { location, .. }
            | FieldError::Duplicated { location }
            | FieldError::ExistingData { location }
            | FieldError::UpdateField { location } => location,
        }
    }

    fn location_mut(&mut self) -> &mut FieldLocation {
        match self {
            FieldError::MissingMandatoryField { location }
            | FieldError::InvalidField { location, .. }
            | FieldError::NotFound { location, .. }
            | FieldError::Duplicated { location }
            | FieldError::ExistingData { location }
            | FieldError::UpdateField { location } => location,
        }
    }

    /// Batch index of the failing record
    pub fn index(&self) -> usize {
        self.location().index
    }

    pub fn field(&self) -> Field {
        self.location().field
    }

    pub fn nested_position(&self) -> Option<NestedPosition> {
        self.location().nested
    }

    pub fn reason(&self) -> Option<InvalidReason> {
        match self {
            FieldError::InvalidField { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_flat_location() {
        let err = FieldError::not_found(Field::Grade, 3, "grade-x");
        assert_eq!(err.to_string(), "student[3].grade: grade-x not found");
    }

    #[test]
    fn test_display_nested_location() {
        let err = FieldError::invalid(Field::School, 0, InvalidReason::Archived)
            .nested(NestedField::SchoolHistories, 2);
        assert_eq!(
            err.to_string(),
            "student[0].school_histories[2].school: archived"
        );
        assert_eq!(
            err.nested_position(),
            Some(NestedPosition {
                field: NestedField::SchoolHistories,
                index: 2
            })
        );
    }

    #[test]
    fn test_accessors() {
        let err = FieldError::invalid(
            Field::EnrollmentStatus,
            7,
            InvalidReason::ChangingNonPotentialToOtherStatus,
        );
        assert_eq!(err.index(), 7);
        assert_eq!(err.field(), Field::EnrollmentStatus);
        assert_eq!(
            err.reason(),
            Some(InvalidReason::ChangingNonPotentialToOtherStatus)
        );
        assert_eq!(FieldError::duplicated(Field::Email, 1).reason(), None);
    }

    #[test]
    fn test_serialize_tagged() {
        let err = FieldError::invalid(Field::Tags, 1, InvalidReason::NotMatchingConstants);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "invalid_field");
        assert_eq!(json["reason"], "not_matching_constants");
        assert_eq!(json["location"]["field"], "tags");
        assert_eq!(json["location"]["index"], 1);
        assert!(json["location"].get("nested").is_none());
    }
}
