//! Candidate student record as submitted by a caller

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row of incoming student data
///
/// Reference fields (grade, tags, locations, schools, prefecture) carry
/// partner-internal IDs. `index` is assigned from the record's batch
/// position and is the correlation key for every error it produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentRecord {
    #[serde(skip_deserializing)]
    pub index: usize,
    /// Present (non-empty) only for updates
    pub user_id: Option<String>,
    pub external_user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub first_name_phonetic: Option<String>,
    pub last_name_phonetic: Option<String>,
    pub email: String,
    pub username: String,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub grade: String,
    pub tags: Vec<String>,
    /// Paired by position with `enrollment_status_histories`
    pub locations: Vec<String>,
    pub enrollment_status_histories: Vec<EnrollmentStatusInput>,
    pub school_histories: Vec<SchoolHistoryInput>,
    pub phone_numbers: Vec<PhoneNumberInput>,
    pub address: Option<UserAddressInput>,
}

impl StudentRecord {
    /// User ID of the persisted student this record updates
    pub fn existing_user_id(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn is_update(&self) -> bool {
        self.existing_user_id().is_some()
    }
}

/// Requested enrollment status at the location of the same position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentStatusInput {
    /// Raw status, parsed during validation
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolHistoryInput {
    pub school: String,
    pub school_course: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneNumberKind {
    StudentPhoneNumber,
    HomePhoneNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumberInput {
    pub number: String,
    pub kind: PhoneNumberKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAddressInput {
    pub prefecture_code: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub first_street: Option<String>,
    pub second_street: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse a submitted gender; NONE and unknown values are rejected
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MALE" => Some(Gender::Male),
            "FEMALE" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}
