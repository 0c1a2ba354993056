//! Per-batch lookup maps
//!
//! Built once by the reference resolver and borrowed by every validator.
//! Nothing here is re-fetched while a batch is being validated.

use crate::enrollment::PersistedHistories;
use crate::models::{ExistingUser, Grade, Location, Prefecture, School, SchoolCourse, Tag};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    /// Keyed by partner-internal ID
    pub grades: HashMap<String, Grade>,
    /// Keyed by partner-internal ID
    pub tags: HashMap<String, Tag>,
    /// Keyed by partner-internal ID
    pub schools: HashMap<String, School>,
    /// Keyed by partner-internal ID
    pub school_courses: HashMap<String, SchoolCourse>,
    /// Lowest-level locations keyed by partner-internal ID
    pub locations: HashMap<String, Location>,
    /// Keyed by prefecture code
    pub prefectures: HashMap<String, Prefecture>,
    /// Keyed by lowercased email
    pub users_by_email: HashMap<String, ExistingUser>,
    /// Keyed by lowercased username
    pub users_by_username: HashMap<String, ExistingUser>,
    pub users_by_external_id: HashMap<String, ExistingUser>,
    pub users_by_id: HashMap<String, ExistingUser>,
    /// "Before" state for enrollment transition checks
    pub enrollment_histories: PersistedHistories,
}

impl ReferenceData {
    pub fn user_by_email(&self, email: &str) -> Option<&ExistingUser> {
        self.users_by_email.get(&email.to_lowercase())
    }

    pub fn user_by_username(&self, username: &str) -> Option<&ExistingUser> {
        self.users_by_username.get(&username.to_lowercase())
    }
}

/// Index entities by a string key
pub(crate) fn index_by<T, F>(entities: Vec<T>, key: F) -> HashMap<String, T>
where
    F: Fn(&T) -> String,
{
    entities.into_iter().map(|e| (key(&e), e)).collect()
}
