//! Persisted enrollment status histories of a batch
//!
//! Built once per batch from a single repository fetch and queried per
//! requested entry.

use crate::models::{EnrollmentStatus, EnrollmentStatusHistory};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use usermgmt_common::time::same_day;

#[derive(Debug, Clone, Default)]
pub struct PersistedHistories {
    by_student: HashMap<String, Vec<EnrollmentStatusHistory>>,
}

impl PersistedHistories {
    pub fn new(entries: Vec<EnrollmentStatusHistory>) -> Self {
        let mut by_student: HashMap<String, Vec<EnrollmentStatusHistory>> = HashMap::new();
        for entry in entries {
            by_student
                .entry(entry.student_id.clone())
                .or_default()
                .push(entry);
        }
        Self { by_student }
    }

    pub fn for_student(&self, student_id: &str) -> &[EnrollmentStatusHistory] {
        self.by_student
            .get(student_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn at_location<'a, 'b>(
        &'a self,
        student_id: &str,
        location_id: &'b str,
    ) -> impl Iterator<Item = &'a EnrollmentStatusHistory> + 'b
    where
        'a: 'b,
    {
        self.for_student(student_id)
            .iter()
            .filter(move |e| e.location_id == location_id)
    }

    /// Persisted entry with the same location, status and start day
    pub fn exact_match(&self, requested: &EnrollmentStatusHistory) -> Option<&EnrollmentStatusHistory> {
        self.at_location(&requested.student_id, &requested.location_id)
            .find(|e| e.status == requested.status && same_day(e.start_date, requested.start_date))
    }

    /// Entry in effect at `now`; the latest-starting one if several overlap
    pub fn activated_at(
        &self,
        student_id: &str,
        location_id: &str,
        now: DateTime<Utc>,
    ) -> Option<&EnrollmentStatusHistory> {
        self.at_location(student_id, location_id)
            .filter(|e| e.is_active_at(now))
            .max_by_key(|e| e.start_date)
    }

    pub fn latest_at(&self, student_id: &str, location_id: &str) -> Option<&EnrollmentStatusHistory> {
        self.at_location(student_id, location_id)
            .max_by_key(|e| e.start_date)
    }

    /// Entry a requested change at this location is compared against
    pub fn reference_for(
        &self,
        student_id: &str,
        location_id: &str,
        now: DateTime<Utc>,
    ) -> Option<&EnrollmentStatusHistory> {
        self.activated_at(student_id, location_id, now)
            .or_else(|| self.latest_at(student_id, location_id))
    }

    /// Statuses in effect at `now` at locations the request leaves untouched
    pub fn active_statuses_outside(
        &self,
        student_id: &str,
        requested_locations: &HashSet<&str>,
        now: DateTime<Utc>,
    ) -> Vec<EnrollmentStatus> {
        self.for_student(student_id)
            .iter()
            .filter(|e| !requested_locations.contains(e.location_id.as_str()))
            .filter(|e| e.is_active_at(now))
            .map(|e| e.status)
            .collect()
    }
}
