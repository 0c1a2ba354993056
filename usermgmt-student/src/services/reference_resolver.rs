//! Reference Data Resolver
//!
//! Collects the distinct identifiers referenced by a batch and issues at
//! most one bulk lookup per entity kind. Lookups with nothing to look up
//! are skipped. Every lookup is bounded by the configured timeout and
//! aborted when the caller cancels.
//!
//! Any repository failure aborts the whole batch.

use crate::enrollment::PersistedHistories;
use crate::models::StudentRecord;
use crate::reference_data::{index_by, ReferenceData};
use crate::repository::Repositories;
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use usermgmt_common::{Error, Result};

/// Distinct, non-empty identifiers of one batch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LookupKeys {
    pub grades: Vec<String>,
    pub tags: Vec<String>,
    pub schools: Vec<String>,
    pub school_courses: Vec<String>,
    pub locations: Vec<String>,
    pub prefectures: Vec<String>,
    /// Lowercased
    pub emails: Vec<String>,
    /// Lowercased
    pub usernames: Vec<String>,
    pub external_user_ids: Vec<String>,
    /// User IDs of update records; also the students whose enrollment
    /// history is fetched
    pub user_ids: Vec<String>,
}

fn insert_trimmed(set: &mut BTreeSet<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        set.insert(value.to_string());
    }
}

impl LookupKeys {
    pub fn collect(records: &[StudentRecord]) -> Self {
        let mut grades = BTreeSet::new();
        let mut tags = BTreeSet::new();
        let mut schools = BTreeSet::new();
        let mut school_courses = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut prefectures = BTreeSet::new();
        let mut emails = BTreeSet::new();
        let mut usernames = BTreeSet::new();
        let mut external_user_ids = BTreeSet::new();
        let mut user_ids = BTreeSet::new();

        for record in records {
            insert_trimmed(&mut grades, &record.grade);
            for tag in &record.tags {
                insert_trimmed(&mut tags, tag);
            }
            for history in &record.school_histories {
                insert_trimmed(&mut schools, &history.school);
                if let Some(course) = &history.school_course {
                    insert_trimmed(&mut school_courses, course);
                }
            }
            for location in &record.locations {
                insert_trimmed(&mut locations, location);
            }
            if let Some(code) = record.address.as_ref().and_then(|a| a.prefecture_code.as_deref()) {
                insert_trimmed(&mut prefectures, code);
            }
            insert_trimmed(&mut emails, &record.email.to_lowercase());
            insert_trimmed(&mut usernames, &record.username.to_lowercase());
            insert_trimmed(&mut external_user_ids, &record.external_user_id);
            if let Some(user_id) = record.existing_user_id() {
                insert_trimmed(&mut user_ids, user_id);
            }
        }

        Self {
            grades: grades.into_iter().collect(),
            tags: tags.into_iter().collect(),
            schools: schools.into_iter().collect(),
            school_courses: school_courses.into_iter().collect(),
            locations: locations.into_iter().collect(),
            prefectures: prefectures.into_iter().collect(),
            emails: emails.into_iter().collect(),
            usernames: usernames.into_iter().collect(),
            external_user_ids: external_user_ids.into_iter().collect(),
            user_ids: user_ids.into_iter().collect(),
        }
    }
}

/// Builds the per-batch [`ReferenceData`]
#[derive(Clone)]
pub struct ReferenceResolver {
    repos: Repositories,
    lookup_timeout: Duration,
}

impl ReferenceResolver {
    pub fn new(repos: Repositories, lookup_timeout: Duration) -> Self {
        Self {
            repos,
            lookup_timeout,
        }
    }

    /// Resolve every reference of the batch
    pub async fn resolve(
        &self,
        records: &[StudentRecord],
        cancel: &CancellationToken,
    ) -> Result<ReferenceData> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let keys = LookupKeys::collect(records);
        let repos = &self.repos;

        let grades = self
            .fetch("grades", &keys.grades, cancel, |ids| {
                repos.grades.get_by_partner_internal_ids(ids)
            })
            .await?;
        let tags = self
            .fetch("tags", &keys.tags, cancel, |ids| {
                repos.tags.get_by_partner_internal_ids(ids)
            })
            .await?;
        let schools = self
            .fetch("schools", &keys.schools, cancel, |ids| {
                repos.schools.get_by_partner_internal_ids(ids)
            })
            .await?;
        let school_courses = self
            .fetch("school_courses", &keys.school_courses, cancel, |ids| {
                repos.school_courses.get_by_partner_internal_ids(ids)
            })
            .await?;
        let locations = self
            .fetch("locations", &keys.locations, cancel, |ids| {
                repos.locations.get_lowest_level_by_partner_internal_ids(ids)
            })
            .await?;
        let prefectures = self
            .fetch("prefectures", &keys.prefectures, cancel, |codes| {
                repos.prefectures.get_by_prefecture_codes(codes)
            })
            .await?;
        let users_by_email = self
            .fetch("users_by_email", &keys.emails, cancel, |emails| {
                repos.users.get_by_emails(emails)
            })
            .await?;
        let users_by_username = self
            .fetch("users_by_username", &keys.usernames, cancel, |usernames| {
                repos.users.get_by_usernames(usernames)
            })
            .await?;
        let users_by_external_id = self
            .fetch("users_by_external_id", &keys.external_user_ids, cancel, |ids| {
                repos.users.get_by_external_user_ids(ids)
            })
            .await?;
        let users_by_id = self
            .fetch("users_by_id", &keys.user_ids, cancel, |ids| {
                repos.users.get_by_ids(ids)
            })
            .await?;
        let enrollment_histories = self
            .fetch("enrollment_status_histories", &keys.user_ids, cancel, |ids| {
                repos.enrollment_histories.get_by_student_ids(ids)
            })
            .await?;

        Ok(ReferenceData {
            grades: index_by(grades, |g| g.partner_internal_id.clone()),
            tags: index_by(tags, |t| t.partner_internal_id.clone()),
            schools: index_by(schools, |s| s.partner_internal_id.clone()),
            school_courses: index_by(school_courses, |c| c.partner_internal_id.clone()),
            locations: index_by(locations, |l| l.partner_internal_id.clone()),
            prefectures: index_by(prefectures, |p| p.prefecture_code.clone()),
            users_by_email: index_by(users_by_email, |u| u.email.to_lowercase()),
            users_by_username: index_by(users_by_username, |u| u.username.to_lowercase()),
            users_by_external_id: index_by(users_by_external_id, |u| u.external_user_id.clone()),
            users_by_id: index_by(users_by_id, |u| u.user_id.clone()),
            enrollment_histories: PersistedHistories::new(enrollment_histories),
        })
    }

    /// One bounded, cancellable bulk lookup; skipped for an empty key list
    async fn fetch<'k, T, F, Fut>(
        &self,
        kind: &'static str,
        keys: &'k [String],
        cancel: &CancellationToken,
        lookup: F,
    ) -> Result<Vec<T>>
    where
        F: FnOnce(&'k [String]) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(kind, keys = keys.len(), "Bulk reference lookup");

        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = tokio::time::timeout(self.lookup_timeout, lookup(keys)) => match result {
                Ok(found) => found?,
                Err(_) => {
                    tracing::warn!(kind, timeout_ms = self.lookup_timeout.as_millis() as u64, "Reference lookup timed out");
                    return Err(Error::DeadlineExceeded(format!("{} lookup", kind)));
                }
            },
        };

        tracing::debug!(kind, requested = keys.len(), found = found.len(), "Bulk reference lookup finished");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SchoolHistoryInput, UserAddressInput};

    #[test]
    fn test_collect_keys_distinct_and_non_empty() {
        let records = vec![
            StudentRecord {
                grade: "G1".to_string(),
                tags: vec!["T1".to_string(), "".to_string()],
                locations: vec!["L1".to_string()],
                email: "A@Example.com".to_string(),
                username: "A@Example.com".to_string(),
                school_histories: vec![SchoolHistoryInput {
                    school: "S1".to_string(),
                    school_course: Some("C1".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            },
            StudentRecord {
                user_id: Some("u-1".to_string()),
                grade: "G1".to_string(),
                tags: vec!["T1".to_string(), "T2".to_string()],
                email: "a@example.com".to_string(),
                external_user_id: "EXT".to_string(),
                address: Some(UserAddressInput {
                    prefecture_code: Some("13".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        ];

        let keys = LookupKeys::collect(&records);
        assert_eq!(keys.grades, vec!["G1"]);
        assert_eq!(keys.tags, vec!["T1", "T2"]);
        assert_eq!(keys.schools, vec!["S1"]);
        assert_eq!(keys.school_courses, vec!["C1"]);
        assert_eq!(keys.locations, vec!["L1"]);
        assert_eq!(keys.prefectures, vec!["13"]);
        assert_eq!(keys.emails, vec!["a@example.com"]);
        assert_eq!(keys.usernames, vec!["a@example.com"]);
        assert_eq!(keys.external_user_ids, vec!["EXT"]);
        assert_eq!(keys.user_ids, vec!["u-1"]);
    }
}
