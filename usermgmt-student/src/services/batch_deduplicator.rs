//! Intra-Batch Deduplicator
//!
//! Removes records whose unique identifiers collide with an earlier
//! record of the same batch. Passes run in order over the survivors of
//! the previous pass:
//! 1. user ID
//! 2. external user ID
//! 3. email (case-insensitive)
//! 4. username (case-insensitive), only when usernames are enabled
//!
//! With usernames disabled the username mirrors the email, so a
//! collision there is reported against the email field. Empty values
//! never collide. The first record by index wins; every
//! later one gets a `Duplicated` error and is dropped from the batch.

use crate::field_error::{Field, FieldError};
use crate::models::StudentRecord;
use std::collections::HashSet;

/// Split a batch into unique records and duplicate errors
pub fn dedup_batch(
    records: Vec<StudentRecord>,
    enable_username: bool,
) -> (Vec<StudentRecord>, Vec<FieldError>) {
    let mut errors = Vec::new();

    let records = dedup_pass(records, Field::UserId, &mut errors, |r| {
        r.existing_user_id().map(str::to_string)
    });
    let records = dedup_pass(records, Field::ExternalUserId, &mut errors, |r| {
        non_empty(&r.external_user_id)
    });
    let mut records = dedup_pass(records, Field::Email, &mut errors, |r| {
        non_empty(&r.email).map(|e| e.to_lowercase())
    });
    if enable_username {
        records = dedup_pass(records, Field::Username, &mut errors, |r| {
            non_empty(&r.username).map(|u| u.to_lowercase())
        });
    }

    if !errors.is_empty() {
        tracing::debug!(duplicates = errors.len(), "Removed intra-batch duplicates");
    }

    (records, errors)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn dedup_pass<F>(
    records: Vec<StudentRecord>,
    field: Field,
    errors: &mut Vec<FieldError>,
    key: F,
) -> Vec<StudentRecord>
where
    F: Fn(&StudentRecord) -> Option<String>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        match key(&record) {
            Some(value) => {
                if seen.insert(value) {
                    unique.push(record);
                } else {
                    errors.push(FieldError::duplicated(field, record.index));
                }
            }
            None => unique.push(record),
        }
    }

    unique
}
