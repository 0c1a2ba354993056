//! Collision checks of unique identifiers against persisted users
//!
//! Creating: any existing owner is a collision.
//! Updating: the record's own user may keep its values; another owner is
//! a collision, and an external user ID, once set, cannot change.

use super::FieldResult;
use crate::field_error::{Field, FieldError};
use crate::models::{ExistingUser, StudentRecord, UserRole};
use crate::reference_data::ReferenceData;

/// Checks for a record without a user ID
pub fn validate_for_creating(record: &StudentRecord, refs: &ReferenceData) -> FieldResult<()> {
    let index = record.index;

    let external_id = record.external_user_id.trim();
    if !external_id.is_empty() && refs.users_by_external_id.contains_key(external_id) {
        return Err(FieldError::existing(Field::ExternalUserId, index));
    }

    if refs.user_by_email(record.email.trim()).is_some() {
        return Err(FieldError::existing(Field::Email, index));
    }

    if refs.user_by_username(record.username.trim()).is_some() {
        return Err(FieldError::existing(Field::Username, index));
    }

    Ok(())
}

/// Checks for a record updating an existing user; returns that user
pub fn validate_for_updating<'a>(
    record: &StudentRecord,
    refs: &'a ReferenceData,
) -> FieldResult<&'a ExistingUser> {
    let index = record.index;
    let user_id = record.existing_user_id().unwrap_or_default();

    let current = refs
        .users_by_id
        .get(user_id)
        .ok_or_else(|| FieldError::not_found(Field::UserId, index, user_id))?;

    validate_external_user_id_for_updating(record, current, refs)?;

    if let Some(owner) = refs.user_by_email(record.email.trim()) {
        if owner.user_id != current.user_id {
            return Err(FieldError::existing(Field::Email, index));
        }
    }

    if let Some(owner) = refs.user_by_username(record.username.trim()) {
        if owner.user_id != current.user_id {
            return Err(FieldError::existing(Field::Username, index));
        }
    }

    Ok(current)
}

fn validate_external_user_id_for_updating(
    record: &StudentRecord,
    current: &ExistingUser,
    refs: &ReferenceData,
) -> FieldResult<()> {
    let index = record.index;
    let requested = record.external_user_id.trim();

    if !requested.is_empty() {
        if let Some(owner) = refs.users_by_external_id.get(requested) {
            // Held by a staff or parent account
            if owner.role != UserRole::Student {
                return Err(FieldError::existing(Field::ExternalUserId, index));
            }
            if owner.user_id != current.user_id {
                return Err(FieldError::existing(Field::ExternalUserId, index));
            }
        }
    }

    let persisted = current.external_user_id.trim();
    if !persisted.is_empty() && persisted != requested {
        return Err(FieldError::update(Field::ExternalUserId, index));
    }

    Ok(())
}
