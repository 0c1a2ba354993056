//! Gender, name, email and username checks shared by creates and updates

use super::FieldResult;
use crate::field_error::{Field, FieldError, InvalidReason};
use crate::models::{Gender, StudentRecord};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9@._+\-]+$").expect("username pattern is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_PATTERN.is_match(username)
}

/// Absent gender is allowed; NONE and unknown values are not
pub fn validate_gender(record: &StudentRecord) -> FieldResult<Option<Gender>> {
    match record.gender.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Gender::parse(raw).map(Some).ok_or_else(|| {
            FieldError::invalid(Field::Gender, record.index, InvalidReason::NotMatchingEnum)
        }),
    }
}

pub fn validate_names(record: &StudentRecord) -> FieldResult<()> {
    if record.first_name.trim().is_empty() {
        return Err(FieldError::missing(Field::FirstName, record.index));
    }
    if record.last_name.trim().is_empty() {
        return Err(FieldError::missing(Field::LastName, record.index));
    }
    Ok(())
}

pub fn validate_email(record: &StudentRecord) -> FieldResult<()> {
    let email = record.email.trim();
    if email.is_empty() {
        return Err(FieldError::missing(Field::Email, record.index));
    }
    if !is_valid_email(email) {
        return Err(FieldError::invalid(
            Field::Email,
            record.index,
            InvalidReason::NotMatchingPattern,
        ));
    }
    Ok(())
}

/// Username is only checked when it is a distinct login identifier
pub fn validate_username(record: &StudentRecord, enable_username: bool) -> FieldResult<()> {
    if !enable_username {
        return Ok(());
    }
    let username = record.username.trim();
    if username.is_empty() {
        return Err(FieldError::missing(Field::Username, record.index));
    }
    if !is_valid_username(username) {
        return Err(FieldError::invalid(
            Field::Username,
            record.index,
            InvalidReason::NotMatchingPattern,
        ));
    }
    Ok(())
}

/// Every identity check in order: gender, names, email, username
pub fn validate_identity(record: &StudentRecord, enable_username: bool) -> FieldResult<Option<Gender>> {
    let gender = validate_gender(record)?;
    validate_names(record)?;
    validate_email(record)?;
    validate_username(record, enable_username)?;
    Ok(gender)
}
