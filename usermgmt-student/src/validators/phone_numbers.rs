//! Phone number validation
//!
//! Errors are nested under `phone_numbers[i]` and name the field of the
//! entry's kind.

use super::FieldResult;
use crate::field_error::{Field, FieldError, InvalidReason, NestedField};
use crate::models::{PhoneNumberInput, PhoneNumberKind, StudentRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static PHONE_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{7,20}$").expect("phone number pattern is valid"));

fn field_for(kind: PhoneNumberKind) -> Field {
    match kind {
        PhoneNumberKind::StudentPhoneNumber => Field::StudentPhoneNumber,
        PhoneNumberKind::HomePhoneNumber => Field::HomePhoneNumber,
    }
}

/// Non-empty numbers, validated; blank entries are dropped
pub fn validate_phone_numbers(record: &StudentRecord) -> FieldResult<Vec<PhoneNumberInput>> {
    let index = record.index;
    let mut seen_kinds = HashSet::new();
    let mut seen_numbers = HashSet::new();
    let mut validated = Vec::with_capacity(record.phone_numbers.len());

    for (position, phone) in record.phone_numbers.iter().enumerate() {
        let number = phone.number.trim();
        if number.is_empty() {
            continue;
        }

        let field = field_for(phone.kind);
        let nest = |err: FieldError| err.nested(NestedField::PhoneNumbers, position);

        if !PHONE_NUMBER_PATTERN.is_match(number) {
            return Err(nest(FieldError::invalid(
                field,
                index,
                InvalidReason::NotMatchingPattern,
            )));
        }

        if !seen_kinds.insert(phone.kind) || !seen_numbers.insert(number) {
            return Err(nest(FieldError::duplicated(field, index)));
        }

        validated.push(PhoneNumberInput {
            number: number.to_string(),
            kind: phone.kind,
        });
    }

    Ok(validated)
}
