//! User address validation

use super::FieldResult;
use crate::field_error::{Field, FieldError};
use crate::models::{Prefecture, ResolvedAddress, StudentRecord};
use std::collections::HashMap;

/// Resolve the address prefecture; an absent prefecture is valid
pub fn validate_user_address(
    record: &StudentRecord,
    prefectures: &HashMap<String, Prefecture>,
) -> FieldResult<Option<ResolvedAddress>> {
    let Some(address) = &record.address else {
        return Ok(None);
    };

    let prefecture = match address
        .prefecture_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
    {
        None => None,
        Some(code) => Some(
            prefectures
                .get(code)
                .cloned()
                .ok_or_else(|| FieldError::not_found(Field::Prefecture, record.index, code))?,
        ),
    };

    Ok(Some(ResolvedAddress {
        prefecture,
        postal_code: address.postal_code.clone(),
        city: address.city.clone(),
        first_street: address.first_street.clone(),
        second_street: address.second_street.clone(),
    }))
}
