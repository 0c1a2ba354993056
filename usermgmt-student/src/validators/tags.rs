//! Student tag validation

use super::FieldResult;
use crate::field_error::{Field, FieldError, InvalidReason};
use crate::models::{StudentRecord, Tag};
use std::collections::{HashMap, HashSet};

/// Resolve every tag; only student tag types are accepted
pub fn validate_tags(record: &StudentRecord, tags: &HashMap<String, Tag>) -> FieldResult<Vec<Tag>> {
    let index = record.index;
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(record.tags.len());

    for partner_id in &record.tags {
        let partner_id = partner_id.trim();
        if partner_id.is_empty() {
            return Err(FieldError::invalid(Field::Tags, index, InvalidReason::Empty));
        }
        if !seen.insert(partner_id) {
            return Err(FieldError::duplicated(Field::Tags, index));
        }

        let tag = tags
            .get(partner_id)
            .ok_or_else(|| FieldError::not_found(Field::Tags, index, partner_id))?;

        if !tag.tag_type.is_student_tag() {
            return Err(FieldError::invalid(
                Field::Tags,
                index,
                InvalidReason::NotMatchingConstants,
            ));
        }

        resolved.push(tag.clone());
    }

    Ok(resolved)
}
