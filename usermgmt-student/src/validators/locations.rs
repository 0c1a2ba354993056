//! Location assignment validation

use super::{first_duplicate_position, FieldResult};
use crate::field_error::{Field, FieldError, InvalidReason};
use crate::models::{Location, StudentRecord};
use std::collections::HashMap;

/// Resolve every location against lowest-level locations
pub fn validate_locations(
    record: &StudentRecord,
    locations: &HashMap<String, Location>,
) -> FieldResult<Vec<Location>> {
    let index = record.index;

    if first_duplicate_position(record.locations.iter().map(|l| l.trim())).is_some() {
        return Err(FieldError::duplicated(Field::Locations, index));
    }

    record
        .locations
        .iter()
        .map(|partner_id| {
            let partner_id = partner_id.trim();
            if partner_id.is_empty() {
                return Err(FieldError::invalid(Field::Locations, index, InvalidReason::Empty));
            }
            locations
                .get(partner_id)
                .cloned()
                .ok_or_else(|| FieldError::not_found(Field::Locations, index, partner_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> HashMap<String, Location> {
        ["L1", "L2"]
            .into_iter()
            .map(|p| {
                (
                    p.to_string(),
                    Location {
                        location_id: format!("loc-{}", p),
                        partner_internal_id: p.to_string(),
                        name: p.to_string(),
                    },
                )
            })
            .collect()
    }

    fn record(partner_ids: &[&str]) -> StudentRecord {
        StudentRecord {
            index: 0,
            locations: partner_ids.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolves_in_order() {
        let resolved = validate_locations(&record(&["L2", "L1"]), &locations()).unwrap();
        assert_eq!(resolved[0].location_id, "loc-L2");
        assert_eq!(resolved[1].location_id, "loc-L1");
    }

    #[test]
    fn test_duplicate_checked_first() {
        assert_eq!(
            validate_locations(&record(&["L9", "L9"]), &locations()),
            Err(FieldError::duplicated(Field::Locations, 0))
        );
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(
            validate_locations(&record(&["L1", ""]), &locations()),
            Err(FieldError::invalid(Field::Locations, 0, InvalidReason::Empty))
        );
        assert_eq!(
            validate_locations(&record(&["L3"]), &locations()),
            Err(FieldError::not_found(Field::Locations, 0, "L3"))
        );
    }
}
