//! Grade reference validation

use super::FieldResult;
use crate::field_error::{Field, FieldError};
use crate::models::{Grade, StudentRecord};
use std::collections::HashMap;

/// Resolve the record's grade by partner-internal ID
pub fn validate_grade(record: &StudentRecord, grades: &HashMap<String, Grade>) -> FieldResult<Grade> {
    let partner_id = record.grade.trim();
    if partner_id.is_empty() {
        return Err(FieldError::missing(Field::Grade, record.index));
    }

    grades
        .get(partner_id)
        .cloned()
        .ok_or_else(|| FieldError::not_found(Field::Grade, record.index, partner_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grades() -> HashMap<String, Grade> {
        let grade = Grade {
            grade_id: "grade-1".to_string(),
            partner_internal_id: "G1".to_string(),
            name: "Grade 1".to_string(),
        };
        HashMap::from([("G1".to_string(), grade)])
    }

    fn record(grade: &str) -> StudentRecord {
        StudentRecord {
            index: 4,
            grade: grade.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolves_known_grade() {
        assert_eq!(validate_grade(&record("G1"), &grades()).unwrap().grade_id, "grade-1");
    }

    #[test]
    fn test_empty_grade_is_missing() {
        assert_eq!(
            validate_grade(&record("  "), &grades()),
            Err(FieldError::missing(Field::Grade, 4))
        );
    }

    #[test]
    fn test_unknown_grade_reports_value() {
        assert_eq!(
            validate_grade(&record("G9"), &grades()),
            Err(FieldError::not_found(Field::Grade, 4, "G9"))
        );
    }
}
