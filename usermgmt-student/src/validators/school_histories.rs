//! School history validation
//!
//! Errors are nested under `school_histories[i]`. A student holds at most
//! one school per school level.

use super::FieldResult;
use crate::field_error::{Field, FieldError, InvalidReason, NestedField};
use crate::models::{ResolvedSchoolHistory, School, SchoolCourse, StudentRecord};
use std::collections::{HashMap, HashSet};

pub fn validate_school_histories(
    record: &StudentRecord,
    schools: &HashMap<String, School>,
    school_courses: &HashMap<String, SchoolCourse>,
) -> FieldResult<Vec<ResolvedSchoolHistory>> {
    let index = record.index;
    let mut seen_schools = HashSet::new();
    let mut seen_courses = HashSet::new();
    let mut seen_levels = HashSet::new();
    let mut resolved = Vec::with_capacity(record.school_histories.len());

    for (position, history) in record.school_histories.iter().enumerate() {
        let nest = |err: FieldError| err.nested(NestedField::SchoolHistories, position);

        let school_partner_id = history.school.trim();
        if school_partner_id.is_empty() {
            return Err(nest(FieldError::invalid(Field::School, index, InvalidReason::Empty)));
        }

        if let (Some(start), Some(end)) = (history.start_date, history.end_date) {
            if start > end {
                return Err(nest(FieldError::invalid(
                    Field::SchoolHistoryStartDate,
                    index,
                    InvalidReason::StartDateAfterEndDate,
                )));
            }
        }

        if !seen_schools.insert(school_partner_id) {
            return Err(nest(FieldError::duplicated(Field::School, index)));
        }

        let school = schools
            .get(school_partner_id)
            .ok_or_else(|| nest(FieldError::not_found(Field::School, index, school_partner_id)))?;

        if school.is_archived {
            return Err(nest(FieldError::invalid(Field::School, index, InvalidReason::Archived)));
        }

        if !seen_levels.insert(school.school_level_id.as_str()) {
            return Err(nest(FieldError::invalid(
                Field::School,
                index,
                InvalidReason::AlreadyRegistered,
            )));
        }

        let course_partner_id = history
            .school_course
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        let school_course = match course_partner_id {
            None => None,
            Some(course_partner_id) => {
                if !seen_courses.insert(course_partner_id) {
                    return Err(nest(FieldError::duplicated(Field::SchoolCourse, index)));
                }

                let course = school_courses.get(course_partner_id).ok_or_else(|| {
                    nest(FieldError::not_found(Field::SchoolCourse, index, course_partner_id))
                })?;

                if course.is_archived {
                    return Err(nest(FieldError::invalid(
                        Field::SchoolCourse,
                        index,
                        InvalidReason::Archived,
                    )));
                }

                if course.school_id != school.school_id {
                    return Err(nest(FieldError::invalid(
                        Field::SchoolCourse,
                        index,
                        InvalidReason::NotMatching,
                    )));
                }

                Some(course.clone())
            }
        };

        resolved.push(ResolvedSchoolHistory {
            school: school.clone(),
            school_course,
            start_date: history.start_date,
            end_date: history.end_date,
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SchoolHistoryInput;
    use chrono::{Duration, Utc};

    fn school(partner_id: &str, level: &str, archived: bool) -> (String, School) {
        (
            partner_id.to_string(),
            School {
                school_id: format!("school-{}", partner_id),
                partner_internal_id: partner_id.to_string(),
                name: partner_id.to_string(),
                school_level_id: level.to_string(),
                is_archived: archived,
            },
        )
    }

    fn course(partner_id: &str, school_partner_id: &str, archived: bool) -> (String, SchoolCourse) {
        (
            partner_id.to_string(),
            SchoolCourse {
                school_course_id: format!("course-{}", partner_id),
                partner_internal_id: partner_id.to_string(),
                school_id: format!("school-{}", school_partner_id),
                name: partner_id.to_string(),
                is_archived: archived,
            },
        )
    }

    fn schools() -> HashMap<String, School> {
        HashMap::from([
            school("ELEM", "elementary", false),
            school("JHS", "junior-high", false),
            school("JHS2", "junior-high", false),
            school("OLD", "high", true),
        ])
    }

    fn courses() -> HashMap<String, SchoolCourse> {
        HashMap::from([
            course("C-ELEM", "ELEM", false),
            course("C-JHS", "JHS", false),
            course("C-ARCH", "JHS", true),
        ])
    }

    fn entry(school: &str, course: Option<&str>) -> SchoolHistoryInput {
        SchoolHistoryInput {
            school: school.to_string(),
            school_course: course.map(str::to_string),
            start_date: None,
            end_date: None,
        }
    }

    fn record(entries: Vec<SchoolHistoryInput>) -> StudentRecord {
        StudentRecord {
            index: 0,
            school_histories: entries,
            ..Default::default()
        }
    }

    fn check(entries: Vec<SchoolHistoryInput>) -> FieldResult<Vec<ResolvedSchoolHistory>> {
        validate_school_histories(&record(entries), &schools(), &courses())
    }

    #[test]
    fn test_valid_histories_resolve() {
        let resolved = check(vec![entry("ELEM", Some("C-ELEM")), entry("JHS", None)]).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].school_course.as_ref().unwrap().school_course_id, "course-C-ELEM");
        assert!(resolved[1].school_course.is_none());
    }

    #[test]
    fn test_errors_are_nested_at_entry() {
        let err = check(vec![entry("ELEM", None), entry("OLD", None)]).unwrap_err();
        assert_eq!(
            err,
            FieldError::invalid(Field::School, 0, InvalidReason::Archived)
                .nested(NestedField::SchoolHistories, 1)
        );
    }

    #[test]
    fn test_start_after_end() {
        let mut e = entry("ELEM", None);
        e.start_date = Some(Utc::now());
        e.end_date = Some(Utc::now() - Duration::days(1));
        assert_eq!(
            check(vec![e]).unwrap_err().reason(),
            Some(InvalidReason::StartDateAfterEndDate)
        );
    }

    #[test]
    fn test_same_school_level_already_registered() {
        assert_eq!(
            check(vec![entry("JHS", None), entry("JHS2", None)]).unwrap_err().reason(),
            Some(InvalidReason::AlreadyRegistered)
        );
    }

    #[test]
    fn test_duplicate_school() {
        assert_eq!(
            check(vec![entry("ELEM", None), entry("ELEM", None)]).unwrap_err(),
            FieldError::duplicated(Field::School, 0).nested(NestedField::SchoolHistories, 1)
        );
    }

    #[test]
    fn test_unknown_school() {
        assert_eq!(
            check(vec![entry("NOPE", None)]).unwrap_err(),
            FieldError::not_found(Field::School, 0, "NOPE").nested(NestedField::SchoolHistories, 0)
        );
    }

    #[test]
    fn test_course_rules() {
        assert_eq!(
            check(vec![entry("ELEM", Some("C-JHS"))]).unwrap_err().reason(),
            Some(InvalidReason::NotMatching)
        );
        assert_eq!(
            check(vec![entry("JHS", Some("C-ARCH"))]).unwrap_err().reason(),
            Some(InvalidReason::Archived)
        );
        assert_eq!(
            check(vec![entry("JHS", Some("C-NONE"))]).unwrap_err(),
            FieldError::not_found(Field::SchoolCourse, 0, "C-NONE")
                .nested(NestedField::SchoolHistories, 0)
        );
    }

    #[test]
    fn test_empty_school_partner_id() {
        assert_eq!(
            check(vec![entry("", None)]).unwrap_err().reason(),
            Some(InvalidReason::Empty)
        );
    }
}
