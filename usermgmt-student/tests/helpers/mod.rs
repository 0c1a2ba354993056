//! Shared fixtures for the student validation integration tests
//!
//! `FakeStore` implements every repository trait over plain vectors and
//! counts calls per lookup kind.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use usermgmt_common::{Error, Result};
use usermgmt_student::models::{
    EnrollmentStatus, EnrollmentStatusHistory, EnrollmentStatusInput, ExistingUser, Grade,
    Location, Prefecture, School, SchoolCourse, StudentRecord, Tag, TagType, UserRole,
};
use usermgmt_student::repository::{
    EnrollmentStatusHistoryRepository, GradeRepository, LocationRepository, PrefectureRepository,
    Repositories, SchoolCourseRepository, SchoolRepository, TagRepository, UserRepository,
};
use usermgmt_student::{ValidationManager, ValidationSettings};

pub const EXISTING_STUDENT_ID: &str = "student-existing";

/// Fixed validation clock
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    fixed_now() - chrono::Duration::days(days)
}

#[derive(Default)]
pub struct FakeStore {
    pub grades: Vec<Grade>,
    pub tags: Vec<Tag>,
    pub schools: Vec<School>,
    pub school_courses: Vec<SchoolCourse>,
    pub locations: Vec<Location>,
    pub prefectures: Vec<Prefecture>,
    pub users: Vec<ExistingUser>,
    pub histories: Vec<EnrollmentStatusHistory>,
    /// Lookup kind that fails with a repository error
    pub fail_kind: Option<&'static str>,
    /// Added latency of every lookup
    pub delay: Option<Duration>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeStore {
    /// Store with one of everything a valid record needs
    pub fn seeded() -> Self {
        Self {
            grades: vec![Grade {
                grade_id: "grade-1".to_string(),
                partner_internal_id: "G1".to_string(),
                name: "Grade 1".to_string(),
            }],
            tags: vec![
                Tag {
                    tag_id: "tag-student".to_string(),
                    partner_internal_id: "TAG-S".to_string(),
                    name: "Scholarship".to_string(),
                    tag_type: TagType::Student,
                },
                Tag {
                    tag_id: "tag-parent".to_string(),
                    partner_internal_id: "TAG-P".to_string(),
                    name: "Parent newsletter".to_string(),
                    tag_type: TagType::Parent,
                },
            ],
            schools: vec![School {
                school_id: "school-1".to_string(),
                partner_internal_id: "SCH-1".to_string(),
                name: "North Elementary".to_string(),
                school_level_id: "level-elementary".to_string(),
                is_archived: false,
            }],
            school_courses: vec![SchoolCourse {
                school_course_id: "course-1".to_string(),
                partner_internal_id: "CRS-1".to_string(),
                school_id: "school-1".to_string(),
                name: "General".to_string(),
                is_archived: false,
            }],
            locations: vec![location("loc-1", "LOC-1"), location("loc-2", "LOC-2")],
            prefectures: vec![Prefecture {
                prefecture_id: "pref-13".to_string(),
                prefecture_code: "13".to_string(),
                name: "Tokyo".to_string(),
            }],
            users: vec![ExistingUser {
                user_id: EXISTING_STUDENT_ID.to_string(),
                email: "existing@example.com".to_string(),
                username: "existing@example.com".to_string(),
                external_user_id: "EXT-1".to_string(),
                role: UserRole::Student,
            }],
            histories: vec![history("loc-1", EnrollmentStatus::Enrolled, days_ago(30))],
            ..Default::default()
        }
    }

    pub fn with_histories(mut self, histories: Vec<EnrollmentStatusHistory>) -> Self {
        self.histories = histories;
        self
    }

    pub fn failing(mut self, kind: &'static str) -> Self {
        self.fail_kind = Some(kind);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls made for a lookup kind
    pub fn calls(&self, kind: &str) -> usize {
        self.calls.lock().unwrap().get(kind).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    async fn record_call(&self, kind: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(kind).or_insert(0) += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_kind == Some(kind) {
            return Err(Error::Repository(format!("{} backend unavailable", kind)));
        }
        Ok(())
    }
}

pub fn location(id: &str, partner_id: &str) -> Location {
    Location {
        location_id: id.to_string(),
        partner_internal_id: partner_id.to_string(),
        name: format!("Campus {}", partner_id),
    }
}

/// Persisted history entry of the existing student
pub fn history(
    location_id: &str,
    status: EnrollmentStatus,
    start: DateTime<Utc>,
) -> EnrollmentStatusHistory {
    EnrollmentStatusHistory {
        student_id: EXISTING_STUDENT_ID.to_string(),
        location_id: location_id.to_string(),
        status,
        start_date: start,
        end_date: None,
        order_id: None,
    }
}

fn matching<T: Clone>(items: &[T], keys: &[String], key: impl Fn(&T) -> String) -> Vec<T> {
    items
        .iter()
        .filter(|item| keys.contains(&key(item)))
        .cloned()
        .collect()
}

fn lowercased(keys: &[String]) -> Vec<String> {
    keys.iter().map(|k| k.to_lowercase()).collect()
}

#[async_trait::async_trait]
impl GradeRepository for FakeStore {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<Grade>> {
        self.record_call("grades").await?;
        Ok(matching(&self.grades, ids, |g| g.partner_internal_id.clone()))
    }
}

#[async_trait::async_trait]
impl TagRepository for FakeStore {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<Tag>> {
        self.record_call("tags").await?;
        Ok(matching(&self.tags, ids, |t| t.partner_internal_id.clone()))
    }
}

#[async_trait::async_trait]
impl SchoolRepository for FakeStore {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<School>> {
        self.record_call("schools").await?;
        Ok(matching(&self.schools, ids, |s| s.partner_internal_id.clone()))
    }
}

#[async_trait::async_trait]
impl SchoolCourseRepository for FakeStore {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<SchoolCourse>> {
        self.record_call("school_courses").await?;
        Ok(matching(&self.school_courses, ids, |c| c.partner_internal_id.clone()))
    }
}

#[async_trait::async_trait]
impl LocationRepository for FakeStore {
    async fn get_lowest_level_by_partner_internal_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<Location>> {
        self.record_call("locations").await?;
        Ok(matching(&self.locations, ids, |l| l.partner_internal_id.clone()))
    }
}

#[async_trait::async_trait]
impl PrefectureRepository for FakeStore {
    async fn get_by_prefecture_codes(&self, codes: &[String]) -> Result<Vec<Prefecture>> {
        self.record_call("prefectures").await?;
        Ok(matching(&self.prefectures, codes, |p| p.prefecture_code.clone()))
    }
}

#[async_trait::async_trait]
impl UserRepository for FakeStore {
    async fn get_by_usernames(&self, usernames: &[String]) -> Result<Vec<ExistingUser>> {
        self.record_call("users_by_username").await?;
        Ok(matching(&self.users, &lowercased(usernames), |u| u.username.to_lowercase()))
    }

    async fn get_by_emails(&self, emails: &[String]) -> Result<Vec<ExistingUser>> {
        self.record_call("users_by_email").await?;
        Ok(matching(&self.users, &lowercased(emails), |u| u.email.to_lowercase()))
    }

    async fn get_by_external_user_ids(&self, ids: &[String]) -> Result<Vec<ExistingUser>> {
        self.record_call("users_by_external_id").await?;
        Ok(matching(&self.users, ids, |u| u.external_user_id.clone()))
    }

    async fn get_by_ids(&self, user_ids: &[String]) -> Result<Vec<ExistingUser>> {
        self.record_call("users_by_id").await?;
        Ok(matching(&self.users, user_ids, |u| u.user_id.clone()))
    }
}

#[async_trait::async_trait]
impl EnrollmentStatusHistoryRepository for FakeStore {
    async fn get_by_student_ids(
        &self,
        student_ids: &[String],
    ) -> Result<Vec<EnrollmentStatusHistory>> {
        self.record_call("enrollment_histories").await?;
        Ok(matching(&self.histories, student_ids, |h| h.student_id.clone()))
    }
}

/// Every capability backed by the same fake
pub fn repositories(store: &Arc<FakeStore>) -> Repositories {
    Repositories {
        grades: store.clone(),
        tags: store.clone(),
        schools: store.clone(),
        school_courses: store.clone(),
        locations: store.clone(),
        prefectures: store.clone(),
        users: store.clone(),
        enrollment_histories: store.clone(),
    }
}

/// Manager over `store` with the fixed clock and default settings
pub fn manager(store: &Arc<FakeStore>) -> ValidationManager {
    ValidationManager::new(repositories(store), ValidationSettings::default()).with_clock(fixed_now)
}

pub fn enrollment(status: &str, start: Option<DateTime<Utc>>) -> EnrollmentStatusInput {
    EnrollmentStatusInput {
        status: status.to_string(),
        start_date: start,
        end_date: None,
        order_id: None,
    }
}

/// New student that passes every validator against `FakeStore::seeded`
pub fn new_student(n: usize) -> StudentRecord {
    StudentRecord {
        first_name: format!("Student{}", n),
        last_name: "Tanaka".to_string(),
        email: format!("student{}@example.com", n),
        grade: "G1".to_string(),
        locations: vec!["LOC-1".to_string()],
        enrollment_status_histories: vec![enrollment("ENROLLED", Some(days_ago(1)))],
        ..Default::default()
    }
}

/// Update of the seeded existing student that changes nothing
pub fn existing_student() -> StudentRecord {
    StudentRecord {
        user_id: Some(EXISTING_STUDENT_ID.to_string()),
        external_user_id: "EXT-1".to_string(),
        first_name: "Existing".to_string(),
        last_name: "Student".to_string(),
        email: "existing@example.com".to_string(),
        grade: "G1".to_string(),
        locations: vec!["LOC-1".to_string()],
        enrollment_status_histories: vec![enrollment("ENROLLED", Some(days_ago(30)))],
        ..Default::default()
    }
}
