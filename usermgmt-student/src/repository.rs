//! Repository capability traits consumed by the validation core
//!
//! One narrow trait per lookup concern so that tests can substitute
//! in-memory fakes for any subset. Every bulk lookup:
//! - takes the full identifier list for one batch
//! - returns only the matched entities (unmatched IDs are absent, not errors)
//! - fails only on storage or transport errors
//!
//! Implementations own their connection handle.

use crate::models::{
    EnrollmentStatusHistory, ExistingUser, Grade, Location, Prefecture, School, SchoolCourse, Tag,
};
use std::sync::Arc;
use usermgmt_common::Result;

#[async_trait::async_trait]
pub trait GradeRepository: Send + Sync {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<Grade>>;
}

#[async_trait::async_trait]
pub trait TagRepository: Send + Sync {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<Tag>>;
}

#[async_trait::async_trait]
pub trait SchoolRepository: Send + Sync {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<School>>;
}

#[async_trait::async_trait]
pub trait SchoolCourseRepository: Send + Sync {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<SchoolCourse>>;
}

#[async_trait::async_trait]
pub trait LocationRepository: Send + Sync {
    /// Only lowest-level locations are returned
    async fn get_lowest_level_by_partner_internal_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<Location>>;
}

#[async_trait::async_trait]
pub trait PrefectureRepository: Send + Sync {
    async fn get_by_prefecture_codes(&self, codes: &[String]) -> Result<Vec<Prefecture>>;
}

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Case-insensitive match
    async fn get_by_usernames(&self, usernames: &[String]) -> Result<Vec<ExistingUser>>;

    /// Case-insensitive match
    async fn get_by_emails(&self, emails: &[String]) -> Result<Vec<ExistingUser>>;

    async fn get_by_external_user_ids(&self, ids: &[String]) -> Result<Vec<ExistingUser>>;

    async fn get_by_ids(&self, user_ids: &[String]) -> Result<Vec<ExistingUser>>;
}

#[async_trait::async_trait]
pub trait EnrollmentStatusHistoryRepository: Send + Sync {
    async fn get_by_student_ids(
        &self,
        student_ids: &[String],
    ) -> Result<Vec<EnrollmentStatusHistory>>;
}

/// Capabilities injected into the validation manager
#[derive(Clone)]
pub struct Repositories {
    pub grades: Arc<dyn GradeRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub schools: Arc<dyn SchoolRepository>,
    pub school_courses: Arc<dyn SchoolCourseRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub prefectures: Arc<dyn PrefectureRepository>,
    pub users: Arc<dyn UserRepository>,
    pub enrollment_histories: Arc<dyn EnrollmentStatusHistoryRepository>,
}
