//! Reference entity lookups by partner-internal ID

use super::{bind_all, placeholders};
use crate::models::{Grade, Location, Prefecture, School, SchoolCourse, Tag, TagType};
use crate::repository::{
    GradeRepository, LocationRepository, PrefectureRepository, SchoolCourseRepository,
    SchoolRepository, TagRepository,
};
use sqlx::{Row, SqlitePool};
use usermgmt_common::{Error, Result};

macro_rules! sqlite_repository {
    ($name:ident) => {
        #[derive(Clone)]
        pub struct $name {
            pool: SqlitePool,
        }

        impl $name {
            pub fn new(pool: SqlitePool) -> Self {
                Self { pool }
            }
        }
    };
}

sqlite_repository!(SqliteGradeRepository);
sqlite_repository!(SqliteTagRepository);
sqlite_repository!(SqliteSchoolRepository);
sqlite_repository!(SqliteSchoolCourseRepository);
sqlite_repository!(SqliteLocationRepository);
sqlite_repository!(SqlitePrefectureRepository);

#[async_trait::async_trait]
impl GradeRepository for SqliteGradeRepository {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<Grade>> {
        let sql = format!(
            "SELECT grade_id, partner_internal_id, name FROM grades \
             WHERE partner_internal_id IN ({})",
            placeholders(ids.len())
        );
        let rows = bind_all(sqlx::query(&sql), ids).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<Grade> {
                Ok(Grade {
                    grade_id: row.try_get("grade_id")?,
                    partner_internal_id: row.try_get("partner_internal_id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl TagRepository for SqliteTagRepository {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT tag_id, partner_internal_id, name, tag_type FROM tags \
             WHERE partner_internal_id IN ({}) AND is_archived = 0",
            placeholders(ids.len())
        );
        let rows = bind_all(sqlx::query(&sql), ids).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<Tag> {
                let raw_type: String = row.try_get("tag_type")?;
                let tag_type = TagType::parse(&raw_type).ok_or_else(|| {
                    Error::Repository(format!("Unknown tag type in storage: {}", raw_type))
                })?;
                Ok(Tag {
                    tag_id: row.try_get("tag_id")?,
                    partner_internal_id: row.try_get("partner_internal_id")?,
                    name: row.try_get("name")?,
                    tag_type,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SchoolRepository for SqliteSchoolRepository {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<School>> {
        let sql = format!(
            "SELECT school_id, partner_internal_id, name, school_level_id, is_archived \
             FROM schools WHERE partner_internal_id IN ({})",
            placeholders(ids.len())
        );
        let rows = bind_all(sqlx::query(&sql), ids).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<School> {
                Ok(School {
                    school_id: row.try_get("school_id")?,
                    partner_internal_id: row.try_get("partner_internal_id")?,
                    name: row.try_get("name")?,
                    school_level_id: row.try_get("school_level_id")?,
                    is_archived: row.try_get("is_archived")?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SchoolCourseRepository for SqliteSchoolCourseRepository {
    async fn get_by_partner_internal_ids(&self, ids: &[String]) -> Result<Vec<SchoolCourse>> {
        let sql = format!(
            "SELECT school_course_id, partner_internal_id, school_id, name, is_archived \
             FROM school_courses WHERE partner_internal_id IN ({})",
            placeholders(ids.len())
        );
        let rows = bind_all(sqlx::query(&sql), ids).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<SchoolCourse> {
                Ok(SchoolCourse {
                    school_course_id: row.try_get("school_course_id")?,
                    partner_internal_id: row.try_get("partner_internal_id")?,
                    school_id: row.try_get("school_id")?,
                    name: row.try_get("name")?,
                    is_archived: row.try_get("is_archived")?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl LocationRepository for SqliteLocationRepository {
    async fn get_lowest_level_by_partner_internal_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<Location>> {
        // Lowest level: no location names this one as its parent
        let sql = format!(
            "SELECT l.location_id, l.partner_internal_id, l.name FROM locations l \
             WHERE l.partner_internal_id IN ({}) AND l.is_archived = 0 \
             AND NOT EXISTS (SELECT 1 FROM locations c WHERE c.parent_location_id = l.location_id)",
            placeholders(ids.len())
        );
        let rows = bind_all(sqlx::query(&sql), ids).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<Location> {
                Ok(Location {
                    location_id: row.try_get("location_id")?,
                    partner_internal_id: row.try_get("partner_internal_id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl PrefectureRepository for SqlitePrefectureRepository {
    async fn get_by_prefecture_codes(&self, codes: &[String]) -> Result<Vec<Prefecture>> {
        let sql = format!(
            "SELECT prefecture_id, prefecture_code, name FROM prefectures \
             WHERE prefecture_code IN ({})",
            placeholders(codes.len())
        );
        let rows = bind_all(sqlx::query(&sql), codes).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<Prefecture> {
                Ok(Prefecture {
                    prefecture_id: row.try_get("prefecture_id")?,
                    prefecture_code: row.try_get("prefecture_code")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }
}
