//! SQLite implementations of the repository traits
//!
//! Every repository owns a clone of the pool. Lookups bind the whole key
//! list into one `IN (...)` query, so a batch costs one round trip per
//! entity kind.

pub mod enrollment;
pub mod reference;
pub mod students;
pub mod users;

pub use enrollment::SqliteEnrollmentStatusHistoryRepository;
pub use reference::{
    SqliteGradeRepository, SqliteLocationRepository, SqlitePrefectureRepository,
    SqliteSchoolCourseRepository, SqliteSchoolRepository, SqliteTagRepository,
};
pub use students::SqliteStudentUpserter;
pub use users::SqliteUserRepository;

use crate::repository::Repositories;
use sqlx::sqlite::SqliteArguments;
use sqlx::query::Query;
use sqlx::{Sqlite, SqlitePool};
use std::sync::Arc;

impl Repositories {
    /// All capabilities backed by one SQLite pool
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            grades: Arc::new(SqliteGradeRepository::new(pool.clone())),
            tags: Arc::new(SqliteTagRepository::new(pool.clone())),
            schools: Arc::new(SqliteSchoolRepository::new(pool.clone())),
            school_courses: Arc::new(SqliteSchoolCourseRepository::new(pool.clone())),
            locations: Arc::new(SqliteLocationRepository::new(pool.clone())),
            prefectures: Arc::new(SqlitePrefectureRepository::new(pool.clone())),
            users: Arc::new(SqliteUserRepository::new(pool.clone())),
            enrollment_histories: Arc::new(SqliteEnrollmentStatusHistoryRepository::new(pool)),
        }
    }
}

/// `?, ?, ?` for an `IN (...)` clause of `count` values
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Bind every key of an `IN (...)` clause
pub(crate) fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    keys: &'q [String],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for key in keys {
        query = query.bind(key);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
