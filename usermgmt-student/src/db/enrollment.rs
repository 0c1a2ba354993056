//! Persisted enrollment status history

use super::{bind_all, placeholders};
use crate::models::{EnrollmentStatus, EnrollmentStatusHistory};
use crate::repository::EnrollmentStatusHistoryRepository;
use sqlx::{Row, SqlitePool};
use usermgmt_common::{Error, Result};

#[derive(Clone)]
pub struct SqliteEnrollmentStatusHistoryRepository {
    pool: SqlitePool,
}

impl SqliteEnrollmentStatusHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EnrollmentStatusHistoryRepository for SqliteEnrollmentStatusHistoryRepository {
    async fn get_by_student_ids(
        &self,
        student_ids: &[String],
    ) -> Result<Vec<EnrollmentStatusHistory>> {
        let sql = format!(
            "SELECT student_id, location_id, enrollment_status, start_date, end_date, order_id \
             FROM student_enrollment_status_history WHERE student_id IN ({}) \
             ORDER BY student_id, location_id, start_date",
            placeholders(student_ids.len())
        );
        let rows = bind_all(sqlx::query(&sql), student_ids)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<EnrollmentStatusHistory> {
                let raw_status: String = row.try_get("enrollment_status")?;
                let status = EnrollmentStatus::parse(&raw_status).ok_or_else(|| {
                    Error::Repository(format!("Unknown enrollment status in storage: {}", raw_status))
                })?;
                Ok(EnrollmentStatusHistory {
                    student_id: row.try_get("student_id")?,
                    location_id: row.try_get("location_id")?,
                    status,
                    start_date: row.try_get("start_date")?,
                    end_date: row.try_get("end_date")?,
                    order_id: row.try_get("order_id")?,
                })
            })
            .collect()
    }
}
