//! Transactional student upsert

use crate::models::{PhoneNumberKind, UserRole, ValidatedStudent};
use crate::services::StudentUpserter;
use sqlx::{SqliteConnection, SqlitePool};
use usermgmt_common::Result;

/// Writes validated students and their associations in one transaction
#[derive(Clone)]
pub struct SqliteStudentUpserter {
    pool: SqlitePool,
}

impl SqliteStudentUpserter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl StudentUpserter for SqliteStudentUpserter {
    async fn upsert(
        &self,
        to_create: &[ValidatedStudent],
        to_update: &[ValidatedStudent],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for student in to_create {
            insert_user(&mut tx, student).await?;
            write_associations(&mut tx, student).await?;
        }

        for student in to_update {
            update_user(&mut tx, student).await?;
            write_associations(&mut tx, student).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            created = to_create.len(),
            updated = to_update.len(),
            "Committed student upsert"
        );
        Ok(())
    }
}

fn phone_kind_str(kind: PhoneNumberKind) -> &'static str {
    match kind {
        PhoneNumberKind::StudentPhoneNumber => "STUDENT_PHONE_NUMBER",
        PhoneNumberKind::HomePhoneNumber => "STUDENT_HOME_PHONE_NUMBER",
    }
}

async fn insert_user(conn: &mut SqliteConnection, student: &ValidatedStudent) -> Result<()> {
    let record = &student.record;
    sqlx::query(
        r#"
        INSERT INTO users (
            user_id, user_role, email, username, login_email, external_user_id,
            first_name, last_name, first_name_phonetic, last_name_phonetic,
            gender, birthday, grade_id, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(&student.user_id)
    .bind(UserRole::Student.as_str())
    .bind(record.email.trim())
    .bind(record.username.trim())
    .bind(&student.login_email)
    .bind(record.external_user_id.trim())
    .bind(record.first_name.trim())
    .bind(record.last_name.trim())
    .bind(&record.first_name_phonetic)
    .bind(&record.last_name_phonetic)
    .bind(student.gender.map(|g| g.as_str()))
    .bind(record.birthday)
    .bind(&student.grade.grade_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Login email is left as created
async fn update_user(conn: &mut SqliteConnection, student: &ValidatedStudent) -> Result<()> {
    let record = &student.record;
    sqlx::query(
        r#"
        UPDATE users SET
            email = ?,
            username = ?,
            external_user_id = CASE WHEN ? = '' THEN external_user_id ELSE ? END,
            first_name = ?,
            last_name = ?,
            first_name_phonetic = ?,
            last_name_phonetic = ?,
            gender = ?,
            birthday = ?,
            grade_id = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE user_id = ?
        "#,
    )
    .bind(record.email.trim())
    .bind(record.username.trim())
    .bind(record.external_user_id.trim())
    .bind(record.external_user_id.trim())
    .bind(record.first_name.trim())
    .bind(record.last_name.trim())
    .bind(&record.first_name_phonetic)
    .bind(&record.last_name_phonetic)
    .bind(student.gender.map(|g| g.as_str()))
    .bind(record.birthday)
    .bind(&student.grade.grade_id)
    .bind(&student.user_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn write_associations(conn: &mut SqliteConnection, student: &ValidatedStudent) -> Result<()> {
    let user_id = &student.user_id;

    sqlx::query("DELETE FROM user_tags WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    for tag in &student.tags {
        sqlx::query("INSERT INTO user_tags (user_id, tag_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(&tag.tag_id)
            .execute(&mut *conn)
            .await?;
    }

    for location in &student.locations {
        sqlx::query("INSERT OR IGNORE INTO user_access_paths (user_id, location_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(&location.location_id)
            .execute(&mut *conn)
            .await?;
    }

    for history in &student.enrollment_status_histories {
        // Close the open entry this one supersedes
        sqlx::query(
            r#"
            UPDATE student_enrollment_status_history SET end_date = ?
            WHERE student_id = ? AND location_id = ? AND end_date IS NULL AND start_date < ?
            "#,
        )
        .bind(history.start_date)
        .bind(&history.student_id)
        .bind(&history.location_id)
        .bind(history.start_date)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO student_enrollment_status_history (
                student_id, location_id, enrollment_status, start_date, end_date, order_id
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&history.student_id)
        .bind(&history.location_id)
        .bind(history.status.as_str())
        .bind(history.start_date)
        .bind(history.end_date)
        .bind(&history.order_id)
        .execute(&mut *conn)
        .await?;
    }

    for school in &student.school_histories {
        sqlx::query(
            r#"
            INSERT INTO school_history (student_id, school_id, school_course_id, start_date, end_date)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(student_id, school_id) DO UPDATE SET
                school_course_id = excluded.school_course_id,
                start_date = excluded.start_date,
                end_date = excluded.end_date
            "#,
        )
        .bind(user_id)
        .bind(&school.school.school_id)
        .bind(school.school_course.as_ref().map(|c| c.school_course_id.as_str()))
        .bind(school.start_date)
        .bind(school.end_date)
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query("DELETE FROM user_phone_numbers WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    for phone in &student.phone_numbers {
        sqlx::query(
            "INSERT INTO user_phone_numbers (user_id, phone_number_type, phone_number) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(phone_kind_str(phone.kind))
        .bind(phone.number.trim())
        .execute(&mut *conn)
        .await?;
    }

    if let Some(address) = &student.address {
        sqlx::query(
            r#"
            INSERT INTO user_addresses (
                user_id, prefecture_id, postal_code, city, first_street, second_street
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                prefecture_id = excluded.prefecture_id,
                postal_code = excluded.postal_code,
                city = excluded.city,
                first_street = excluded.first_street,
                second_street = excluded.second_street
            "#,
        )
        .bind(user_id)
        .bind(address.prefecture.as_ref().map(|p| p.prefecture_id.as_str()))
        .bind(&address.postal_code)
        .bind(&address.city)
        .bind(&address.first_street)
        .bind(&address.second_street)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
