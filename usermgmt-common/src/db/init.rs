//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates the user
//! management tables. Every `create_*_table` function is idempotent.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-connection settings; pragmas set here apply to every pooled connection
fn connect_options() -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT)
}

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = connect_options()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// Limited to one connection: every SQLite `:memory:` connection is a
/// separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options().in_memory(true))
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // Reference data
    create_grades_table(pool).await?;
    create_tags_table(pool).await?;
    create_schools_table(pool).await?;
    create_school_courses_table(pool).await?;
    create_locations_table(pool).await?;
    create_prefectures_table(pool).await?;

    // Users and their owned collections
    create_users_table(pool).await?;
    create_user_tags_table(pool).await?;
    create_user_access_paths_table(pool).await?;
    create_enrollment_status_history_table(pool).await?;
    create_school_history_table(pool).await?;
    create_user_phone_numbers_table(pool).await?;
    create_user_addresses_table(pool).await?;

    Ok(())
}

pub async fn create_grades_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS grades (
            grade_id TEXT PRIMARY KEY,
            partner_internal_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            sequence INTEGER NOT NULL DEFAULT 0,
            is_archived INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            tag_id TEXT PRIMARY KEY,
            partner_internal_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            tag_type TEXT NOT NULL,
            is_archived INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_schools_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schools (
            school_id TEXT PRIMARY KEY,
            partner_internal_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            school_level_id TEXT NOT NULL,
            is_archived INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_school_courses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS school_courses (
            school_course_id TEXT PRIMARY KEY,
            partner_internal_id TEXT NOT NULL UNIQUE,
            school_id TEXT NOT NULL REFERENCES schools(school_id),
            name TEXT NOT NULL,
            is_archived INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_locations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS locations (
            location_id TEXT PRIMARY KEY,
            partner_internal_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            parent_location_id TEXT REFERENCES locations(location_id),
            is_archived INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_prefectures_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prefectures (
            prefecture_id TEXT PRIMARY KEY,
            prefecture_code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            user_role TEXT NOT NULL,
            email TEXT NOT NULL,
            username TEXT NOT NULL,
            login_email TEXT NOT NULL,
            external_user_id TEXT NOT NULL DEFAULT '',
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            first_name_phonetic TEXT,
            last_name_phonetic TEXT,
            gender TEXT,
            birthday TEXT,
            grade_id TEXT REFERENCES grades(grade_id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(lower(email))")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(lower(username))")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_external_user_id ON users(external_user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_user_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_tags (
            user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
            tag_id TEXT NOT NULL REFERENCES tags(tag_id),
            PRIMARY KEY (user_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_user_access_paths_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_access_paths (
            user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
            location_id TEXT NOT NULL REFERENCES locations(location_id),
            PRIMARY KEY (user_id, location_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_enrollment_status_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS student_enrollment_status_history (
            student_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
            location_id TEXT NOT NULL REFERENCES locations(location_id),
            enrollment_status TEXT NOT NULL,
            start_date TIMESTAMP NOT NULL,
            end_date TIMESTAMP,
            order_id TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (student_id, location_id, enrollment_status, start_date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_school_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS school_history (
            student_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
            school_id TEXT NOT NULL REFERENCES schools(school_id),
            school_course_id TEXT REFERENCES school_courses(school_course_id),
            start_date TIMESTAMP,
            end_date TIMESTAMP,
            PRIMARY KEY (student_id, school_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_user_phone_numbers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_phone_numbers (
            user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
            phone_number_type TEXT NOT NULL,
            phone_number TEXT NOT NULL,
            PRIMARY KEY (user_id, phone_number_type)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_user_addresses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_addresses (
            user_id TEXT PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
            prefecture_id TEXT REFERENCES prefectures(prefecture_id),
            postal_code TEXT,
            city TEXT,
            first_street TEXT,
            second_street TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
