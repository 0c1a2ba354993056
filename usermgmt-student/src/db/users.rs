//! Persisted user lookups for ownership checks

use super::{bind_all, placeholders};
use crate::models::{ExistingUser, UserRole};
use crate::repository::UserRepository;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use usermgmt_common::{Error, Result};

const USER_COLUMNS: &str = "user_id, email, username, external_user_id, user_role";

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Users whose `column_expr` matches one of `keys`
    async fn fetch_where_in(&self, column_expr: &str, keys: &[String]) -> Result<Vec<ExistingUser>> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} IN ({})",
            USER_COLUMNS,
            column_expr,
            placeholders(keys.len())
        );
        let rows = bind_all(sqlx::query(&sql), keys).fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }
}

fn user_from_row(row: &SqliteRow) -> Result<ExistingUser> {
    let raw_role: String = row.try_get("user_role")?;
    let role = UserRole::parse(&raw_role)
        .ok_or_else(|| Error::Repository(format!("Unknown user role in storage: {}", raw_role)))?;

    Ok(ExistingUser {
        user_id: row.try_get("user_id")?,
        email: row.try_get("email")?,
        username: row.try_get("username")?,
        external_user_id: row.try_get("external_user_id")?,
        role,
    })
}

fn lowercased(keys: &[String]) -> Vec<String> {
    keys.iter().map(|k| k.to_lowercase()).collect()
}

#[async_trait::async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_by_usernames(&self, usernames: &[String]) -> Result<Vec<ExistingUser>> {
        self.fetch_where_in("lower(username)", &lowercased(usernames))
            .await
    }

    async fn get_by_emails(&self, emails: &[String]) -> Result<Vec<ExistingUser>> {
        self.fetch_where_in("lower(email)", &lowercased(emails)).await
    }

    async fn get_by_external_user_ids(&self, ids: &[String]) -> Result<Vec<ExistingUser>> {
        self.fetch_where_in("external_user_id", ids).await
    }

    async fn get_by_ids(&self, user_ids: &[String]) -> Result<Vec<ExistingUser>> {
        self.fetch_where_in("user_id", user_ids).await
    }
}
