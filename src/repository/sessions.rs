use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::types::Uuid;
use sqlx::PgPool;

use crate::domain::auth::{ClientInfo, Session};
use crate::domain::diagnostics::SessionSummary;

#[cfg_attr(test, faux::create)]
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

#[cfg_attr(test, faux::methods)]
impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
        client: ClientInfo,
    ) -> Result<Session> {
        sqlx::query_as(
            r#"
            INSERT INTO sessions (id, token, user_id, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6) RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .bind(client.ip_address)
        .bind(client.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn get_by_token(&self, token: String) -> Result<Option<Session>> {
        sqlx::query_as(
            r#"
            SELECT * FROM sessions
            WHERE token = $1
            LIMIT 1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete_by_token(&self, token: String) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<SessionSummary>> {
        sqlx::query_as(
            r#"
            SELECT id, user_id, expires_at, created_at FROM sessions
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }
}
