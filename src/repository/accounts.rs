use eyre::Result;
use sqlx::types::Uuid;
use sqlx::PgPool;

use crate::domain::auth::{Account, CREDENTIAL_PROVIDER};
use crate::domain::diagnostics::AccountSummary;

#[cfg_attr(test, faux::create)]
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

#[cfg_attr(test, faux::methods)]
impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_credential(&self, user_id: Uuid) -> Result<Option<Account>> {
        sqlx::query_as(
            r#"
            SELECT * FROM accounts
            WHERE user_id = $1 AND provider_id = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(CREDENTIAL_PROVIDER)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<AccountSummary>> {
        sqlx::query_as(
            r#"
            SELECT id, user_id, provider_id, created_at FROM accounts
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
