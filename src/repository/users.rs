use eyre::Result;
use sqlx::types::Uuid;
use sqlx::{PgPool, Row};

use crate::domain::auth::CREDENTIAL_PROVIDER;
use crate::domain::diagnostics::UserSummary;
use crate::domain::user::{ProfileChanges, User};
use crate::error::Error;

/// Deleting a user has to clear every row that references it first, because
/// the foreign keys do not cascade.
pub const DELETE_USER_STATEMENTS: [&str; 4] = [
    "DELETE FROM projects WHERE user_id = $1",
    "DELETE FROM accounts WHERE user_id = $1",
    "DELETE FROM sessions WHERE user_id = $1",
    "DELETE FROM users WHERE id = $1",
];

/// Rows removed by [`UserRepository::delete_with_dependents`], in statement order.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DeletedRows {
    pub projects: u64,
    pub accounts: u64,
    pub sessions: u64,
    pub users: u64,
}

#[cfg_attr(test, faux::create)]
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

#[cfg_attr(test, faux::methods)]
impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the user together with its credential account.
    pub async fn create_with_credential(
        &self,
        name: String,
        email: String,
        hashed_password: String,
    ) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (id, name, email)
            VALUES ($1, $2, $3) RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&email)
        .fetch_one(&mut *tx)
        .await
        .map_err(email_conflict)?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, user_id, provider_id, account_id, password)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(CREDENTIAL_PROVIDER)
        .bind(user.id.to_string())
        .bind(hashed_password)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn get_by_email(&self, email: String) -> Result<Option<User>> {
        sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn exists(&self, email: String) -> Result<bool> {
        sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE lower(email) = lower($1)
            )
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map(|row| row.get(0))
        .map_err(Into::into)
    }

    pub async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>> {
        sqlx::query_as(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                location = COALESCE($4, location),
                role = COALESCE($5, role),
                company = COALESCE($6, company),
                profile_image = COALESCE($7, profile_image),
                skills = COALESCE($8, skills),
                goals = COALESCE($9, goals),
                industries = COALESCE($10, industries),
                linkedin_url = COALESCE($11, linkedin_url),
                portfolio_url = COALESCE($12, portfolio_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.bio)
        .bind(changes.location)
        .bind(changes.role)
        .bind(changes.company)
        .bind(changes.profile_image)
        .bind(changes.skills)
        .bind(changes.goals)
        .bind(changes.industries)
        .bind(changes.linkedin_url)
        .bind(changes.portfolio_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Removes the user and everything referencing it in one transaction.
    /// A failing statement rolls back the ones before it.
    pub async fn delete_with_dependents(&self, id: Uuid) -> Result<DeletedRows> {
        let mut tx = self.pool.begin().await?;
        let mut counts = [0u64; 4];
        for (count, statement) in counts.iter_mut().zip(DELETE_USER_STATEMENTS) {
            *count = sqlx::query(statement)
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        let [projects, accounts, sessions, users] = counts;
        Ok(DeletedRows {
            projects,
            accounts,
            sessions,
            users,
        })
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<UserSummary>> {
        sqlx::query_as(
            r#"
            SELECT id, name, email, created_at, email_verified FROM users
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

/// A concurrent sign-up can still hit `users.email UNIQUE` after the
/// existence check passed.
fn email_conflict(e: sqlx::Error) -> eyre::Report {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            Error::EmailAlreadyExists.into()
        }
        e => e.into(),
    }
}
