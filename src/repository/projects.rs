use eyre::Result;
use sqlx::types::Uuid;
use sqlx::PgPool;

use crate::domain::project::{NewProject, Project};

#[cfg_attr(test, faux::create)]
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

#[cfg_attr(test, faux::methods)]
impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        status: Option<String>,
        limit: i64,
    ) -> Result<Vec<Project>> {
        sqlx::query_as(
            r#"
            SELECT * FROM projects
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(&self, user_id: Uuid, project: NewProject) -> Result<Project> {
        sqlx::query_as(
            r#"
            INSERT INTO projects (user_id, name, role, description, link, category, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(project.name)
        .bind(project.role)
        .bind(project.description)
        .bind(project.link)
        .bind(project.category)
        .bind(project.status)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn get(&self, user_id: Uuid, id: i64) -> Result<Option<Project>> {
        sqlx::query_as(
            r#"
            SELECT * FROM projects
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete(&self, user_id: Uuid, id: i64) -> Result<Option<Project>> {
        sqlx::query_as(
            r#"
            DELETE FROM projects
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }
}
