use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

pub const PROJECT_CATEGORIES: [&str; 8] = [
    "Tech",
    "Design",
    "Startups",
    "Education",
    "Marketing",
    "Finance",
    "Healthcare",
    "Other",
];

pub const PROJECT_STATUSES: [&str; 2] = ["active", "completed"];

pub const DEFAULT_PROJECT_LIMIT: i64 = 20;
pub const MAX_PROJECT_LIMIT: i64 = 100;

#[derive(Debug, Clone, FromRow, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
    pub description: String,
    pub link: Option<String>,
    pub category: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Validate, Deserialize, Serialize)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Project role is required"))]
    pub role: String,
    #[validate(length(min = 1, message = "Project description is required"))]
    pub description: String,
    pub link: Option<String>,
    pub category: String,
    pub status: Option<String>,
}

/// A validated project ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub role: String,
    pub description: String,
    pub link: Option<String>,
    pub category: String,
    pub status: String,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ProjectQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

impl ProjectQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PROJECT_LIMIT)
            .clamp(1, MAX_PROJECT_LIMIT)
    }
}
