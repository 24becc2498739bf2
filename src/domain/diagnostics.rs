use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub email_verified: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub total_users: usize,
    pub total_accounts: usize,
    pub total_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    pub success: bool,
    pub database: String,
    pub stats: DatabaseStats,
    pub recent_users: Vec<UserSummary>,
    pub accounts: Vec<AccountSummary>,
    pub sessions: Vec<SessionSummary>,
}

impl DatabaseStatus {
    pub fn connected(
        recent_users: Vec<UserSummary>,
        accounts: Vec<AccountSummary>,
        sessions: Vec<SessionSummary>,
    ) -> Self {
        DatabaseStatus {
            success: true,
            database: "connected".to_string(),
            stats: DatabaseStats {
                total_users: recent_users.len(),
                total_accounts: accounts.len(),
                total_sessions: sessions.len(),
            },
            recent_users,
            accounts,
            sessions,
        }
    }
}
