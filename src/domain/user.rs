use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A row of the `users` table. List columns hold JSON-encoded string arrays.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub skills: Option<String>,
    pub goals: Option<String>,
    pub industries: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub skills: Vec<String>,
    pub goals: Vec<String>,
    pub industries: Vec<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_complete: bool,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        let skills = decode_list(user.skills.as_deref());
        let is_complete = is_filled(user.bio.as_deref())
            && is_filled(user.location.as_deref())
            && !skills.is_empty();
        Profile {
            id: user.id,
            name: user.name,
            email: user.email,
            email_verified: user.email_verified,
            profile_image: user.profile_image,
            bio: user.bio,
            location: user.location,
            role: user.role,
            company: user.company,
            skills,
            goals: decode_list(user.goals.as_deref()),
            industries: decode_list(user.industries.as_deref()),
            linkedin_url: user.linkedin_url,
            portfolio_url: user.portfolio_url,
            created_at: user.created_at,
            is_complete,
        }
    }
}

#[derive(Debug, Default, Clone, Validate, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub profile_image: Option<String>,
    pub skills: Option<Vec<String>>,
    pub goals: Option<Vec<String>>,
    pub industries: Option<Vec<String>>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
}

/// Column values for a partial profile update. `None` leaves a column as is.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub profile_image: Option<String>,
    pub skills: Option<String>,
    pub goals: Option<String>,
    pub industries: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(request: UpdateProfileRequest) -> Self {
        ProfileChanges {
            name: request.name.map(|name| name.trim().to_string()),
            bio: request.bio,
            location: request.location,
            role: request.role,
            company: request.company,
            profile_image: request.profile_image,
            skills: request.skills.map(encode_list),
            goals: request.goals.map(encode_list),
            industries: request.industries.map(encode_list),
            linkedin_url: request.linkedin_url,
            portfolio_url: request.portfolio_url,
        }
    }
}

/// Reads a stored list column. Anything that is not a JSON array of strings
/// reads as empty.
pub fn decode_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
        .unwrap_or_default()
}

pub fn encode_list(values: Vec<String>) -> String {
    let values: Vec<String> = values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    serde_json::Value::from(values).to_string()
}

fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}

#[cfg(test)]
pub(crate) fn user_for_test(id: Uuid, email: &str) -> User {
    User {
        id,
        name: "Amara Okafor".to_string(),
        email: email.to_string(),
        email_verified: false,
        profile_image: None,
        bio: None,
        location: None,
        role: None,
        company: None,
        skills: None,
        goals: None,
        industries: None,
        linkedin_url: None,
        portfolio_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
