use eyre::Result;
use log::info;
use sqlx::types::Uuid;
use validator::{Validate, ValidateUrl};

use crate::domain::user::{ProfileChanges, UpdateProfileRequest, User};
use crate::error::Error;
use crate::repository::users::{DeletedRows, UserRepository};

#[derive(Clone)]
pub struct UserService {
    pub user_repository: UserRepository,
}

impl UserService {
    pub async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        self.user_repository.get(user_id).await
    }

    pub async fn update_profile(&self, user_id: Uuid, request: UpdateProfileRequest) -> Result<User> {
        let changes = validate_profile_update(request)?;
        self.user_repository
            .update_profile(user_id, changes)
            .await?
            .ok_or_else(|| Error::UserNotFound.into())
    }

    pub async fn delete_account(&self, user_id: Uuid) -> Result<DeletedRows> {
        if self.user_repository.get(user_id).await?.is_none() {
            return Err(Error::UserNotFound.into());
        }
        let deleted = self.user_repository.delete_with_dependents(user_id).await?;
        info!(
            "Deleted user {} with {} projects, {} accounts and {} sessions",
            user_id, deleted.projects, deleted.accounts, deleted.sessions
        );
        Ok(deleted)
    }
}

pub fn validate_profile_update(request: UpdateProfileRequest) -> Result<ProfileChanges, Error> {
    request.validate()?;
    for (field, value) in [
        ("linkedinUrl", &request.linkedin_url),
        ("portfolioUrl", &request.portfolio_url),
    ] {
        ensure_link(field, value.as_deref())?;
    }

    let changes = ProfileChanges::from(request);
    if changes.name.as_deref() == Some("") {
        return Err(Error::Validation("Name cannot be empty".to_string()));
    }
    Ok(changes)
}

/// Empty values are accepted so a link can be cleared.
pub fn ensure_link(field: &str, value: Option<&str>) -> Result<(), Error> {
    match value.map(str::trim) {
        Some(link) if !link.is_empty() && !link.validate_url() => Err(Error::Validation(format!(
            "{} must be a valid URL",
            field
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::user_for_test;
    use rstest::rstest;

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("https://www.linkedin.com/in/amara"), true)]
    #[case(Some("linkedin"), false)]
    fn test_ensure_link(#[case] value: Option<&str>, #[case] accepted: bool) {
        assert_eq!(ensure_link("linkedinUrl", value).is_ok(), accepted);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let request = UpdateProfileRequest {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_profile_update(request),
            Err(Error::Validation("Name cannot be empty".to_string()))
        );
    }

    #[test]
    fn test_invalid_portfolio_is_rejected() {
        let request = UpdateProfileRequest {
            portfolio_url: Some("my site".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_profile_update(request),
            Err(Error::Validation("portfolioUrl must be a valid URL".to_string()))
        );
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let mut users = UserRepository::faux();
        faux::when!(users.get).then(|_| Ok(None));
        let service = UserService {
            user_repository: users,
        };

        let error = service
            .delete_account(Uuid::from_u128(9))
            .await
            .unwrap_err()
            .downcast::<Error>()
            .unwrap();
        assert_eq!(error, Error::UserNotFound);
    }

    #[tokio::test]
    async fn test_delete_existing_user_cascades() -> Result<()> {
        let id = Uuid::from_u128(3);
        let mut users = UserRepository::faux();
        faux::when!(users.get).then(move |id| Ok(Some(user_for_test(id, "kofi@example.com"))));
        faux::when!(users.delete_with_dependents).then(|_| {
            Ok(DeletedRows {
                projects: 2,
                accounts: 1,
                sessions: 3,
                users: 1,
            })
        });
        let service = UserService {
            user_repository: users,
        };

        let deleted = service.delete_account(id).await?;
        assert_eq!(deleted.users, 1);
        assert_eq!(deleted.projects, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_passes_encoded_lists() -> Result<()> {
        let id = Uuid::from_u128(4);
        let mut users = UserRepository::faux();
        faux::when!(users.update_profile).then(|(id, changes)| {
            let mut user = user_for_test(id, "zainab@example.com");
            user.skills = changes.skills;
            user.location = changes.location;
            Ok(Some(user))
        });
        let service = UserService {
            user_repository: users,
        };
        let request = UpdateProfileRequest {
            location: Some("Nairobi".to_string()),
            skills: Some(vec!["Mobile Dev".to_string(), "DevOps".to_string()]),
            ..Default::default()
        };

        let user = service.update_profile(id, request).await?;
        assert_eq!(user.location.as_deref(), Some("Nairobi"));
        assert_eq!(user.skills.as_deref(), Some(r#"["Mobile Dev","DevOps"]"#));
        Ok(())
    }
}
