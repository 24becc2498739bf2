use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use eyre::{ensure, Result};
use log::{debug, error, info};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::types::Uuid;
use tap::TapFallible;
use validator::Validate;

use crate::domain::auth::{ClientInfo, Session, SignInRequest, SignUpRequest};
use crate::domain::user::User;
use crate::error::Error;
use crate::repository::accounts::AccountRepository;
use crate::repository::sessions::SessionRepository;
use crate::repository::users::UserRepository;

pub const TOKEN_LENGTH: usize = 32;

#[derive(Clone)]
pub struct AuthService {
    pub user_repository: UserRepository,
    pub account_repository: AccountRepository,
    pub session_repository: SessionRepository,
    pub session_ttl: Duration,
}

impl AuthService {
    pub async fn sign_up(
        &self,
        request: SignUpRequest,
        client: ClientInfo,
    ) -> Result<(Session, User)> {
        let request = request.normalized();
        request.validate().map_err(Error::from)?;
        ensure!(
            !self.user_repository.exists(request.email.clone()).await?,
            Error::EmailAlreadyExists
        );
        let hashed_password = hash(request.password, DEFAULT_COST)?;
        let user = self
            .user_repository
            .create_with_credential(request.name, request.email, hashed_password)
            .await?;
        info!("User {} signed up", user.id);

        let session = self.issue_session(user.id, client).await?;
        Ok((session, user))
    }

    pub async fn sign_in(
        &self,
        request: SignInRequest,
        client: ClientInfo,
    ) -> Result<(Session, User)> {
        request.validate().map_err(|_| Error::InvalidCredentials)?;
        let user = self
            .user_repository
            .get_by_email(request.email.trim().to_string())
            .await?
            .ok_or(Error::InvalidCredentials)?;
        let hashed_password = self
            .account_repository
            .get_credential(user.id)
            .await?
            .and_then(|account| account.password)
            .ok_or(Error::InvalidCredentials)?;
        ensure!(
            verify(request.password, &hashed_password)?,
            Error::InvalidCredentials
        );

        let session = self.issue_session(user.id, client).await?;
        debug!("User {} signed in", user.id);
        Ok((session, user))
    }

    pub async fn sign_out(&self, token: String) -> Result<()> {
        if !self.session_repository.delete_by_token(token).await? {
            debug!("Sign-out for a session that no longer exists");
        }
        Ok(())
    }

    /// Resolves a bearer token to the id of the user owning the session.
    pub async fn validate_token(&self, token: String) -> Result<Uuid> {
        let session = self.active_session(token).await?;
        Ok(session.user_id)
    }

    /// Like [`AuthService::validate_token`], but an invalid or expired token
    /// is `None` rather than an error.
    pub async fn get_session(&self, token: String) -> Result<Option<(Session, User)>> {
        let session = match self.active_session(token).await {
            Ok(session) => session,
            Err(e) => match e.downcast_ref::<Error>() {
                Some(Error::InvalidSessionToken | Error::SessionExpired) => return Ok(None),
                _ => return Err(e),
            },
        };
        let user = self.user_repository.get(session.user_id).await?;
        Ok(user.map(|user| (session, user)))
    }

    async fn active_session(&self, token: String) -> Result<Session> {
        let session = self
            .session_repository
            .get_by_token(token)
            .await
            .tap_err(|e| error!("Session validation error: {:?}", e))
            .map_err(|_| Error::SessionValidationFailed)?
            .ok_or(Error::InvalidSessionToken)?;
        Ok(ensure_active(session, Utc::now())?)
    }

    async fn issue_session(&self, user_id: Uuid, client: ClientInfo) -> Result<Session> {
        let expires_at = Utc::now() + self.session_ttl;
        self.session_repository
            .create(user_id, generate_token(), expires_at, client)
            .await
    }
}

pub fn ensure_active(session: Session, now: DateTime<Utc>) -> Result<Session, Error> {
    if session.is_expired_at(now) {
        debug!("Session {} expired at {}", session.id, session.expires_at);
        return Err(Error::SessionExpired);
    }
    Ok(session)
}

pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Account;
    use crate::domain::user::user_for_test;
    use eyre::eyre;

    const ALICE: Uuid = Uuid::from_u128(1);

    fn session_for(user_id: Uuid, expires_at: DateTime<Utc>) -> Session {
        Session {
            id: Uuid::from_u128(100),
            token: "abc".to_string(),
            user_id,
            expires_at,
            ip_address: None,
            user_agent: None,
            created_at: Utc::now() - Duration::days(1),
        }
    }

    fn service_with_sessions(session_repository: SessionRepository) -> AuthService {
        AuthService {
            user_repository: UserRepository::faux(),
            account_repository: AccountRepository::faux(),
            session_repository,
            session_ttl: Duration::days(7),
        }
    }

    fn error_of(report: eyre::Report) -> Error {
        report.downcast::<Error>().expect("expected a service error")
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let mut sessions = SessionRepository::faux();
        faux::when!(sessions.get_by_token).then(|_| Ok(None));
        let service = service_with_sessions(sessions);

        let error = error_of(service.validate_token("missing".to_string()).await.unwrap_err());
        assert_eq!(error, Error::InvalidSessionToken);
    }

    #[tokio::test]
    async fn test_expired_session_is_unauthorized() {
        let mut sessions = SessionRepository::faux();
        let expired = session_for(ALICE, Utc::now() - Duration::minutes(1));
        faux::when!(sessions.get_by_token).then(move |_| Ok(Some(expired.clone())));
        let service = service_with_sessions(sessions);

        let error = error_of(service.validate_token("abc".to_string()).await.unwrap_err());
        assert_eq!(error, Error::SessionExpired);
    }

    #[tokio::test]
    async fn test_active_session_yields_user_id() -> Result<()> {
        let mut sessions = SessionRepository::faux();
        let active = session_for(ALICE, Utc::now() + Duration::days(1));
        faux::when!(sessions.get_by_token).then(move |_| Ok(Some(active.clone())));
        let service = service_with_sessions(sessions);

        assert_eq!(service.validate_token("abc".to_string()).await?, ALICE);
        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_failure_is_a_server_error() {
        let mut sessions = SessionRepository::faux();
        faux::when!(sessions.get_by_token).then(|_| Err(eyre!("pool timed out")));
        let service = service_with_sessions(sessions);

        let error = error_of(service.validate_token("abc".to_string()).await.unwrap_err());
        assert_eq!(error, Error::SessionValidationFailed);
        assert!(error.status_code().is_server_error());
    }

    #[test]
    fn test_session_expiring_now_is_rejected() {
        let now = Utc::now();
        let session = session_for(ALICE, now);
        assert_eq!(ensure_active(session, now), Err(Error::SessionExpired));
    }

    #[tokio::test]
    async fn test_get_session_hides_expired_sessions() -> Result<()> {
        let mut sessions = SessionRepository::faux();
        let expired = session_for(ALICE, Utc::now() - Duration::seconds(5));
        faux::when!(sessions.get_by_token).then(move |_| Ok(Some(expired.clone())));
        let service = service_with_sessions(sessions);

        assert!(service.get_session("abc".to_string()).await?.is_none());
        Ok(())
    }

    fn sign_in_service(password: &str) -> AuthService {
        let hashed = hash(password, 4).unwrap();
        let mut users = UserRepository::faux();
        faux::when!(users.get_by_email)
            .then(|email| Ok(Some(user_for_test(ALICE, &email))));
        let mut accounts = AccountRepository::faux();
        faux::when!(accounts.get_credential).then(move |user_id| {
            Ok(Some(Account {
                id: Uuid::from_u128(10),
                user_id,
                provider_id: "credential".to_string(),
                account_id: user_id.to_string(),
                password: Some(hashed.clone()),
                created_at: Utc::now(),
            }))
        });
        let mut sessions = SessionRepository::faux();
        faux::when!(sessions.create).then(|(user_id, token, expires_at, _)| {
            Ok(Session {
                token,
                ..session_for(user_id, expires_at)
            })
        });
        AuthService {
            user_repository: users,
            account_repository: accounts,
            session_repository: sessions,
            session_ttl: Duration::days(7),
        }
    }

    #[tokio::test]
    async fn test_sign_in_issues_a_fresh_session() -> Result<()> {
        let service = sign_in_service("correct horse");
        let request = SignInRequest {
            email: "amara@example.com".to_string(),
            password: "correct horse".to_string(),
        };
        let (session, user) = service.sign_in(request, ClientInfo::default()).await?;

        assert_eq!(user.id, ALICE);
        assert_eq!(session.user_id, ALICE);
        assert_eq!(session.token.len(), TOKEN_LENGTH);
        assert!(session.expires_at > Utc::now() + Duration::days(6));
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_with_wrong_password() {
        let service = sign_in_service("correct horse");
        let request = SignInRequest {
            email: "amara@example.com".to_string(),
            password: "battery staple".to_string(),
        };
        let error = error_of(
            service
                .sign_in(request, ClientInfo::default())
                .await
                .unwrap_err(),
        );
        assert_eq!(error, Error::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_taken_email() {
        let mut users = UserRepository::faux();
        faux::when!(users.exists).then(|_| Ok(true));
        let service = AuthService {
            user_repository: users,
            ..service_with_sessions(SessionRepository::faux())
        };
        let request = SignUpRequest {
            name: "Amara".to_string(),
            email: "Amara@Example.com".to_string(),
            password: "long enough".to_string(),
        };
        let error = error_of(
            service
                .sign_up(request, ClientInfo::default())
                .await
                .unwrap_err(),
        );
        assert_eq!(error, Error::EmailAlreadyExists);
    }

    #[tokio::test]
    async fn test_sign_up_validates_before_touching_the_database() {
        let service = service_with_sessions(SessionRepository::faux());
        let request = SignUpRequest {
            name: "Amara".to_string(),
            email: "not-an-email".to_string(),
            password: "long enough".to_string(),
        };
        let error = error_of(
            service
                .sign_up(request, ClientInfo::default())
                .await
                .unwrap_err(),
        );
        assert!(matches!(error, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_sign_up_race_on_email_is_a_conflict() {
        let mut users = UserRepository::faux();
        faux::when!(users.exists).then(|_| Ok(false));
        faux::when!(users.create_with_credential)
            .then(|_| Err(Error::EmailAlreadyExists.into()));
        let service = AuthService {
            user_repository: users,
            ..service_with_sessions(SessionRepository::faux())
        };
        let request = SignUpRequest {
            name: "Amara".to_string(),
            email: "amara@example.com".to_string(),
            password: "long enough".to_string(),
        };
        let error = error_of(
            service
                .sign_up(request, ClientInfo::default())
                .await
                .unwrap_err(),
        );
        assert_eq!(error.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_blank_name() {
        let service = service_with_sessions(SessionRepository::faux());
        let request = SignUpRequest {
            name: "   ".to_string(),
            email: "amara@example.com".to_string(),
            password: "long enough".to_string(),
        };
        let error = error_of(
            service
                .sign_up(request, ClientInfo::default())
                .await
                .unwrap_err(),
        );
        assert_eq!(error, Error::Validation("Name is required".to_string()));
    }

    #[tokio::test]
    async fn test_sign_up_stores_trimmed_name_and_lowercased_email() -> Result<()> {
        let mut users = UserRepository::faux();
        faux::when!(users.exists).then(|_| Ok(false));
        faux::when!(users.create_with_credential).then(|(name, email, _)| {
            assert_eq!(name, "Amara");
            assert_eq!(email, "amara@example.com");
            Ok(User {
                name,
                ..user_for_test(ALICE, &email)
            })
        });
        let mut sessions = SessionRepository::faux();
        faux::when!(sessions.create).then(|(user_id, token, expires_at, _)| {
            Ok(Session {
                token,
                ..session_for(user_id, expires_at)
            })
        });
        let service = AuthService {
            user_repository: users,
            ..service_with_sessions(sessions)
        };
        let request = SignUpRequest {
            name: "  Amara ".to_string(),
            email: " Amara@Example.com".to_string(),
            password: "long enough".to_string(),
        };

        let (session, user) = service.sign_up(request, ClientInfo::default()).await?;
        assert_eq!(user.name, "Amara");
        assert_eq!(session.user_id, ALICE);
        Ok(())
    }

    #[test]
    fn test_tokens_are_alphanumeric_and_unique() {
        let first = generate_token();
        let second = generate_token();
        assert_eq!(first.len(), TOKEN_LENGTH);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
