use eyre::Result;
use sqlx::types::Uuid;
use sqlx::PgPool;

use crate::config::Config;
use crate::domain::auth::{
    AuthResponse, ClientInfo, SessionData, SignInRequest, SignUpRequest,
};
use crate::domain::diagnostics::DatabaseStatus;
use crate::domain::project::{CreateProjectRequest, Project, ProjectQuery};
use crate::domain::request::WelcomeEmailRequest;
use crate::domain::user::{Profile, UpdateProfileRequest};
use crate::error::Error;
use crate::repository::accounts::AccountRepository;
use crate::repository::projects::ProjectRepository;
use crate::repository::sessions::SessionRepository;
use crate::repository::users::UserRepository;
use crate::service::auth::AuthService;
use crate::service::diagnostics::DiagnosticsService;
use crate::service::email::{EmailService, Mailer};
use crate::service::projects::ProjectService;
use crate::service::users::UserService;

#[derive(Clone)]
pub struct Api {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub project_service: ProjectService,
    pub email_service: EmailService,
    pub diagnostics_service: DiagnosticsService,
}

impl Api {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let user_repository = UserRepository::new(pool.clone());
        let account_repository = AccountRepository::new(pool.clone());
        let session_repository = SessionRepository::new(pool.clone());

        Api {
            auth_service: AuthService {
                user_repository: user_repository.clone(),
                account_repository: account_repository.clone(),
                session_repository: session_repository.clone(),
                session_ttl: config.session_ttl,
            },
            user_service: UserService {
                user_repository: user_repository.clone(),
            },
            project_service: ProjectService {
                project_repository: ProjectRepository::new(pool),
            },
            email_service: EmailService {
                mailer: Mailer::from_config(config),
                site_url: config.site_url.clone(),
            },
            diagnostics_service: DiagnosticsService {
                user_repository,
                account_repository,
                session_repository,
            },
        }
    }

    pub async fn sign_up(&self, request: SignUpRequest, client: ClientInfo) -> Result<AuthResponse> {
        let (session, user) = self.auth_service.sign_up(request, client).await?;
        Ok(AuthResponse {
            token: session.token,
            user: user.into(),
        })
    }

    pub async fn sign_in(&self, request: SignInRequest, client: ClientInfo) -> Result<AuthResponse> {
        let (session, user) = self.auth_service.sign_in(request, client).await?;
        Ok(AuthResponse {
            token: session.token,
            user: user.into(),
        })
    }

    pub async fn sign_out(&self, token: String) -> Result<()> {
        self.auth_service.sign_out(token).await
    }

    pub async fn get_session(&self, token: String) -> Result<Option<SessionData>> {
        let session = self.auth_service.get_session(token).await?;
        Ok(session.map(|(session, user)| SessionData {
            session: session.into(),
            user: user.into(),
        }))
    }

    pub async fn validate_token(&self, token: String) -> Result<Uuid> {
        self.auth_service.validate_token(token).await
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Profile> {
        self.user_service
            .get(user_id)
            .await?
            .map(Profile::from)
            .ok_or_else(|| Error::UserNotFound.into())
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<Profile> {
        let user = self.user_service.update_profile(user_id, request).await?;
        Ok(user.into())
    }

    pub async fn delete_account(&self, user_id: Uuid) -> Result<()> {
        self.user_service.delete_account(user_id).await?;
        Ok(())
    }

    pub async fn list_projects(&self, user_id: Uuid, query: ProjectQuery) -> Result<Vec<Project>> {
        self.project_service.list(user_id, query).await
    }

    pub async fn create_project(
        &self,
        user_id: Uuid,
        request: CreateProjectRequest,
    ) -> Result<Project> {
        self.project_service.create(user_id, request).await
    }

    pub async fn get_project(&self, user_id: Uuid, id: i64) -> Result<Project> {
        self.project_service.get(user_id, id).await
    }

    pub async fn delete_project(&self, user_id: Uuid, id: i64) -> Result<Project> {
        self.project_service.delete(user_id, id).await
    }

    /// Sends the welcome email to a stored user, or to an explicit
    /// name and address when no user id is given.
    pub async fn send_welcome_email(&self, request: WelcomeEmailRequest) -> Result<()> {
        let (name, email) = match request.user_id {
            Some(user_id) => {
                let user = self
                    .user_service
                    .get(user_id)
                    .await?
                    .ok_or(Error::UserNotFound)?;
                (user.name, user.email)
            }
            None => recipient_from(request.name, request.email)?,
        };
        self.email_service.send_welcome(&name, &email).await?;
        Ok(())
    }

    pub async fn database_status(&self) -> Result<DatabaseStatus> {
        self.diagnostics_service.database_status().await
    }
}

fn recipient_from(name: Option<String>, email: Option<String>) -> Result<(String, String), Error> {
    match (name, email) {
        (Some(name), Some(email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
            Ok((name, email))
        }
        _ => Err(Error::MissingEmailRecipient),
    }
}
