use async_trait::async_trait;
use eyre::{bail, ContextCompat, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::client::cache::{SessionSource, SessionStore};
use crate::domain::auth::{AuthResponse, SessionData, SignInRequest, SignUpRequest};
use crate::domain::diagnostics::DatabaseStatus;
use crate::domain::project::{CreateProjectRequest, Project, ProjectQuery};
use crate::domain::request::{SuccessResponse, WelcomeEmailRequest};
use crate::domain::user::{Profile, UpdateProfileRequest};
use crate::error::ErrorBody;

const AUTH_TOKEN_HEADER: &str = "set-auth-token";

/// Fetches `GET /api/auth/get-session` for the session cache.
#[derive(Clone)]
pub struct HttpSessionSource {
    client: ReqwestClient,
    base_url: String,
}

#[async_trait]
impl SessionSource for HttpSessionSource {
    async fn fetch_session(&self, token: &str) -> Result<Option<SessionData>> {
        let url = format!("{}/api/auth/get-session", self.base_url);
        let response = self.client.get(url).bearer_auth(token).send().await?;
        parse_json(response).await
    }
}

pub struct ApiClient {
    client: ReqwestClient,
    base_url: String,
    sessions: SessionStore<HttpSessionSource>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = ReqwestClient::new();
        let base_url = base_url.trim_end_matches('/').to_string();
        let source = HttpSessionSource {
            client: client.clone(),
            base_url: base_url.clone(),
        };
        Self {
            client,
            base_url,
            sessions: SessionStore::new(source),
        }
    }

    pub fn new_with_token(base_url: &str, token: String) -> Self {
        let mut client = Self::new(base_url);
        client.sessions.set_token(Some(token));
        client
    }

    pub fn token(&self) -> Option<&str> {
        self.sessions.token()
    }

    pub async fn sign_up(&mut self, request: &SignUpRequest) -> Result<AuthResponse> {
        let response = self
            .client
            .post(self.url("/api/auth/sign-up/email"))
            .json(request)
            .send()
            .await?;
        self.remember_token(response.headers());
        parse_json(response).await
    }

    pub async fn sign_in(&mut self, request: &SignInRequest) -> Result<AuthResponse> {
        let response = self
            .client
            .post(self.url("/api/auth/sign-in/email"))
            .json(request)
            .send()
            .await?;
        self.remember_token(response.headers());
        parse_json(response).await
    }

    pub async fn sign_out(&mut self) -> Result<()> {
        if self.token().is_some() {
            let response = self.authorized(self.client.post(self.url("/api/auth/sign-out")))?
                .send()
                .await?;
            let _: serde_json::Value = parse_json(response).await?;
        }
        self.sessions.set_token(None);
        Ok(())
    }

    /// The current session, served from the cache while it is fresh.
    pub async fn session(&mut self) -> Result<Option<SessionData>> {
        self.sessions.session().await
    }

    pub async fn refetch_session(&mut self) -> Result<Option<SessionData>> {
        self.sessions.refetch().await
    }

    pub async fn get_profile(&self) -> Result<Profile> {
        self.send(self.client.get(self.url("/api/profile"))).await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<Profile> {
        self.send(self.client.patch(self.url("/api/profile")).json(request))
            .await
    }

    pub async fn delete_account(&mut self) -> Result<SuccessResponse> {
        let response = self
            .send(self.client.delete(self.url("/api/profile/delete")))
            .await?;
        self.sessions.set_token(None);
        Ok(response)
    }

    pub async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>> {
        self.send(self.client.get(self.url("/api/projects")).query(query))
            .await
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project> {
        self.send(self.client.post(self.url("/api/projects")).json(request))
            .await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project> {
        self.send(self.client.get(self.url(&format!("/api/projects/{}", id))))
            .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<Project> {
        self.send(self.client.delete(self.url(&format!("/api/projects/{}", id))))
            .await
    }

    pub async fn send_welcome_email(
        &self,
        request: &WelcomeEmailRequest,
    ) -> Result<SuccessResponse> {
        self.send(
            self.client
                .post(self.url("/api/send-welcome-email"))
                .json(request),
        )
        .await
    }

    pub async fn database_status(&self) -> Result<DatabaseStatus> {
        self.send(self.client.get(self.url("/api/test-db"))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token().wrap_err("No token")?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorized(request)?.send().await?;
        parse_json(response).await
    }

    fn remember_token(&mut self, headers: &HeaderMap) {
        if let Some(token) = headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(token_from_header)
        {
            self.sessions.set_token(Some(token));
        }
    }
}

/// The usable token is the part before the first `.` of a `set-auth-token`
/// value, which may carry a signature suffix.
pub fn token_from_header(value: &str) -> Option<String> {
    let token = value.split('.').next().unwrap_or_default().trim();
    (!token.is_empty()).then(|| token.to_string())
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let text = response.text().await?;
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => bail!("{} ({}): {}", status, body.code, body.error),
        Err(_) => bail!("{}: {}", status, text),
    }
}
