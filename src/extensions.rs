use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Extension;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use log::{debug, error};
use tap::TapFallible;
use uuid::Uuid;

use crate::domain::auth::ClientInfo;
use crate::error::Error;
use crate::routes::Api;

/// The id of the user whose bearer token authenticated the request.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&req.headers)
            .tap_err(|e| debug!("Rejected Authorization header: {}", e))?;
        let Extension(api) = Extension::<Api>::from_request_parts(req, state)
            .await
            .tap_err(|e| error!("Failed to extract API: {}", e))
            .map_err(|_| Error::SessionValidationFailed)?;

        match api.validate_token(token).await {
            Ok(user_id) => Ok(AuthenticatedUser(user_id)),
            Err(e) => match e.downcast::<Error>() {
                Ok(error) => Err(error),
                Err(e) => {
                    error!("Session validation error: {:?}", e);
                    Err(Error::SessionValidationFailed)
                }
            },
        }
    }
}

/// Reads the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, Error> {
    let authorization = headers
        .typed_try_get::<Authorization<Bearer>>()
        .map_err(|_| Error::InvalidAuthorizationFormat)?
        .ok_or(Error::MissingAuthorization)?;
    let scheme_matches = headers
        .get(AUTHORIZATION)
        .is_some_and(|value| value.as_bytes().starts_with(b"Bearer "));
    if !scheme_matches {
        return Err(Error::InvalidAuthorizationFormat);
    }
    let token = authorization.token().trim();
    if token.is_empty() {
        return Err(Error::MissingToken);
    }
    Ok(token.to_string())
}

pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    ClientInfo {
        ip_address: header("x-forwarded-for")
            .and_then(|forwarded| forwarded.split(',').next().map(|ip| ip.trim().to_string())),
        user_agent: header(USER_AGENT.as_str()),
    }
}
