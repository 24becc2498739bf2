use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use axum_extra::extract::WithRejection;
use log::error;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::domain::auth::{AuthResponse, SignInRequest, SignUpRequest};
use crate::domain::project::{CreateProjectRequest, ProjectQuery};
use crate::domain::request::{SuccessResponse, WelcomeEmailRequest};
use crate::domain::user::UpdateProfileRequest;
use crate::error::{report_into_response, Error};
use crate::extensions::{bearer_token, client_info, AuthenticatedUser};
use crate::routes::Api;

pub const AUTH_TOKEN_HEADER: &str = "set-auth-token";

pub fn router(api: Api) -> Router {
    Router::new()
        .route("/api/auth/sign-up/email", post(sign_up))
        .route("/api/auth/sign-in/email", post(sign_in))
        .route("/api/auth/sign-out", post(sign_out))
        .route("/api/auth/get-session", get(get_session))
        .route("/api/profile", get(get_profile).patch(update_profile))
        .route("/api/profile/delete", delete(delete_account))
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/{id}", get(get_project).delete(delete_project))
        .route("/api/send-welcome-email", post(send_welcome_email))
        .route("/api/test-db", get(test_db))
        .layer(CorsLayer::permissive())
        .layer(Extension(api))
}

fn auth_response(response: AuthResponse) -> Response {
    let token = response.token.clone();
    (StatusCode::OK, [(AUTH_TOKEN_HEADER, token)], Json(response)).into_response()
}

async fn sign_up(
    Extension(api): Extension<Api>,
    headers: HeaderMap,
    WithRejection(Json(payload), _): WithRejection<Json<SignUpRequest>, Error>,
) -> Response {
    match api.sign_up(payload, client_info(&headers)).await {
        Ok(response) => auth_response(response),
        Err(e) => report_into_response(e),
    }
}

async fn sign_in(
    Extension(api): Extension<Api>,
    headers: HeaderMap,
    WithRejection(Json(payload), _): WithRejection<Json<SignInRequest>, Error>,
) -> Response {
    match api.sign_in(payload, client_info(&headers)).await {
        Ok(response) => auth_response(response),
        Err(e) => report_into_response(e),
    }
}

async fn sign_out(Extension(api): Extension<Api>, headers: HeaderMap) -> Response {
    let token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };
    match api.sign_out(token).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn get_session(Extension(api): Extension<Api>, headers: HeaderMap) -> Response {
    let Ok(token) = bearer_token(&headers) else {
        return (StatusCode::OK, Json(json!(null))).into_response();
    };
    match api.get_session(token).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn get_profile(
    AuthenticatedUser(user_id): AuthenticatedUser,
    Extension(api): Extension<Api>,
) -> Response {
    match api.get_profile(user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn update_profile(
    AuthenticatedUser(user_id): AuthenticatedUser,
    Extension(api): Extension<Api>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateProfileRequest>, Error>,
) -> Response {
    match api.update_profile(user_id, payload).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn delete_account(
    AuthenticatedUser(user_id): AuthenticatedUser,
    Extension(api): Extension<Api>,
) -> Response {
    match api.delete_account(user_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SuccessResponse::new("Account deleted successfully")),
        )
            .into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn list_projects(
    AuthenticatedUser(user_id): AuthenticatedUser,
    Extension(api): Extension<Api>,
    WithRejection(Query(query), _): WithRejection<Query<ProjectQuery>, Error>,
) -> Response {
    match api.list_projects(user_id, query).await {
        Ok(projects) => (StatusCode::OK, Json(projects)).into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn create_project(
    AuthenticatedUser(user_id): AuthenticatedUser,
    Extension(api): Extension<Api>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateProjectRequest>, Error>,
) -> Response {
    match api.create_project(user_id, payload).await {
        Ok(project) => (StatusCode::CREATED, Json(project)).into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn get_project(
    AuthenticatedUser(user_id): AuthenticatedUser,
    Extension(api): Extension<Api>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, Error>,
) -> Response {
    match api.get_project(user_id, id).await {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn delete_project(
    AuthenticatedUser(user_id): AuthenticatedUser,
    Extension(api): Extension<Api>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, Error>,
) -> Response {
    match api.delete_project(user_id, id).await {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn send_welcome_email(
    AuthenticatedUser(_user_id): AuthenticatedUser,
    Extension(api): Extension<Api>,
    WithRejection(Json(payload), _): WithRejection<Json<WelcomeEmailRequest>, Error>,
) -> Response {
    match api.send_welcome_email(payload).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SuccessResponse::new("Welcome email sent successfully")),
        )
            .into_response(),
        Err(e) => report_into_response(e),
    }
}

async fn test_db(
    AuthenticatedUser(_user_id): AuthenticatedUser,
    Extension(api): Extension<Api>,
) -> Response {
    match api.database_status().await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => {
            error!("Database test error: {:?}", e);
            let body = json!({
                "success": false,
                "error": "Database connection failed",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
