//! axum handlers for the login, registration, and consent routes.
//!
//! Handlers only extract request data and map orchestrator outcomes to HTTP:
//! redirects become 303s, forms become 200 HTML, errors become their status
//! class. All flow decisions live in the orchestrator.

use crate::portale::auth::{AuthError, AuthOutcome, LoginPayload};
use crate::portale::auth::views::AuthView;
use crate::portale::AppAuth;
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct LoginChallenge {
    login_challenge: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConsentChallenge {
    consent_challenge: Option<String>,
}

// GET on /auth/login
pub async fn render_login(
    auth: Extension<Arc<AppAuth>>,
    Query(query): Query<LoginChallenge>,
) -> Response {
    respond(
        auth.begin_login(AuthView::Login, query.login_challenge.as_deref())
            .await,
    )
}

// GET on /auth/register
pub async fn render_register(
    auth: Extension<Arc<AppAuth>>,
    Query(query): Query<LoginChallenge>,
) -> Response {
    respond(
        auth.begin_login(AuthView::Register, query.login_challenge.as_deref())
            .await,
    )
}

// GET on /auth/consent
pub async fn consent(
    auth: Extension<Arc<AppAuth>>,
    Query(query): Query<ConsentChallenge>,
) -> Response {
    match auth.begin_consent(query.consent_challenge.as_deref()).await {
        Ok(redirect_to) => Redirect::to(&redirect_to).into_response(),
        Err(err) => error_response(&err),
    }
}

// POST on /auth/login
pub async fn login(
    auth: Extension<Arc<AppAuth>>,
    payload: Option<Form<LoginPayload>>,
) -> Response {
    let Some(Form(payload)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    respond(auth.submit_login(&payload).await)
}

// POST on /auth/register
pub async fn register(
    auth: Extension<Arc<AppAuth>>,
    payload: Option<Form<LoginPayload>>,
) -> Response {
    let Some(Form(payload)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    respond(auth.submit_register(&payload).await)
}

fn respond(result: Result<AuthOutcome, AuthError>) -> Response {
    match result {
        Ok(AuthOutcome::Redirect(redirect_to)) => Redirect::to(&redirect_to).into_response(),
        Ok(AuthOutcome::Form(page)) => Html(page.render()).into_response(),
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &AuthError) -> Response {
    let status = match err {
        AuthError::MissingChallenge(_) | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::DuplicateAccount => StatusCode::CONFLICT,
        AuthError::Hydra(_) => StatusCode::BAD_GATEWAY,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("{err}");
    }

    (status, err.to_string()).into_response()
}
