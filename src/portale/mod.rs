//! HTTP server wiring: pool, collaborators, router, middleware.

pub mod auth;
pub mod handlers;

use crate::hydra::{HydraClient, HydraConfig};
use crate::portale::auth::{password::Argon2Hasher, storage::PgCredentialStore, Auth};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

/// The orchestrator as wired in production.
pub type AppAuth = Auth<PgCredentialStore, Argon2Hasher, HydraClient>;

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, hydra: HydraConfig) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let client = HydraClient::new(&hydra)?;
    let auth = Arc::new(Auth::new(
        PgCredentialStore::new(pool),
        Argon2Hasher,
        client,
    ));

    let app = router(auth);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn router(auth: Arc<AppAuth>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/auth/login",
            get(handlers::auth::render_login).post(handlers::auth::login),
        )
        .route(
            "/auth/register",
            get(handlers::auth::render_register).post(handlers::auth::register),
        )
        .route("/auth/consent", get(handlers::auth::consent))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth)),
        )
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
