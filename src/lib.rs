//! # Portale (Login & Consent Bridge)
//!
//! `portale` sits between end users and an ORY-Hydra-style OAuth2/OIDC
//! authorization server. The authorization server redirects users here with a
//! `login_challenge` or `consent_challenge`; portale renders the login or
//! registration form, checks credentials against its own Postgres-backed user
//! store, and completes the handshake by accepting the challenge against the
//! authorization server's admin API. Portale never issues tokens itself.
//!
//! ## Flows
//!
//! - **Login / registration:** `GET /auth/login` and `GET /auth/register`
//!   fetch the login request for the challenge. When the authorization server
//!   signals `skip`, the request is accepted immediately and the user is
//!   redirected; otherwise the form is rendered. `POST` submissions verify or
//!   create the credential record, then accept the login request with the
//!   email as subject.
//! - **Consent:** `GET /auth/consent` auto-accepts the consent request with
//!   the requested scopes verbatim; no consent-choice form is shown.
//!
//! Credential failures re-render the form with an inline message; the message
//! never distinguishes "no such account" from "wrong password".

pub mod cli;
pub mod hydra;
pub mod portale;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
