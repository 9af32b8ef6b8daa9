//! Login/consent flow orchestration.
//!
//! The orchestrator owns the sequencing of "fetch challenge -> decide skip vs.
//! render -> accept challenge -> redirect" and performs credential
//! verification or creation exactly once per submission. Collaborators are
//! injected so the flows can be exercised without Postgres or a live
//! authorization server.

pub mod password;
pub mod storage;
pub mod utils;
pub mod views;


use crate::hydra::{AcceptLoginPayload, HydraAdmin, HydraError};
use crate::portale::auth::{
    password::PasswordHasher,
    storage::CredentialStore,
    utils::{normalize_email, valid_email},
    views::AuthView,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

/// Form submission body for both login and registration.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub challenge: String,
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing {0} query parameter")]
    MissingChallenge(&'static str),

    #[error("Invalid or missing fields: {0}")]
    Validation(String),

    /// Same value for unknown email and wrong password so the rendered
    /// message never leaks whether an account exists.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("A user with this email already exists")]
    DuplicateAccount,

    #[error(transparent)]
    Hydra(#[from] HydraError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Submit-path failures that re-render the form instead of surfacing an
    /// error page.
    #[must_use]
    pub fn renders_form(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidCredentials | Self::DuplicateAccount
        )
    }
}

/// A form to render: which view, for which challenge, with an optional
/// inline error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPage {
    pub view: AuthView,
    pub challenge: String,
    pub error_message: String,
}

impl FormPage {
    #[must_use]
    pub fn render(&self) -> String {
        views::render(self.view, &self.challenge, &self.error_message)
    }
}

/// What a flow ends in: either send the user somewhere or show a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Redirect(String),
    Form(FormPage),
}

impl AuthOutcome {
    fn form(view: AuthView, challenge: String, error_message: String) -> Self {
        Self::Form(FormPage {
            view,
            challenge,
            error_message,
        })
    }
}

/// The orchestrator. Stateless besides its collaborators; one instance is
/// shared across all requests.
#[derive(Debug)]
pub struct Auth<S, H, C> {
    store: S,
    hasher: H,
    hydra: C,
}

impl<S, H, C> Auth<S, H, C>
where
    S: CredentialStore,
    H: PasswordHasher,
    C: HydraAdmin,
{
    pub fn new(store: S, hasher: H, hydra: C) -> Self {
        Self {
            store,
            hasher,
            hydra,
        }
    }

    /// GET on /auth/login or /auth/register: fetch the login request and
    /// either complete the handshake (skip) or render the form.
    pub async fn begin_login(
        &self,
        view: AuthView,
        challenge: Option<&str>,
    ) -> Result<AuthOutcome, AuthError> {
        let challenge = required_challenge(challenge, "login_challenge")?;

        let request = self.hydra.login_request(challenge).await?;

        if request.skip {
            let redirect = self
                .hydra
                .accept_login(&request.challenge, &request.accept_payload())
                .await?;
            return Ok(AuthOutcome::Redirect(redirect.redirect_to));
        }

        Ok(AuthOutcome::form(view, request.challenge, String::new()))
    }

    /// GET on /auth/consent: consent is always auto-accepted with the
    /// requested scopes; there is no consent-choice form.
    pub async fn begin_consent(&self, challenge: Option<&str>) -> Result<String, AuthError> {
        let challenge = required_challenge(challenge, "consent_challenge")?;

        let request = self.hydra.consent_request(challenge).await?;

        let redirect = self
            .hydra
            .accept_consent(&request.challenge, &request.accept_payload())
            .await?;

        Ok(redirect.redirect_to)
    }

    /// POST on /auth/login.
    pub async fn submit_login(&self, payload: &LoginPayload) -> Result<AuthOutcome, AuthError> {
        self.submit(AuthView::Login, payload).await
    }

    /// POST on /auth/register.
    pub async fn submit_register(&self, payload: &LoginPayload) -> Result<AuthOutcome, AuthError> {
        self.submit(AuthView::Register, payload).await
    }

    async fn submit(
        &self,
        view: AuthView,
        payload: &LoginPayload,
    ) -> Result<AuthOutcome, AuthError> {
        match self.authenticate(view, payload).await {
            Ok(redirect_to) => Ok(AuthOutcome::Redirect(redirect_to)),
            Err(err) if err.renders_form() => Ok(AuthOutcome::form(
                view,
                payload.challenge.clone(),
                err.to_string(),
            )),
            Err(err) => Err(err),
        }
    }

    async fn authenticate(
        &self,
        view: AuthView,
        payload: &LoginPayload,
    ) -> Result<String, AuthError> {
        validate(payload)?;

        let email = normalize_email(&payload.email);

        match view {
            AuthView::Login => self.verify_credentials(&email, payload).await?,
            AuthView::Register => self.create_credentials(&email, payload).await?,
        }

        let redirect = self
            .hydra
            .accept_login(&payload.challenge, &AcceptLoginPayload::remembered(email))
            .await?;

        Ok(redirect.redirect_to)
    }

    async fn verify_credentials(
        &self,
        email: &str,
        payload: &LoginPayload,
    ) -> Result<(), AuthError> {
        let Some(record) = self.store.find_by_email(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if self
            .hasher
            .verify(payload.password.expose_secret(), &record.password_hash)
        {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn create_credentials(
        &self,
        email: &str,
        payload: &LoginPayload,
    ) -> Result<(), AuthError> {
        if self.store.find_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateAccount);
        }

        let digest = self.hasher.hash(payload.password.expose_secret())?;

        // Check-then-insert without a lock: two concurrent registrations for
        // the same email can race; the loser hits the storage layer's unique
        // index and surfaces as a store error.
        self.store.insert(email, &digest).await?;

        Ok(())
    }
}

fn required_challenge<'a>(
    challenge: Option<&'a str>,
    parameter: &'static str,
) -> Result<&'a str, AuthError> {
    challenge
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingChallenge(parameter))
}

fn validate(payload: &LoginPayload) -> Result<(), AuthError> {
    let mut invalid = Vec::new();

    if payload.challenge.trim().is_empty() {
        invalid.push("challenge");
    }
    if !valid_email(&normalize_email(&payload.email)) {
        invalid.push("email");
    }
    if payload.password.expose_secret().is_empty() {
        invalid.push("password");
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(invalid.join(", ")))
    }
}
