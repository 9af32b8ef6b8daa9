use crate::hydra::{
    AcceptConsentPayload, AcceptLoginPayload, ConsentRequest, HydraConfig, HydraError,
    LoginRequest, Redirect,
};
use crate::APP_USER_AGENT;
use anyhow::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

/// The four admin API exchanges the login/consent flows need.
///
/// `HydraClient` is the production implementation; tests inject fakes.
#[allow(async_fn_in_trait)]
pub trait HydraAdmin: Send + Sync {
    async fn login_request(&self, challenge: &str) -> Result<LoginRequest, HydraError>;

    async fn accept_login(
        &self,
        challenge: &str,
        payload: &AcceptLoginPayload,
    ) -> Result<Redirect, HydraError>;

    async fn consent_request(&self, challenge: &str) -> Result<ConsentRequest, HydraError>;

    async fn accept_consent(
        &self,
        challenge: &str,
        payload: &AcceptConsentPayload,
    ) -> Result<Redirect, HydraError>;
}

/// Stateless admin API client, shareable across requests.
#[derive(Debug, Clone)]
pub struct HydraClient {
    client: Client,
    base: String,
}

impl HydraClient {
    /// Build the client with a bounded timeout so a stuck authorization
    /// server cannot hang requests indefinitely.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &HydraConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base: config.admin_url().as_str().trim_end_matches('/').to_string(),
        })
    }

    fn login_request_endpoint(&self, challenge: &str) -> String {
        format!("{}/oauth2/auth/requests/login/{challenge}", self.base)
    }

    fn accept_login_endpoint(&self, challenge: &str) -> String {
        format!("{}/oauth2/auth/requests/login/{challenge}/accept", self.base)
    }

    fn consent_request_endpoint(&self, challenge: &str) -> String {
        format!("{}/oauth2/auth/requests/consent/{challenge}", self.base)
    }

    fn accept_consent_endpoint(&self, challenge: &str) -> String {
        format!(
            "{}/oauth2/auth/requests/consent/{challenge}/accept",
            self.base
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, HydraError> {
        debug!("endpoint URL: {}", endpoint);

        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(HydraError::Unavailable)?;

        Self::decode(endpoint, response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, HydraError> {
        debug!("endpoint URL: {}", endpoint);

        let response = self
            .client
            .put(endpoint)
            .json(body)
            .send()
            .await
            .map_err(HydraError::Unavailable)?;

        Self::decode(endpoint, response).await
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, HydraError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HydraError::Protocol(format!(
                "{endpoint} - {status}, {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|err| HydraError::Protocol(format!("{endpoint} - {err}")))
    }
}

impl HydraAdmin for HydraClient {
    #[instrument(skip(self))]
    async fn login_request(&self, challenge: &str) -> Result<LoginRequest, HydraError> {
        self.get_json(&self.login_request_endpoint(challenge)).await
    }

    #[instrument(skip(self, payload))]
    async fn accept_login(
        &self,
        challenge: &str,
        payload: &AcceptLoginPayload,
    ) -> Result<Redirect, HydraError> {
        self.put_json(&self.accept_login_endpoint(challenge), payload)
            .await
    }

    #[instrument(skip(self))]
    async fn consent_request(&self, challenge: &str) -> Result<ConsentRequest, HydraError> {
        self.get_json(&self.consent_request_endpoint(challenge))
            .await
    }

    #[instrument(skip(self, payload))]
    async fn accept_consent(
        &self,
        challenge: &str,
        payload: &AcceptConsentPayload,
    ) -> Result<Redirect, HydraError> {
        self.put_json(&self.accept_consent_endpoint(challenge), payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HydraClient {
        let config = HydraConfig::new("https://hydra.tld:4445").unwrap();
        HydraClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let client = client();

        assert_eq!(
            client.login_request_endpoint("abc"),
            "https://hydra.tld:4445/oauth2/auth/requests/login/abc"
        );
        assert_eq!(
            client.accept_login_endpoint("abc"),
            "https://hydra.tld:4445/oauth2/auth/requests/login/abc/accept"
        );
        assert_eq!(
            client.consent_request_endpoint("xyz"),
            "https://hydra.tld:4445/oauth2/auth/requests/consent/xyz"
        );
        assert_eq!(
            client.accept_consent_endpoint("xyz"),
            "https://hydra.tld:4445/oauth2/auth/requests/consent/xyz/accept"
        );
    }

    #[test]
    fn test_base_has_no_trailing_slash() {
        let config = HydraConfig::new("https://hydra.tld:4445/").unwrap();
        let client = HydraClient::new(&config).unwrap();
        assert_eq!(
            client.login_request_endpoint("abc"),
            "https://hydra.tld:4445/oauth2/auth/requests/login/abc"
        );
    }
}
