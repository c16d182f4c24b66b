//! HTTP client for the upstream identity service.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tg_core::adapters::IdentityAdapter;
use tg_core::domain::entities::account::{Account, NewAccount};
use tg_core::errors::{CoreError, CoreResult};
use tg_shared::config::IdentityConfig;
use tracing::warn;

use async_trait::async_trait;

const COLLABORATOR: &str = "identity";

#[derive(Serialize)]
struct VerificationUpdate<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct VerificationOutcome {
    success: bool,
}

#[derive(Serialize)]
struct PasswordUpdate<'a> {
    password_hash: &'a str,
}

#[derive(Deserialize)]
struct PasswordOutcome {
    id: String,
}

/// [`IdentityAdapter`] over the identity service's JSON API.
///
/// Every request runs under the configured per-call deadline. Remote 404
/// becomes [`CoreError::NotFound`], 409 becomes
/// [`CoreError::AlreadyExists`], and any other non-success status is an
/// upstream error carrying the status line.
pub struct HttpIdentityClient {
    client: Client,
    base_url: String,
}

impl HttpIdentityClient {
    pub fn new(config: &IdentityConfig) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| CoreError::system(format!("identity client init failed: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(e: reqwest::Error) -> CoreError {
        CoreError::upstream(COLLABORATOR, e.to_string())
    }

    async fn parse<T: DeserializeOwned>(response: Response, resource: &str) -> CoreResult<T> {
        let status = response.status();
        match status {
            s if s.is_success() => response.json::<T>().await.map_err(|e| {
                CoreError::upstream(COLLABORATOR, format!("malformed response: {e}"))
            }),
            StatusCode::NOT_FOUND => Err(CoreError::NotFound {
                resource: resource.to_string(),
            }),
            StatusCode::CONFLICT => Err(CoreError::AlreadyExists {
                resource: resource.to_string(),
            }),
            s => {
                warn!(status = %s, resource, "identity request failed");
                Err(CoreError::upstream(COLLABORATOR, format!("status {s}")))
            }
        }
    }

    async fn get_account(&self, path: &str, resource: &str) -> CoreResult<Account> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::parse(response, resource).await
    }
}

#[async_trait]
impl IdentityAdapter for HttpIdentityClient {
    async fn get_by_email(&self, email: &str) -> CoreResult<Account> {
        self.get_account(&format!("/accounts/by-email/{email}"), "account")
            .await
    }

    async fn get_by_login(&self, login: &str) -> CoreResult<Account> {
        self.get_account(&format!("/accounts/by-login/{login}"), "account")
            .await
    }

    async fn get_by_id(&self, id: &str) -> CoreResult<Account> {
        self.get_account(&format!("/accounts/{id}"), "account").await
    }

    async fn create_account(&self, account: NewAccount) -> CoreResult<Account> {
        let response = self
            .client
            .post(self.url("/accounts"))
            .json(&account)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::parse(response, "account").await
    }

    async fn update_verification_status(&self, id: &str, email: &str) -> CoreResult<bool> {
        let response = self
            .client
            .post(self.url(&format!("/accounts/{id}/verification")))
            .json(&VerificationUpdate { email })
            .send()
            .await
            .map_err(Self::transport_error)?;
        let outcome: VerificationOutcome = Self::parse(response, "account").await?;
        Ok(outcome.success)
    }

    async fn reset_password(&self, id: &str, password_hash: &str) -> CoreResult<String> {
        let response = self
            .client
            .post(self.url(&format!("/accounts/{id}/password")))
            .json(&PasswordUpdate { password_hash })
            .send()
            .await
            .map_err(Self::transport_error)?;
        let outcome: PasswordOutcome = Self::parse(response, "account").await?;
        Ok(outcome.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_its_trailing_slash() {
        let config = IdentityConfig {
            base_url: "http://identity.internal:8081/".to_string(),
            request_timeout_ms: 3000,
        };
        let client = HttpIdentityClient::new(&config).unwrap();
        assert_eq!(
            client.url("/accounts/abc"),
            "http://identity.internal:8081/accounts/abc"
        );
    }
}
