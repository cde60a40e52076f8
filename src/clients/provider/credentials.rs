use http::header;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::errors::ProviderError;
use crate::models::credential::{Credential, TokenResponse};
use crate::repos::config::ProviderConfig;

/// Holds the current bearer token and refreshes it through the OAuth
/// client-credentials exchange when it is missing or expired.
///
/// The whole check-refresh-store path runs under one async mutex: racing
/// callers that all see an expired token queue up behind the first one and
/// reuse whatever it fetched, and nobody ever observes a half-written
/// credential.
pub struct CredentialCache {
    http: Client,
    oauth_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    current: Mutex<Option<Credential>>,
}

impl CredentialCache {
    pub fn new(http: Client, config: &ProviderConfig) -> Self {
        CredentialCache {
            http,
            oauth_url: config.oauth_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
            current: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub fn with_credential(self, credential: Credential) -> Self {
        CredentialCache {
            current: Mutex::new(Some(credential)),
            ..self
        }
    }

    pub async fn get_token(&self) -> Result<Credential, ProviderError> {
        let mut current = self.current.lock().await;

        if let Some(credential) = current.as_ref() {
            if credential.is_valid() {
                debug!("Using cached Provider token");
                return Ok(credential.clone());
            }
            debug!("Cached Provider token expired at {}", credential.expires_at);
        }

        let fresh = self.request_token().await?;
        info!("Obtained new Provider token, expires at {}", fresh.expires_at);
        *current = Some(fresh.clone());
        Ok(fresh)
    }

    /// Forces the next `get_token` back to the OAuth endpoint, but only if
    /// the cache still holds the rejected token; a token refreshed meanwhile
    /// by another caller survives.
    pub async fn invalidate_token(&self, rejected: &str) {
        let mut current = self.current.lock().await;
        if current.as_ref().is_some_and(|c| c.token == rejected) {
            *current = None;
        }
    }

    async fn request_token(&self) -> Result<Credential, ProviderError> {
        let rq_uid = Uuid::new_v4().to_string();
        debug!("Requesting Provider token, RqUID {}", rq_uid);

        let response = self
            .http
            .post(&self.oauth_url)
            .header("RqUID", &rq_uid)
            .header(header::ACCEPT, "application/json")
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Auth(format!("cannot read token response: {}", e)))?;

        if !status.is_success() {
            error!("Token request returned {}: {}", status, body);
            return Err(ProviderError::Auth(format!(
                "token request returned {}: {}",
                status, body
            )));
        }

        TokenResponse::from_json(&body)
            .map_err(|e| ProviderError::Auth(format!("cannot parse token response: {}", e)))?
            .into_credential()
    }
}
