use std::sync::Arc;

use bytes::Bytes;
use http::header;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, error, warn};

use crate::errors::ProviderError;
use crate::models::chat_request::ChatRequest;
use crate::models::image::ImageId;
use crate::repos::config::ProviderConfig;

use super::{build_http_client, credentials::CredentialCache};

/// Re-authentications allowed per logical call after a 401.
pub const MAX_AUTH_RETRIES: u32 = 3;

/// The two authenticated calls the orchestrators need from the Provider.
pub trait ProviderTransport {
    /// Posts a chat completion and returns the raw response body.
    async fn send(&self, request: &ChatRequest) -> Result<String, ProviderError>;

    /// Fetches the stored file behind an image id.
    async fn download(&self, image_id: &ImageId) -> Result<Bytes, ProviderError>;
}

pub struct GigaChatTransport {
    http: Client,
    credentials: Arc<CredentialCache>,
    config: ProviderConfig,
}

impl GigaChatTransport {
    pub fn new(http: Client, credentials: Arc<CredentialCache>, config: &ProviderConfig) -> Self {
        GigaChatTransport {
            http,
            credentials,
            config: config.clone(),
        }
    }

    /// One HTTP client and one credential cache shared by every call.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = build_http_client(config)?;
        let credentials = Arc::new(CredentialCache::new(http.clone(), config));
        Ok(Self::new(http, credentials, config))
    }

    /// Runs `build` with a valid token until the Provider accepts it, going
    /// back for a new token on every 401 up to [`MAX_AUTH_RETRIES`] times.
    async fn execute<F>(&self, what: &str, build: F) -> Result<Response, ProviderError>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            let credential = self.credentials.get_token().await?;
            let response = build(&credential.token).send().await.map_err(|e| {
                error!("Error sending {} request to Provider: {}", what, e);
                ProviderError::Http(e)
            })?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::UNAUTHORIZED {
                self.credentials.invalidate_token(&credential.token).await;
                if attempt >= MAX_AUTH_RETRIES {
                    error!("Provider kept rejecting tokens for {}", what);
                    return Err(ProviderError::Auth("retry limit exceeded".to_string()));
                }
                attempt += 1;
                warn!(
                    "Provider rejected token for {}, re-authenticating ({}/{})",
                    what, attempt, MAX_AUTH_RETRIES
                );
                continue;
            }

            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            error!("Provider returned error status {} for {}: {}", status, what, body);
            return Err(ProviderError::Transport {
                status: status.as_u16(),
                body,
            });
        }
    }
}

impl ProviderTransport for GigaChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let body = request.to_json().map_err(|e| {
            error!("Failed to serialize chat request: {}", e);
            ProviderError::Protocol(format!("cannot serialize chat request: {}", e))
        })?;
        debug!("Sending chat completion to {}\nbody:\n{}", self.config.api_url, body);

        let response = self
            .execute("chat completion", |token| {
                self.http
                    .post(&self.config.api_url)
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::ACCEPT, "application/json")
                    .bearer_auth(token)
                    .body(body.clone())
            })
            .await?;

        let text = response.text().await?;
        debug!("Chat completion response: {}", text);
        Ok(text)
    }

    async fn download(&self, image_id: &ImageId) -> Result<Bytes, ProviderError> {
        let url = self.config.files_url_for(image_id.as_str());
        debug!("Downloading image {} from {}", image_id, url);

        let response = self
            .execute("file download", |token| {
                self.http
                    .get(&url)
                    .header(header::ACCEPT, "image/jpeg")
                    .bearer_auth(token)
            })
            .await?;

        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes for image {}", bytes.len(), image_id);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::provider::test_support::{future_millis, oauth_body, test_config};
    use crate::models::Message;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_oauth(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(oauth_body("token", future_millis())),
            )
            .mount(server)
            .await;
    }

    fn create_transport(server: &MockServer) -> GigaChatTransport {
        GigaChatTransport::from_config(&test_config(&server.uri())).unwrap()
    }

    fn create_request() -> ChatRequest {
        ChatRequest::new("GigaChat".to_string(), vec![Message::user("привет")])
    }

    async fn count_requests(server: &MockServer, wanted: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == wanted)
            .count()
    }

    #[tokio::test]
    async fn test_send_returns_body_with_bearer_token() {
        let server = MockServer::start().await;
        mount_oauth(&server).await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("Authorization", "Bearer token"))
            .and(body_partial_json(serde_json::json!({"model": "GigaChat", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let body = create_transport(&server).send(&create_request()).await.unwrap();
        assert_eq!(body, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_two_401s_then_success_retries_twice() {
        let server = MockServer::start().await;
        mount_oauth(&server).await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("done"))
            .mount(&server)
            .await;

        let body = create_transport(&server).send(&create_request()).await.unwrap();

        assert_eq!(body, "done");
        assert_eq!(count_requests(&server, "/chat").await, 3);
        // initial token plus one refresh per rejection
        assert_eq!(count_requests(&server, "/oauth").await, 3);
    }

    #[tokio::test]
    async fn test_always_401_gives_up_after_four_attempts() {
        let server = MockServer::start().await;
        mount_oauth(&server).await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = create_transport(&server).send(&create_request()).await;

        match result {
            Err(ProviderError::Auth(message)) => assert_eq!(message, "retry limit exceeded"),
            other => panic!("expected auth error, got {:?}", other),
        }
        assert_eq!(count_requests(&server, "/chat").await, 4);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let server = MockServer::start().await;
        mount_oauth(&server).await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let result = create_transport(&server).send(&create_request()).await;

        match result {
            Err(ProviderError::Transport { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("expected transport error, got {:?}", other),
        }
        assert_eq!(count_requests(&server, "/chat").await, 1);
    }

    #[tokio::test]
    async fn test_oauth_failure_surfaces_as_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unknown client"))
            .mount(&server)
            .await;

        let result = create_transport(&server).send(&create_request()).await;

        assert!(matches!(result, Err(ProviderError::Auth(_))));
        assert_eq!(count_requests(&server, "/chat").await, 0);
    }

    #[tokio::test]
    async fn test_download_uses_template_and_accept_header() {
        let server = MockServer::start().await;
        mount_oauth(&server).await;
        Mock::given(method("GET"))
            .and(path("/files/123e4567-e89b-12d3-a456-426614174000/content"))
            .and(header("Accept", "image/jpeg"))
            .and(header("Authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .expect(1)
            .mount(&server)
            .await;

        let bytes = create_transport(&server)
            .download(&ImageId::new("123e4567-e89b-12d3-a456-426614174000"))
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_download_retries_on_401() {
        let server = MockServer::start().await;
        mount_oauth(&server).await;
        Mock::given(method("GET"))
            .and(path("/files/123e4567-e89b-12d3-a456-426614174000/content"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/123e4567-e89b-12d3-a456-426614174000/content"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2]))
            .mount(&server)
            .await;

        let bytes = create_transport(&server)
            .download(&ImageId::new("123e4567-e89b-12d3-a456-426614174000"))
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), &[1, 2]);
    }
}
