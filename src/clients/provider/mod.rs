use reqwest::Client;

use crate::errors::ProviderError;
use crate::repos::config::ProviderConfig;

pub mod credentials;
pub mod parser;
pub mod transport;

pub fn build_http_client(config: &ProviderConfig) -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(config.timeout)
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(|e| ProviderError::Config(format!("cannot build HTTP client: {}", e)))
}

#[cfg(test)]
pub mod test_support {
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::repos::config::ProviderConfig;

    /// Config pointing every endpoint at a mock server.
    pub fn test_config(server_uri: &str) -> ProviderConfig {
        ProviderConfig {
            oauth_url: format!("{}/oauth", server_uri),
            api_url: format!("{}/chat", server_uri),
            files_url: format!("{}/files/%s/content", server_uri),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            scope: "GIGACHAT_API_PERS".to_string(),
            image_dir: PathBuf::from("images"),
            base_url: "http://localhost:8080/images/".to_string(),
            model: "GigaChat".to_string(),
            timeout: Duration::from_secs(5),
            accept_invalid_certs: false,
        }
    }

    pub fn future_millis() -> i64 {
        chrono::Utc::now().timestamp_millis() + 3_600_000
    }

    pub fn oauth_body(token: &str, expires_at: i64) -> serde_json::Value {
        serde_json::json!({ "access_token": token, "expires_at": expires_at })
    }
}
