use std::fmt;

use serde::Deserialize;

use crate::errors::ProviderError;

/// Bearer token plus the instant (epoch millis) the Provider stops accepting it.
#[derive(Clone, PartialEq)]
pub struct Credential {
    pub token: String,
    pub expires_at: i64,
}

impl Credential {
    pub fn new(token: String, expires_at: i64) -> Self {
        Credential { token, expires_at }
    }

    pub fn is_valid_at(&self, now_millis: i64) -> bool {
        now_millis < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(chrono::Utc::now().timestamp_millis())
    }
}

// Tokens end up in log lines through `{:?}` far too easily.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Body of a successful OAuth exchange.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_at: Option<i64>,
}

impl TokenResponse {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn into_credential(self) -> Result<Credential, ProviderError> {
        let token = self.access_token.ok_or_else(|| {
            ProviderError::Auth("access_token missing from OAuth response".to_string())
        })?;
        let expires_at = self.expires_at.ok_or_else(|| {
            ProviderError::Auth("expires_at missing from OAuth response".to_string())
        })?;
        Ok(Credential::new(token, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_boundary() {
        let credential = Credential::new("t".to_string(), 1_000);
        assert!(credential.is_valid_at(999));
        assert!(!credential.is_valid_at(1_000));
        assert!(!credential.is_valid_at(1_001));
    }

    #[test]
    fn test_debug_hides_token() {
        let credential = Credential::new("super-secret".to_string(), 1_000);
        let printed = format!("{:?}", credential);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("1000"));
    }

    #[test]
    fn test_token_response_requires_both_fields() {
        let ok = TokenResponse::from_json(r#"{"access_token":"abc","expires_at":1706000000000}"#)
            .unwrap()
            .into_credential()
            .unwrap();
        assert_eq!(ok.token, "abc");
        assert_eq!(ok.expires_at, 1_706_000_000_000);

        let missing = TokenResponse::from_json(r#"{"access_token":"abc"}"#)
            .unwrap()
            .into_credential();
        assert!(matches!(missing, Err(ProviderError::Auth(_))));
    }
}
