use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

use super::{Choice, Usage};

#[allow(dead_code)]
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub object: Option<String>,
    pub created: Option<i64>,
    pub model: Option<String>,
    pub usage: Option<Usage>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatResponse {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Text of `choices[0].message.content`. Missing pieces are protocol
    /// errors, never an empty string.
    pub fn first_content(&self) -> Result<&str, ProviderError> {
        let choice = self
            .choices
            .first()
            .ok_or_else(|| ProviderError::Protocol("response contains no choices".to_string()))?;

        choice
            .message
            .content
            .as_deref()
            .ok_or_else(|| ProviderError::Protocol("first choice has no content".to_string()))
    }
}
