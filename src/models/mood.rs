use std::fmt;

use serde::Serialize;

use crate::errors::ProviderError;

/// A single-word emotional classification. Only constructible through
/// [`MoodLabel::parse`], so holding one means the one-word rule holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MoodLabel(String);

impl MoodLabel {
    pub fn parse(raw: &str) -> Result<Self, ProviderError> {
        let mut words = raw.split_whitespace();
        match (words.next(), words.next()) {
            (Some(word), None) => Ok(MoodLabel(word.to_string())),
            (None, _) => Err(ProviderError::Protocol(
                "Provider returned an empty mood".to_string(),
            )),
            (Some(_), Some(_)) => Err(ProviderError::Protocol(format!(
                "Provider returned more than one word: {}",
                raw.trim()
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
