use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;

use crate::errors::ProviderError;
use crate::models::chat_response::ChatResponse;
use crate::models::image::ImageId;
use crate::models::mood::MoodLabel;

// The Provider emits `<img src="UUID" fuse="true"/>`, so only the opening
// part of the tag is anchored.
static IMAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<img src="([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})""#,
    )
    .expect("static regex compile")
});

fn parse_chat_response(body: &str) -> Result<ChatResponse, ProviderError> {
    ChatResponse::from_json(body).map_err(|e| {
        error!("Error parsing Provider response JSON: {}\nRaw response: {}", e, body);
        ProviderError::Protocol(format!("response is not a chat completion: {}", e))
    })
}

/// The one-word mood from `choices[0].message.content`.
pub fn extract_mood(body: &str) -> Result<MoodLabel, ProviderError> {
    let response = parse_chat_response(body)?;
    MoodLabel::parse(response.first_content()?)
}

/// The first `<img src="UUID">` reference in `choices[0].message.content`.
pub fn extract_image_id(body: &str) -> Result<ImageId, ProviderError> {
    let response = parse_chat_response(body)?;
    let content = response.first_content()?;

    IMAGE_TAG
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| ImageId::new(m.as_str()))
        .ok_or_else(|| {
            ProviderError::Protocol(format!("no image reference in response: {}", content))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completion(content: &str) -> String {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
    }

    #[test]
    fn test_extract_mood_single_word() {
        let mood = extract_mood(r#"{"choices":[{"message":{"content":"грустный"}}]}"#).unwrap();
        assert_eq!(mood.as_str(), "грустный");
    }

    #[test]
    fn test_extract_mood_rejects_two_words() {
        let result = extract_mood(r#"{"choices":[{"message":{"content":"очень грустный"}}]}"#);
        assert!(matches!(result, Err(ProviderError::Protocol(_))));
    }

    #[test]
    fn test_extract_mood_rejects_empty_content() {
        assert!(matches!(extract_mood(&completion("  ")), Err(ProviderError::Protocol(_))));
    }

    #[test]
    fn test_extract_mood_rejects_malformed_bodies() {
        for body in ["not json", "{}", r#"{"choices":[]}"#, r#"{"choices":[{"message":{}}]}"#] {
            assert!(
                matches!(extract_mood(body), Err(ProviderError::Protocol(_))),
                "accepted {}",
                body
            );
        }
    }

    #[test]
    fn test_extract_image_id() {
        let id = extract_image_id(&completion(
            r#"<img src="123e4567-e89b-12d3-a456-426614174000">"#,
        ))
        .unwrap();
        assert_eq!(id.as_str(), "123e4567-e89b-12d3-a456-426614174000");
    }

    #[test]
    fn test_extract_image_id_from_surrounding_text() {
        let id = extract_image_id(&completion(
            r#"Вот ваш покемон! <img src="ABCDEF01-2345-6789-abcd-ef0123456789" fuse="true"/> и ещё <img src="00000000-0000-0000-0000-000000000000">"#,
        ))
        .unwrap();
        assert_eq!(id.as_str(), "ABCDEF01-2345-6789-abcd-ef0123456789");
    }

    #[test]
    fn test_extract_image_id_without_tag() {
        let result = extract_image_id(&completion("Я не могу нарисовать это."));
        assert!(matches!(result, Err(ProviderError::Protocol(_))));
    }

    #[test]
    fn test_extract_image_id_rejects_non_uuid() {
        let result = extract_image_id(&completion(r#"<img src="not-a-uuid-at-all">"#));
        assert!(matches!(result, Err(ProviderError::Protocol(_))));
    }
}
