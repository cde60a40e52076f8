use tracing::info;

use crate::clients::provider::{parser::extract_mood, transport::ProviderTransport};
use crate::errors::ProviderError;
use crate::models::{chat_request::ChatRequest, mood::MoodLabel, Message};
use crate::utils::validate_note_text;

const MOOD_ANALYST_PROMPT: &str =
    "Ты аналитик настроений. Определи настроение текста на русском языке и верни одно слово (грустный, веселый, печальный, смешной, радостный, спокойный, умиротворенный, гордый, трогательный, напуганный, встревоженный), описывающее эмоциональный окрас.";

pub fn build_mood_request(model: &str, text: &str) -> ChatRequest {
    ChatRequest::new(
        model.to_string(),
        vec![Message::system(MOOD_ANALYST_PROMPT), Message::user(text)],
    )
}

/// Classifies note text into a one-word mood.
pub struct MoodAnalysisService<'a, T: ProviderTransport> {
    transport: &'a T,
    model: String,
}

impl<'a, T: ProviderTransport> MoodAnalysisService<'a, T> {
    pub fn new(transport: &'a T, model: &str) -> Self {
        MoodAnalysisService {
            transport,
            model: model.to_string(),
        }
    }

    pub async fn analyze_mood(&self, text: &str) -> Result<MoodLabel, ProviderError> {
        validate_note_text(text)?;

        let request = build_mood_request(&self.model, text);
        let body = self.transport.send(&request).await?;
        let mood = extract_mood(&body)?;

        info!("Note of {} characters classified as {}", text.chars().count(), mood);
        Ok(mood)
    }
}
