use tracing::info;

use crate::clients::provider::{parser::extract_image_id, transport::ProviderTransport};
use crate::errors::ProviderError;
use crate::models::{chat_request::ChatRequest, image::StoredImage, mood::MoodLabel, Message};
use crate::repos::image::ImageStore;
use crate::utils::{decode_image_payload, require_non_blank, validate_subject_name};

const ARTIST_PROMPT: &str =
    "Ты — художник, создающий изображения в стиле аниме с полностью белым фоном.";

pub fn creature_prompt(mood: &MoodLabel, color_hint: &str) -> String {
    format!(
        "Создай уникального покемона в стиле Pokémon, который выглядит {}. Это призрачный тип с полупрозрачным телом, {} оттенками и светящимися глазами, которые отражают настроение. Фон полностью белый. Стиль: аниме.",
        mood.as_str(),
        color_hint
    )
}

pub fn build_image_request(model: &str, mood: &MoodLabel, color_hint: &str) -> ChatRequest {
    ChatRequest::new(
        model.to_string(),
        vec![
            Message::system(ARTIST_PROMPT),
            Message::user(&creature_prompt(mood, color_hint)),
        ],
    )
    .with_auto_function_call()
}

/// Draws a creature for a mood and keeps the picture.
pub struct CreatureGenerationService<'a, T: ProviderTransport, S: ImageStore> {
    transport: &'a T,
    store: &'a S,
    model: String,
    base_url: String,
}

impl<'a, T: ProviderTransport, S: ImageStore> CreatureGenerationService<'a, T, S> {
    pub fn new(transport: &'a T, store: &'a S, model: &str, base_url: &str) -> Self {
        CreatureGenerationService {
            transport,
            store,
            model: model.to_string(),
            base_url: base_url.to_string(),
        }
    }

    pub async fn generate_image(
        &self,
        mood: &MoodLabel,
        color_hint: &str,
        subject_name: &str,
    ) -> Result<StoredImage, ProviderError> {
        require_non_blank(color_hint, "color hint")?;
        validate_subject_name(subject_name)?;

        let request = build_image_request(&self.model, mood, color_hint);
        let body = self.transport.send(&request).await?;
        let image_id = extract_image_id(&body)?;
        info!("Provider generated image {} for {}", image_id, subject_name);

        let payload = self.transport.download(&image_id).await?;
        let image = decode_image_payload(&payload)?;

        let file_name = self.store.save_image(subject_name, &image).await?;
        let url_path = format!("{}{}", self.base_url, file_name);
        info!("Creature {} ({}) available at {}", subject_name, mood, url_path);

        Ok(StoredImage {
            file_name,
            url_path,
        })
    }
}
