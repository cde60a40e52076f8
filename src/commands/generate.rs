use anyhow::Error;

use crate::args::GenerateSubCommand;
use crate::clients::provider::transport::GigaChatTransport;
use crate::errors::ProviderError;
use crate::models::mood::MoodLabel;
use crate::repos::{config::ProviderConfig, image::FileImageStore};
use crate::services::CreatureGenerationService;

pub async fn run(
    transport: &GigaChatTransport,
    config: &ProviderConfig,
    cmd: GenerateSubCommand,
) -> Result<(), Error> {
    let mood = MoodLabel::parse(&cmd.mood).map_err(|_| {
        ProviderError::Validation(format!("mood must be one word, got {:?}", cmd.mood))
    })?;

    let store = FileImageStore::new(config.image_dir.clone());
    let service =
        CreatureGenerationService::new(transport, &store, &config.model, &config.base_url);
    let stored = service.generate_image(&mood, &cmd.color, &cmd.name).await?;

    println!("{}", serde_json::to_string_pretty(&stored)?);
    Ok(())
}
