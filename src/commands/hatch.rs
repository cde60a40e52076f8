use anyhow::Error;
use serde::Serialize;
use tracing::info;

use crate::args::HatchSubCommand;
use crate::clients::provider::transport::GigaChatTransport;
use crate::models::{image::StoredImage, mood::MoodLabel};
use crate::repos::{config::ProviderConfig, image::FileImageStore};
use crate::services::{CreatureGenerationService, MoodAnalysisService};

use super::read_note;

#[derive(Debug, Serialize)]
struct Hatched {
    name: String,
    mood: MoodLabel,
    color: String,
    image: StoredImage,
}

pub async fn run(
    transport: &GigaChatTransport,
    config: &ProviderConfig,
    cmd: HatchSubCommand,
) -> Result<(), Error> {
    let text = read_note(cmd.text)?;

    let mood = MoodAnalysisService::new(transport, &config.model)
        .analyze_mood(&text)
        .await?;
    info!("Hatching {} from a {} note", cmd.name, mood);

    let store = FileImageStore::new(config.image_dir.clone());
    let image = CreatureGenerationService::new(transport, &store, &config.model, &config.base_url)
        .generate_image(&mood, &cmd.color, &cmd.name)
        .await?;

    let hatched = Hatched {
        name: cmd.name,
        mood,
        color: cmd.color,
        image,
    };
    println!("{}", serde_json::to_string_pretty(&hatched)?);
    Ok(())
}
