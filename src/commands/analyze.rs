use anyhow::Error;

use crate::args::AnalyzeSubCommand;
use crate::clients::provider::transport::GigaChatTransport;
use crate::repos::config::ProviderConfig;
use crate::services::MoodAnalysisService;

use super::read_note;

pub async fn run(
    transport: &GigaChatTransport,
    config: &ProviderConfig,
    cmd: AnalyzeSubCommand,
) -> Result<(), Error> {
    let text = read_note(cmd.text)?;
    let service = MoodAnalysisService::new(transport, &config.model);
    let mood = service.analyze_mood(&text).await?;
    println!("{}", mood);
    Ok(())
}
