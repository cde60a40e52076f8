use anyhow::Error;
use clap::{CommandFactory, Parser};
use tracing::{debug, error};

use args::{Args, SubCommands};
use clients::provider::transport::GigaChatTransport;
use errors::ProviderError;
use repos::config::ProviderConfig;

mod args;
mod clients;
mod commands;
mod errors;
mod models;
mod repos;
mod services;
mod utils;

async fn run(args: Args) -> Result<(), Error> {
    let Some(subcmd) = args.subcmd else {
        Args::command().print_help()?;
        return Ok(());
    };

    let config = ProviderConfig::load(args.config.as_deref())?;
    debug!("Loaded config: {:?}", config);
    let transport = GigaChatTransport::from_config(&config)?;

    match subcmd {
        SubCommands::Analyze(cmd) => commands::analyze::run(&transport, &config, cmd).await,
        SubCommands::Generate(cmd) => commands::generate::run(&transport, &config, cmd).await,
        SubCommands::Hatch(cmd) => commands::hatch::run(&transport, &config, cmd).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "moodkin=info".to_string()))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("{}", e);
        let code = match e.downcast_ref::<ProviderError>() {
            Some(provider_error) if provider_error.is_client_error() => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
