mod command;
mod config;
mod error;
mod fizzbuzz;
mod handler;
mod platform;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::CommandParser;
use crate::config::{Cli, Config};
use crate::handler::MessageHandler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fizzbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli).context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("  Commands: {:?}", config.commands.names);

    let parser = CommandParser::new(&config.commands)?;
    info!("  Pattern: {}", parser.pattern());
    info!("  Reaction: {}", config.commands.reaction);
    let handler = MessageHandler::new(parser, config.commands.reaction.clone());

    if let Err(e) = platform::discord::run(&config.discord.bot_token, handler).await {
        error!("{}", e);
        if e.is_fatal() {
            std::process::exit(1);
        }
    }

    Ok(())
}
