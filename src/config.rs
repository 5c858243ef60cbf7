use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Command-line flags
#[derive(Parser, Debug)]
#[command(name = "fizzbot", version, about = "Discord bot that answers !fizzbuzz <n>")]
pub struct Cli {
    /// Bot authentication token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Optional TOML file overriding command names, pattern and reaction
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub commands: CommandConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CommandConfig {
    /// Command words recognized after the `!` sigil
    #[serde(default = "default_command_names")]
    pub names: Vec<String>,
    /// Strict pattern; must capture the keyword and the number
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Unicode emoji attached to every successful answer
    #[serde(default = "default_reaction")]
    pub reaction: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            names: default_command_names(),
            pattern: default_pattern(),
            reaction: default_reaction(),
        }
    }
}

fn default_command_names() -> Vec<String> {
    vec!["fizzbuzz".to_string(), "fb".to_string()]
}

fn default_pattern() -> String {
    r"^!([a-z]+)\s(\d+)$".to_string()
}

fn default_reaction() -> String {
    "✅".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.commands.names.is_empty() {
            anyhow::bail!("[commands] names must list at least one command");
        }
        if config.commands.reaction.is_empty() {
            anyhow::bail!("[commands] reaction must not be empty");
        }
        Ok(config)
    }

    /// Build the runtime configuration: defaults, then the file, then flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Config::default(),
        };
        if let Some(token) = &cli.token {
            config.discord.bot_token = token.clone();
        }
        Ok(config)
    }
}
