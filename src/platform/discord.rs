use std::sync::Arc;

use anyhow::Result;
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::gateway::GatewayError;
use serenity::http::{Http, HttpError};
use serenity::model::channel::{Message, ReactionType};
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, MessageId};
use serenity::prelude::GatewayIntents;
use serenity::Client;
use tracing::{error, info};

use crate::error::BotError;
use crate::handler::{ChatSink, MessageHandler};
use crate::platform::IncomingMessage;

/// Only message events, with their content visible
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        Self {
            author_id: msg.author.id.get(),
            channel_id: msg.channel_id.get(),
            message_id: msg.id.get(),
            text: msg.content.clone(),
        }
    }
}

/// Sends replies through Discord's REST API
struct DiscordSink {
    http: Arc<Http>,
}

#[async_trait]
impl ChatSink for DiscordSink {
    async fn send_message(&self, channel_id: u64, content: &str) -> Result<u64> {
        let sent = ChannelId::new(channel_id).say(&self.http, content).await?;
        Ok(sent.id.get())
    }

    async fn react(&self, channel_id: u64, message_id: u64, emoji: &str) -> Result<()> {
        ChannelId::new(channel_id)
            .create_reaction(
                &self.http,
                MessageId::new(message_id),
                ReactionType::Unicode(emoji.to_string()),
            )
            .await?;
        Ok(())
    }
}

struct Dispatcher {
    handler: Arc<MessageHandler>,
}

#[async_trait]
impl EventHandler for Dispatcher {
    async fn message(&self, ctx: Context, msg: Message) {
        let self_id = ctx.cache.current_user().id.get();
        let sink = DiscordSink {
            http: ctx.http.clone(),
        };
        self.handler
            .handle_message(&sink, &IncomingMessage::from(&msg), self_id)
            .await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Logged in as {} ({})", ready.user.name, ready.user.id);
    }
}

/// Run the Discord session until SIGINT or SIGTERM, then close it
pub async fn run(token: &str, handler: MessageHandler) -> Result<(), BotError> {
    if token.trim().is_empty() {
        return Err(BotError::Authentication(
            "no bot token provided (use --token or DISCORD_TOKEN)".to_string(),
        ));
    }

    info!("Connecting to Discord servers...");

    let mut client = Client::builder(token, intents())
        .event_handler(Dispatcher {
            handler: Arc::new(handler),
        })
        .await
        .map_err(classify)?;

    // Register before connecting so a missing handler is a startup failure
    let shutdown = ShutdownSignal::install().map_err(|e| {
        BotError::Connection(format!("failed to install signal handlers: {}", e))
    })?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match shutdown.recv().await {
            Some(signal) => {
                info!("Received {}, closing session", signal);
                shard_manager.shutdown_all().await;
            }
            None => error!("Shutdown signal stream closed; session stays open"),
        }
    });

    info!("fizzbot is now running...");
    client.start().await.map_err(classify)?;

    info!("Session closed");
    Ok(())
}

/// SIGINT/SIGTERM listeners, registered eagerly
struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    fn install() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the first signal; `None` if listening is no longer possible
    async fn recv(mut self) -> Option<&'static str> {
        #[cfg(unix)]
        {
            tokio::select! {
                got = self.interrupt.recv() => got.map(|_| "SIGINT"),
                got = self.terminate.recv() => got.map(|_| "SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok().map(|_| "Ctrl-C")
        }
    }
}

fn classify(err: serenity::Error) -> BotError {
    let rejected_token = match &err {
        serenity::Error::Gateway(GatewayError::InvalidAuthentication) => true,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) => {
            resp.status_code.as_u16() == 401
        }
        _ => false,
    };

    if rejected_token {
        BotError::Authentication(err.to_string())
    } else {
        BotError::Connection(err.to_string())
    }
}
