use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::command::CommandParser;
use crate::error::BotError;
use crate::fizzbuzz::{fizzbuzz, format_response};
use crate::platform::IncomingMessage;

/// Outbound side of a chat platform: just enough to answer a message
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Post `content` to a channel, returning the id of the new message
    async fn send_message(&self, channel_id: u64, content: &str) -> Result<u64>;

    /// Attach a unicode emoji reaction to an existing message
    async fn react(&self, channel_id: u64, message_id: u64, emoji: &str) -> Result<()>;
}

/// What the bot decided to say in response to one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub reaction: Option<String>,
}

/// Turns incoming messages into fizzbuzz answers
pub struct MessageHandler {
    parser: CommandParser,
    reaction: String,
}

impl MessageHandler {
    pub fn new(parser: CommandParser, reaction: impl Into<String>) -> Self {
        Self {
            parser,
            reaction: reaction.into(),
        }
    }

    /// Decide on a reply without touching the network.
    ///
    /// Returns `None` for the bot's own messages and for anything that is not
    /// a command.
    pub fn plan_reply(&self, msg: &IncomingMessage, self_id: u64) -> Option<Reply> {
        if msg.author_id == self_id {
            return None;
        }

        info!(
            "Message {} from {} in channel {}: {}",
            msg.message_id, msg.author_id, msg.channel_id, msg.text
        );

        if !self.parser.is_command(&msg.text) {
            return None;
        }

        match self.parser.parse(&msg.text) {
            Ok(command) => {
                debug!("Answering !{} {}", command.keyword, command.number);
                Some(Reply {
                    content: format_response(&fizzbuzz(command.number)),
                    reaction: Some(self.reaction.clone()),
                })
            }
            Err(e) => {
                let help = e.to_string();
                warn!("Error while getting fizzbuzz input: {}", BotError::Parse(e));
                Some(Reply {
                    content: help,
                    reaction: None,
                })
            }
        }
    }

    /// Handle one message end to end. Delivery failures are logged and
    /// swallowed so they never affect other messages.
    pub async fn handle_message(
        &self,
        sink: &dyn ChatSink,
        msg: &IncomingMessage,
        self_id: u64,
    ) {
        let reply = match self.plan_reply(msg, self_id) {
            Some(reply) => reply,
            None => return,
        };

        if let Err(e) = self.deliver(sink, msg.channel_id, &reply).await {
            error!("{}", e);
        }
    }

    async fn deliver(
        &self,
        sink: &dyn ChatSink,
        channel_id: u64,
        reply: &Reply,
    ) -> Result<(), BotError> {
        let sent_id = sink
            .send_message(channel_id, &reply.content)
            .await
            .map_err(|e| BotError::delivery("sending reply", format!("{:#}", e)))?;

        if let Some(emoji) = &reply.reaction {
            sink.react(channel_id, sent_id, emoji)
                .await
                .map_err(|e| BotError::delivery("attaching reaction", format!("{:#}", e)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandConfig;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Mutex;

    const BOT_ID: u64 = 1;
    const USER_ID: u64 = 42;
    const CHANNEL_ID: u64 = 900;
    const HELP: &str = r"the input must match the following regex: ^!([a-z]+)\s(\d+)$";

    /// Records every call; can be told to fail sends or reactions
    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(u64, String)>>,
        reactions: Mutex<Vec<(u64, u64, String)>>,
        next_id: AtomicU64,
        fail_send: bool,
        fail_react: bool,
    }

    #[async_trait]
    impl ChatSink for RecordingSink {
        async fn send_message(&self, channel_id: u64, content: &str) -> Result<u64> {
            if self.fail_send {
                anyhow::bail!("Missing Access");
            }
            self.sent
                .lock()
                .await
                .push((channel_id, content.to_string()));
            Ok(1000 + self.next_id.fetch_add(1, Ordering::SeqCst))
        }

        async fn react(&self, channel_id: u64, message_id: u64, emoji: &str) -> Result<()> {
            if self.fail_react {
                anyhow::bail!("Missing Permissions");
            }
            self.reactions
                .lock()
                .await
                .push((channel_id, message_id, emoji.to_string()));
            Ok(())
        }
    }

    fn handler() -> MessageHandler {
        let config = CommandConfig::default();
        MessageHandler::new(CommandParser::new(&config).unwrap(), config.reaction)
    }

    fn message(author_id: u64, text: &str) -> IncomingMessage {
        IncomingMessage {
            author_id,
            channel_id: CHANNEL_ID,
            message_id: 77,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_fizzbuzz_15_replies_and_reacts() {
        let sink = RecordingSink::default();
        handler()
            .handle_message(&sink, &message(USER_ID, "!fizzbuzz 15"), BOT_ID)
            .await;

        assert_eq!(
            *sink.sent.lock().await,
            vec![(CHANNEL_ID, "```fizzbuzz```".to_string())]
        );
        assert_eq!(
            *sink.reactions.lock().await,
            vec![(CHANNEL_ID, 1000, "✅".to_string())]
        );
    }

    #[tokio::test]
    async fn test_short_alias_replies_with_number() {
        let sink = RecordingSink::default();
        handler()
            .handle_message(&sink, &message(USER_ID, "!fb 7"), BOT_ID)
            .await;

        assert_eq!(
            *sink.sent.lock().await,
            vec![(CHANNEL_ID, "```7```".to_string())]
        );
        assert_eq!(sink.reactions.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_any_lowercase_keyword_after_prefix_is_answered() {
        let sink = RecordingSink::default();
        handler()
            .handle_message(&sink, &message(USER_ID, "!fbx 9"), BOT_ID)
            .await;

        assert_eq!(
            *sink.sent.lock().await,
            vec![(CHANNEL_ID, "```fizz```".to_string())]
        );
        assert_eq!(sink.reactions.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_number_sends_help_without_reaction() {
        let sink = RecordingSink::default();
        handler()
            .handle_message(&sink, &message(USER_ID, "!fizzbuzz"), BOT_ID)
            .await;

        assert_eq!(
            *sink.sent.lock().await,
            vec![(CHANNEL_ID, HELP.to_string())]
        );
        assert!(sink.reactions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unrelated_message_is_ignored() {
        let sink = RecordingSink::default();
        handler()
            .handle_message(&sink, &message(USER_ID, "hello world"), BOT_ID)
            .await;

        assert!(sink.sent.lock().await.is_empty());
        assert!(sink.reactions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_own_messages_are_ignored() {
        let sink = RecordingSink::default();
        let h = handler();
        for text in ["!fizzbuzz 15", "!fizzbuzz", "```fizzbuzz```"] {
            h.handle_message(&sink, &message(BOT_ID, text), BOT_ID).await;
        }

        assert!(sink.sent.lock().await.is_empty());
        assert!(sink.reactions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_skips_reaction() {
        let sink = RecordingSink {
            fail_send: true,
            ..Default::default()
        };
        handler()
            .handle_message(&sink, &message(USER_ID, "!fizzbuzz 3"), BOT_ID)
            .await;

        assert!(sink.sent.lock().await.is_empty());
        assert!(sink.reactions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_reaction_is_not_fatal() {
        let sink = RecordingSink {
            fail_react: true,
            ..Default::default()
        };
        let h = handler();
        h.handle_message(&sink, &message(USER_ID, "!fizzbuzz 5"), BOT_ID)
            .await;
        h.handle_message(&sink, &message(USER_ID, "!fizzbuzz 6"), BOT_ID)
            .await;

        assert_eq!(
            *sink.sent.lock().await,
            vec![
                (CHANNEL_ID, "```buzz```".to_string()),
                (CHANNEL_ID, "```fizz```".to_string())
            ]
        );
    }

    #[test]
    fn test_plan_reply() {
        let h = handler();
        assert_eq!(
            h.plan_reply(&message(USER_ID, "!fizzbuzz 9"), BOT_ID),
            Some(Reply {
                content: "```fizz```".to_string(),
                reaction: Some("✅".to_string()),
            })
        );
        assert_eq!(
            h.plan_reply(&message(USER_ID, "!fizzbuzz 1 2"), BOT_ID),
            Some(Reply {
                content: HELP.to_string(),
                reaction: None,
            })
        );
        assert_eq!(h.plan_reply(&message(USER_ID, "hi"), BOT_ID), None);
    }
}
