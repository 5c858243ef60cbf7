use thiserror::Error;

/// A message looked like a command but did not match the strict pattern.
///
/// The rendered text is sent back to the channel verbatim as the help message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the input must match the following regex: {pattern}")]
pub struct ParseError {
    pub pattern: String,
}

impl ParseError {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or rejected bot token
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The gateway session could not be opened or closed
    #[error("connection error: {0}")]
    Connection(String),

    /// Recovered per message: logged, and its text sent back as help
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Sending a reply or attaching a reaction failed
    #[error("delivery failed while {action}: {reason}")]
    Delivery { action: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BotError {
    pub fn delivery(action: &'static str, err: impl std::fmt::Display) -> Self {
        BotError::Delivery {
            action,
            reason: err.to_string(),
        }
    }

    /// Startup and shutdown session errors end the process; everything else
    /// is scoped to a single message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BotError::Authentication(_) | BotError::Connection(_) | BotError::Config(_)
        )
    }
}
