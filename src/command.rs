use regex::Regex;

use crate::config::CommandConfig;
use crate::error::{BotError, ParseError};

/// Sigil every command starts with
pub const COMMAND_SIGIL: char = '!';

/// A successfully parsed `!<keyword> <number>` message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub keyword: String,
    pub number: i64,
}

/// Recognizes command messages and extracts their numeric argument.
///
/// Built once at startup from [`CommandConfig`] and shared read-only by every
/// handler invocation.
#[derive(Debug, Clone)]
pub struct CommandParser {
    prefixes: Vec<String>,
    pattern: Regex,
}

impl CommandParser {
    pub fn new(config: &CommandConfig) -> Result<Self, BotError> {
        let pattern = Regex::new(&config.pattern)
            .map_err(|e| BotError::Config(format!("invalid command pattern: {}", e)))?;

        // Group 0 is the whole match; we need exactly keyword and number on top.
        if pattern.captures_len() != 3 {
            return Err(BotError::Config(format!(
                "command pattern must have exactly 2 capture groups, found {}",
                pattern.captures_len() - 1
            )));
        }

        let prefixes = config
            .names
            .iter()
            .map(|name| format!("{}{}", COMMAND_SIGIL, name))
            .collect();

        Ok(Self { prefixes, pattern })
    }

    /// Cheap check deciding whether a message is addressed to the bot at all
    pub fn is_command(&self, text: &str) -> bool {
        self.prefixes.iter().any(|prefix| text.starts_with(prefix))
    }

    pub fn parse(&self, text: &str) -> Result<Command, ParseError> {
        let caps = self.pattern.captures(text).ok_or_else(|| self.error())?;

        let (keyword, digits) = match (caps.get(1), caps.get(2)) {
            (Some(keyword), Some(digits)) => (keyword.as_str(), digits.as_str()),
            _ => return Err(self.error()),
        };

        let number = digits.parse::<i64>().map_err(|_| self.error())?;

        Ok(Command {
            keyword: keyword.to_string(),
            number,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn error(&self) -> ParseError {
        ParseError::new(self.pattern.as_str())
    }
}
