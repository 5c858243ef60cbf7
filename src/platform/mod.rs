pub mod discord;

/// A chat message reduced to what the handler needs, independent of the
/// chat library that delivered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Platform-specific id of the author
    pub author_id: u64,
    /// Channel the message was posted in; replies go here
    pub channel_id: u64,
    pub message_id: u64,
    /// The message text
    pub text: String,
}
