use thiserror::Error;

/// Failure to deliver a message to a chat channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The bot is not allowed to post in the channel.
    #[error("missing permission to send to channel {channel_id}")]
    Forbidden {
        /// Target channel
        channel_id: u64,
    },
    /// The channel does not exist or is not visible to the bot.
    #[error("channel {channel_id} not found")]
    NotFound {
        /// Target channel
        channel_id: u64,
    },
    /// Any other failure, after retries.
    #[error("delivery failed: {0}")]
    Other(String),
}
