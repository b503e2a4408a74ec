//! Outbound chat notifications: message model and Discord delivery.
#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;

/// Discord REST client
pub mod discord;
mod error;
/// Structured message model
pub mod message;
/// Retry helpers for HTTP operations
mod retry;
#[cfg(any(test, feature = "test-util"))]
mod recording;

pub use discord::DiscordClient;
pub use error::DeliveryError;
pub use message::{Color, Field, Message};
#[cfg(any(test, feature = "test-util"))]
pub use recording::{RecordingNotifier, SentMessage};

/// Sends messages to chat channels.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `message` to `channel_id`, prefixed by `mention` if given.
    async fn send(
        &self,
        channel_id: u64,
        mention: Option<&str>,
        message: &Message,
    ) -> Result<(), DeliveryError>;
}
