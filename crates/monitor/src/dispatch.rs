//! Delivery of alerts to chat channels with per-target error isolation.

use notifier::{DeliveryError, Message, Notifier};
use store::models::ChainPreference;
use tracing::{debug, error, warn};

/// Mention string for a chat user.
pub fn user_mention(user_id: u64) -> String {
    format!("<@{user_id}>")
}

/// Send one message and log the outcome. Returns whether it was delivered.
///
/// Failures never propagate: one unreachable channel must not block the rest of a cycle.
pub async fn deliver(
    notifier: &dyn Notifier,
    channel_id: u64,
    mention: Option<&str>,
    message: &Message,
) -> bool {
    match notifier.send(channel_id, mention, message).await {
        Ok(()) => {
            debug!(channel_id, title = message.title(), "notification sent");
            true
        }
        Err(e @ (DeliveryError::Forbidden { .. } | DeliveryError::NotFound { .. })) => {
            warn!(channel_id, error = %e, "cannot post to channel");
            false
        }
        Err(e) => {
            error!(channel_id, title = message.title(), error = %e, "failed to send notification");
            false
        }
    }
}

/// Send `message` to every channel in `preferences` accepted by `wants`, using each channel's
/// mention preference. Returns the number of successful deliveries.
pub async fn fan_out(
    notifier: &dyn Notifier,
    preferences: &[ChainPreference],
    wants: impl Fn(&ChainPreference) -> bool,
    message: &Message,
) -> usize {
    let mut delivered = 0;
    for pref in preferences.iter().filter(|p| wants(p)) {
        if deliver(notifier, pref.channel_id, pref.mention_type.mention(), message).await {
            delivered += 1;
        }
    }
    delivered
}
