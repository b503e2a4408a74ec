use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::{DeliveryError, Message, Notifier};

/// A message captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Target channel
    pub channel_id: u64,
    /// Mention text, if any
    pub mention: Option<String>,
    /// Message body
    pub message: Message,
}

/// In-memory [`Notifier`] that records every delivered message.
///
/// Channels can be configured to fail so callers' error isolation can be exercised.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    failures: Mutex<HashMap<u64, DeliveryError>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `channel_id` fail with `error`.
    pub fn fail_channel(&self, channel_id: u64, error: DeliveryError) {
        lock(&self.failures).insert(channel_id, error);
    }

    /// All messages delivered so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    /// Titles of all messages delivered so far.
    pub fn titles(&self) -> Vec<String> {
        lock(&self.sent).iter().map(|m| m.message.title().to_owned()).collect()
    }

    /// Drain the recorded messages.
    pub fn take(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *lock(&self.sent))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        channel_id: u64,
        mention: Option<&str>,
        message: &Message,
    ) -> Result<(), DeliveryError> {
        if let Some(err) = lock(&self.failures).get(&channel_id) {
            return Err(err.clone());
        }
        lock(&self.sent).push(SentMessage {
            channel_id,
            mention: mention.map(str::to_owned),
            message: message.clone(),
        });
        Ok(())
    }
}
