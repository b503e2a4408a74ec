use std::time::Duration;

use async_trait::async_trait;
use derive_more::Debug;
use eyre::{Context, Result};
use reqwest::{Client as HttpClient, StatusCode, header::AUTHORIZATION};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::{DeliveryError, Message, Notifier, retry::with_retries};

#[derive(Serialize)]
struct CreateMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    embeds: [&'a Message; 1],
    allowed_mentions: Value,
}

/// Client for posting messages through the Discord REST API.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: HttpClient,
    api_url: Url,
    #[debug(skip)]
    bot_token: String,
}

impl DiscordClient {
    /// Create a new client for `api_url` (e.g. `https://discord.com/api/v10`).
    pub fn new(api_url: Url, bot_token: String, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .wrap_err("failed to build Discord HTTP client")?;
        Ok(Self { http, api_url, bot_token })
    }

    fn messages_url(&self, channel_id: u64) -> String {
        format!("{}/channels/{channel_id}/messages", self.api_url.as_str().trim_end_matches('/'))
    }
}

/// `@here`/`@everyone` are only honoured when explicitly requested.
fn allowed_mentions(mention: Option<&str>) -> Value {
    match mention {
        Some(m) if m.contains("@here") || m.contains("@everyone") => {
            json!({ "parse": ["users", "everyone"] })
        }
        Some(_) => json!({ "parse": ["users"] }),
        None => json!({ "parse": [] }),
    }
}

#[async_trait]
impl Notifier for DiscordClient {
    async fn send(
        &self,
        channel_id: u64,
        mention: Option<&str>,
        message: &Message,
    ) -> Result<(), DeliveryError> {
        let url = self.messages_url(channel_id);
        let body = CreateMessage {
            content: mention,
            embeds: [message],
            allowed_mentions: allowed_mentions(mention),
        };
        let auth = format!("Bot {}", self.bot_token);

        let status = with_retries(|| async {
            let resp = self.http.post(&url).header(AUTHORIZATION, &auth).json(&body).send().await?;
            let status = resp.status();
            if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND {
                return Ok(status);
            }
            resp.error_for_status().map(|r| r.status())
        })
        .await
        .map_err(|e| DeliveryError::Other(e.to_string()))?;

        match status {
            StatusCode::FORBIDDEN => Err(DeliveryError::Forbidden { channel_id }),
            StatusCode::NOT_FOUND => Err(DeliveryError::NotFound { channel_id }),
            _ => {
                debug!(channel_id, title = message.title(), "message delivered");
                Ok(())
            }
        }
    }
}
