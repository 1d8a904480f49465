//! Discord chat service integration for motivation-bot.
//!
//! Messages go through the Discord bot REST API:
//! - The session is an HTTP client carrying the `Bot` authorization header
//! - Delivery is a single "create message" call per channel
//!
//! No gateway connection is opened; the bot only posts.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{CreateMessageRequest, Res, Void},
};

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the discord implementation.

impl ChatClient {
    /// Creates a new Discord chat client.
    pub fn discord(config: &Config) -> Res<Self> {
        let client = DiscordChatClient::new(config)?;
        Ok(client.into())
    }
}

impl From<DiscordChatClient> for ChatClient {
    fn from(client: DiscordChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// The part of a created message we report on.
#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: String,
}

/// Discord client implementation.
#[derive(Clone)]
pub struct DiscordChatClient {
    client: reqwest::Client,
    api_base: String,
}

impl DiscordChatClient {
    /// Create a new Discord chat client.
    #[instrument(name = "DiscordChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bot {}", config.discord_bot_token)).context("Discord bot token is not a valid header value")?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(concat!("DiscordBot (", env!("CARGO_PKG_NAME"), ", ", env!("CARGO_PKG_VERSION"), ")")));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            api_base: config.discord_api_base.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.api_base, channel_id)
    }
}

#[async_trait]
impl GenericChatClient for DiscordChatClient {
    #[instrument(skip(self, text))]
    async fn send_message(&self, channel_id: &str, text: &str) -> Void {
        let request = CreateMessageRequest { content: text.to_string() };

        let response = self
            .client
            .post(self.messages_url(channel_id))
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Discord API error ({}): {}", status, body);
        }

        match response.json::<CreatedMessage>().await {
            Ok(created) => info!("Sent message {} to channel {}.", created.id, channel_id),
            Err(_) => info!("Sent message to channel {}.", channel_id),
        }

        Ok(())
    }
}

// Tests.
