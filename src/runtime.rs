//! Runtime services and shared state for the motivation-bot.

use anyhow::Context;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        prompts::GENERATION_MODEL,
        types::{Res, Void},
    },
    service::{chat::ChatClient, llm::LlmClient},
};

/// Runtime service context for a single run.
///
/// This struct holds the configuration and the two service clients.
/// It is trivially cloneable, and tests build it directly with mocked clients.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance backed by Vertex AI and Discord.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client.
        let llm = LlmClient::vertex(&config).await.context("error creating generative AI client")?;

        // Initialize the chat client.
        let chat = ChatClient::discord(&config).context("error creating chat session")?;

        Ok(Self { config, llm, chat })
    }

    /// Generate the message, then deliver it.  Runs exactly once.
    #[instrument(skip_all)]
    pub async fn run(&self) -> Void {
        let message = self.llm.generate(GENERATION_MODEL).await.context("error generating content")?;

        info!("Content generated; sending to channel {} ...", self.config.discord_channel_id);

        self.chat.send_message(&self.config.discord_channel_id, &message).await.context("error sending message")?;

        Ok(())
    }
}
