pub mod vertex;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::base::{
    prompts::GENERATION_PROMPT,
    types::{GenerateContentResponse, Res},
};

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the single call the bot makes against a generative model.
/// Implementing this trait allows different model providers to be used, and
/// lets tests substitute canned responses.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Issue one content generation request.
    ///
    /// The client is already scoped to its project and region; the model is
    /// selected by name per call.  No retries are made.
    async fn generate_content(&self, model_name: &str, prompt: &str) -> Res<GenerateContentResponse>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }

    /// Generate the motivational text with the fixed prompt.
    ///
    /// Returns the first segment of the first candidate, rendered as plain text.
    #[instrument(skip(self))]
    pub async fn generate(&self, model_name: &str) -> Res<String> {
        let response = self.inner.generate_content(model_name, GENERATION_PROMPT).await?;
        let text = response.first_text()?;

        info!("Generated {} characters of content.", text.chars().count());

        Ok(text)
    }
}
