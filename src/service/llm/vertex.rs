//! Integration with Google Vertex AI (Gemini) over its REST API.
//!
//! The client is scoped to a project and region at construction time, and
//! authenticates with an OAuth bearer token.  The token comes either from
//! configuration or from the GCE metadata server, which is what Cloud Run
//! and Compute Engine workloads use for their default service account.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    types::{GenerateContentRequest, GenerateContentResponse, Res},
};

use super::{GenericLlmClient, LlmClient};

const API_VERSION: &str = "v1";

// Extra methods on `LlmClient` applied by the vertex implementation.

impl LlmClient {
    /// Creates a new Vertex AI client for the configured project and region.
    pub async fn vertex(config: &Config) -> Res<Self> {
        let client = VertexLlmClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Token payload returned by the metadata server.
#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Vertex AI LLM client implementation.
#[derive(Clone)]
pub struct VertexLlmClient {
    client: reqwest::Client,
    models_url: String,
    access_token: String,
}

impl VertexLlmClient {
    /// Create a new Vertex AI client, resolving credentials up front.
    #[instrument(name = "VertexLlmClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::new();

        let access_token = match config.access_token() {
            Some(token) => normalize_token(token).to_string(),
            None => fetch_metadata_token(&client, &config.gce_metadata_host).await?,
        };

        let models_url = models_url(&config.run_project_id, &config.run_region, config.vertex_api_base.as_deref());

        info!("Vertex AI endpoint: {}", models_url);

        Ok(Self { client, models_url, access_token })
    }
}

#[async_trait]
impl GenericLlmClient for VertexLlmClient {
    #[instrument(skip(self, prompt))]
    async fn generate_content(&self, model_name: &str, prompt: &str) -> Res<GenerateContentResponse> {
        let url = generate_content_url(&self.models_url, model_name);
        let request = GenerateContentRequest::from_prompt(prompt);

        debug!("Sending generation request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Vertex AI")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Vertex AI API error ({}): {}", status, body);
        }

        let response = response.json::<GenerateContentResponse>().await.context("Failed to parse Vertex AI response")?;

        debug!("Received {} candidate(s).", response.candidates.len());

        Ok(response)
    }
}

// Helpers.

/// Mint an access token for the default service account.
#[instrument(skip(client))]
async fn fetch_metadata_token(client: &reqwest::Client, metadata_host: &str) -> Res<String> {
    let url = metadata_token_url(metadata_host);

    let response = client
        .get(&url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .context("Failed to reach the metadata server for an access token (set GOOGLE_CLOUD_ACCESS_TOKEN when running off Google Cloud)")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Metadata server error ({}): {}", status, body);
    }

    let token = response.json::<MetadataToken>().await.context("Failed to parse metadata server token")?;

    Ok(token.access_token)
}

/// The metadata server endpoint that issues default service account tokens.
pub fn metadata_token_url(metadata_host: &str) -> String {
    let host = metadata_host.trim().trim_end_matches('/');
    let host = host.strip_prefix("http://").or_else(|| host.strip_prefix("https://")).unwrap_or(host);

    format!("http://{}/computeMetadata/v1/instance/service-accounts/default/token", host)
}

/// The publisher models collection for a project and location.
///
/// The `global` location is served from the unprefixed host.
pub fn models_url(project_id: &str, region: &str, override_base: Option<&str>) -> String {
    if let Some(base) = override_base.map(str::trim).filter(|b| !b.is_empty()) {
        return base.trim_end_matches('/').to_string();
    }

    let host = if region.eq_ignore_ascii_case("global") {
        "aiplatform.googleapis.com".to_string()
    } else {
        format!("{}-aiplatform.googleapis.com", region)
    };

    format!("https://{}/{}/projects/{}/locations/{}/publishers/google/models", host, API_VERSION, project_id, region)
}

/// The `generateContent` method URL for a model.
pub fn generate_content_url(models_url: &str, model_name: &str) -> String {
    format!("{}/{}:generateContent", models_url.trim_end_matches('/'), model_name)
}

/// Accept tokens with or without a `Bearer ` prefix.
fn normalize_token(token: &str) -> &str {
    let token = token.trim();

    match token.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => token[7..].trim_start(),
        _ => token,
    }
}

// Tests.
