//! Library root for `motivation-bot`.
//!
//! Motivation-bot is a one-shot job that:
//! - Asks a Gemini model on Vertex AI for a short poem about cycling
//! - Posts the generated text to a Discord channel
//!
//! It is meant to be invoked by an external scheduler.  Any failure ends the
//! run with a non-zero exit status; nothing is retried.

pub mod base;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::{error, info};

/// Public async entry for the binary crate.
///
/// Builds the runtime context with the LLM and chat clients, and performs the
/// single generate-then-send run.
pub async fn start(config: Config) -> Void {
    info!("Starting motivation-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Run once.
    runtime.run().await?;

    info!("Message delivered.");

    Ok(())
}

/// Map the outcome of a run to a process exit status, logging any failure.
pub fn report(result: &Void) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            error!("{}", failure_message(err));
            1
        }
    }
}

/// The logged form of a fatal error, including its full cause chain.
pub fn failure_message(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
