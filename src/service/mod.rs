//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the motivation-bot:
//! - Chat services (e.g., Discord)
//! - LLM services (e.g., Vertex AI Gemini)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod llm;
