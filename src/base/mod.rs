//! Core components, types, and utilities for the motivation-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The fixed model and prompt used for generation.
//! - Common types, wire payloads, and result handling.

pub mod config;
pub mod prompts;
pub mod types;
