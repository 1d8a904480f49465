//! Fixed generation inputs.

/// The Gemini model every run asks for.
pub const GENERATION_MODEL: &str = "gemini-1.0-pro-001";

/// The prompt every run sends.
pub const GENERATION_PROMPT: &str = "Write a new poem to encourage someone to go outside and cycle, instead of staying inside and code on the computer.";
