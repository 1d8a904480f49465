use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Errors.

/// Errors raised while pulling text out of a generation response.
///
/// These are typed (rather than plain `anyhow` messages) so callers can
/// `downcast_ref` them off the error chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The response carried no candidate, no content, or no parts.
    #[error("no content generated{}", blocked_suffix(.block_reason))]
    NoContent { block_reason: Option<String> },
    /// The first segment exists, but it is not text (e.g., a function call).
    #[error("first content segment is not text")]
    NonTextSegment,
}

fn blocked_suffix(block_reason: &Option<String>) -> String {
    block_reason.as_ref().map(|r| format!(" (blocked: {r})")).unwrap_or_default()
}

// Generation request.

/// Body of a Vertex AI `generateContent` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A request holding a single user-authored text prompt.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(prompt)],
            }],
        }
    }
}

// Generation response.

/// Response of a Vertex AI `generateContent` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// The first segment of the first candidate, if the model produced one.
    ///
    /// Every later candidate and segment is ignored.
    pub fn first_segment(&self) -> Option<&Part> {
        self.candidates.first()?.content.as_ref()?.parts.first()
    }

    /// The reason the prompt was blocked, if the service reported one.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }

    /// Render the first segment as plain text.
    pub fn first_text(&self) -> Res<String> {
        let part = self.first_segment().ok_or_else(|| ContentError::NoContent {
            block_reason: self.block_reason().map(str::to_string),
        })?;

        let text = part.text.clone().ok_or(ContentError::NonTextSegment)?;

        Ok(text)
    }
}

/// One alternative output returned for a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Ordered content segments, attributed to a role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content segment.  Only text segments are modeled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

// Chat delivery.

/// Body of a Discord "create message" call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateMessageRequest {
    pub content: String,
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_text_takes_first_segment_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {
                    "content": { "role": "model", "parts": [{ "text": "Hello" }, { "text": "ignored" }] },
                    "finishReason": "STOP"
                },
                { "content": { "role": "model", "parts": [{ "text": "also ignored" }] } }
            ],
            "usageMetadata": { "promptTokenCount": 24, "candidatesTokenCount": 1 }
        }))
        .unwrap();

        assert_eq!(response.first_text().unwrap(), "Hello");
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn empty_candidates_is_no_content_not_empty_string() {
        let response: GenerateContentResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();

        let err = response.first_text().unwrap_err();

        assert_eq!(err.downcast_ref::<ContentError>(), Some(&ContentError::NoContent { block_reason: None }));
        assert_eq!(err.to_string(), "no content generated");
    }

    #[test]
    fn missing_candidates_field_is_no_content() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();

        let err = response.first_text().unwrap_err();

        assert_eq!(err.to_string(), "no content generated (blocked: SAFETY)");
    }

    #[test]
    fn candidate_without_parts_is_no_content() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "role": "model", "parts": [] }, "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();

        assert!(response.first_segment().is_none());
        assert!(matches!(response.first_text().unwrap_err().downcast_ref::<ContentError>(), Some(ContentError::NoContent { .. })));
    }

    #[test]
    fn non_text_first_segment_is_an_error() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "functionCall": { "name": "ride" } }, { "text": "later" }] } }]
        }))
        .unwrap();

        assert_eq!(response.first_text().unwrap_err().downcast_ref::<ContentError>(), Some(&ContentError::NonTextSegment));
    }

    #[test]
    fn request_from_prompt_has_single_user_text_part() {
        let request = GenerateContentRequest::from_prompt("Go ride.");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "Go ride." }] }] })
        );
    }
}
