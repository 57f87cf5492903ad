use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::session::GenerationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    // System messages are informational only and never sent back as history.
    pub fn is_conversational(&self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<GenerationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styleless_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
            step: None,
            styleless_response: None,
            final_response: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// A completed turn: the styled text is both the content and the final response.
    pub fn assistant(styleless_response: String, final_response: String) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: final_response.clone(),
            step: Some(GenerationStatus::Done),
            styleless_response: Some(styleless_response),
            final_response: Some(final_response),
        }
    }

    pub fn has_generation_details(&self) -> bool {
        self.step == Some(GenerationStatus::Done) && self.styleless_response.is_some()
    }
}
