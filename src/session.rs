use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::character::CharacterProfile;
use crate::message::ChatMessage;
use crate::prompts::render_history;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Analyzing,
    GeneratingContent,
    ApplyingStyle,
    Done,
    Error,
}

impl GenerationStatus {
    /// True while an analysis or a chat turn is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            GenerationStatus::Analyzing
                | GenerationStatus::GeneratingContent
                | GenerationStatus::ApplyingStyle
        )
    }

    pub fn is_chatting(&self) -> bool {
        matches!(
            self,
            GenerationStatus::GeneratingContent | GenerationStatus::ApplyingStyle
        )
    }

    pub fn step_label(&self) -> Option<&'static str> {
        match self {
            GenerationStatus::GeneratingContent => Some("Step 1: generating reply content"),
            GenerationStatus::ApplyingStyle => Some("Step 2: applying the character's voice"),
            GenerationStatus::Analyzing => Some("Analyzing character"),
            _ => None,
        }
    }
}

// The one session the pipeline works on: current profile, transcript, status and banner.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Session {
    pub profile: Option<CharacterProfile>,
    pub transcript: Vec<ChatMessage>,
    pub status: GenerationStatus,
    pub error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.transcript
            .iter()
            .filter(|message| message.role.is_conversational())
    }

    pub fn history_text(&self) -> String {
        render_history(&self.transcript)
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}
