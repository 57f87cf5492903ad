// app_state.rs
use strum_macros::{Display, EnumIter};

// Which editor receives keystrokes.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Display, EnumIter)]
pub enum Focus {
    #[default]
    #[strum(to_string = "Sample text")]
    SourceText,
    #[strum(to_string = "Personality")]
    Personality,
    #[strum(to_string = "Speech style")]
    LanguageStyle,
    #[strum(to_string = "Long-term memory")]
    Memory,
    #[strum(to_string = "Chat")]
    ChatInput,
}

impl Focus {
    // Everything but the sample text needs an analyzed character.
    pub fn needs_profile(&self) -> bool {
        !matches!(self, Focus::SourceText)
    }
}
