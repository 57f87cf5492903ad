pub mod app;
pub mod app_state;
pub mod character;
pub mod error;
pub mod logging;
pub mod message;
pub mod oracle;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod settings;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use character::CharacterProfile;
pub use error::{AppError, OracleError, PipelineError};
pub use message::{ChatMessage, Role};
pub use oracle::{OpenAIOracle, Oracle, extract_json};
pub use pipeline::{Pipeline, PipelineEvent, Stage};
pub use session::{GenerationStatus, Session};
pub use settings::Settings;
