use thiserror::Error;

use crate::pipeline::Stage;

// Enum for handling application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("OPENAI_API_KEY is not set in the environment")]
    MissingApiKey, // Fatal: the program refuses to start without a credential.

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

// Errors raised by the text generation service.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Generation service unavailable: {0}")]
    Unavailable(String),
}

// Errors surfaced by the generation pipeline. The Display text is what the
// user sees in the banner and in system messages.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} failed: {source}")]
    OracleFailure {
        stage: Stage,
        #[source]
        source: OracleError,
    },

    #[error("The character analysis could not be read: {0}")]
    MalformedAnalysisResult(String),

    #[error("The input is empty")]
    EmptyInput,

    #[error("No character has been analyzed yet")]
    NoProfile,
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::MalformedAnalysisResult(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
