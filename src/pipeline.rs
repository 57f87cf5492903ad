// src/pipeline.rs
use strum_macros::Display;
use tokio::sync::mpsc;

use crate::character::CharacterProfile;
use crate::error::PipelineError;
use crate::message::ChatMessage;
use crate::oracle::{Oracle, extract_json};
use crate::prompts::{analysis_prompt, content_prompt, style_prompt};
use crate::session::{GenerationStatus, Session};

// The oracle calls the pipeline makes, named for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    #[strum(to_string = "Character analysis")]
    Analysis,
    #[strum(to_string = "Reply content generation")]
    Content,
    #[strum(to_string = "Speech style application")]
    Style,
}

// Progress notifications for whoever renders the session while a flow is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Status(GenerationStatus),
    Appended(ChatMessage),
    ProfileReplaced(CharacterProfile),
    TranscriptCleared,
    Banner(Option<String>),
}

/// Drives analysis and the two stage chat turn against an [`Oracle`].
///
/// Calls must be serialized by the caller: every operation takes `&mut self`
/// and the pipeline itself holds no lock.
pub struct Pipeline<O> {
    oracle: O,
    session: Session,
    events: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl<O: Oracle> Pipeline<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            session: Session::new(),
            events: None,
        }
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> GenerationStatus {
        self.session.status
    }

    pub fn profile(&self) -> Option<&CharacterProfile> {
        self.session.profile.as_ref()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.session.transcript
    }

    /// Direct user edits of the current profile.
    pub fn profile_mut(&mut self) -> Option<&mut CharacterProfile> {
        self.session.profile.as_mut()
    }

    pub fn dismiss_error(&mut self) {
        self.session.dismiss_error();
        self.emit(PipelineEvent::Banner(None));
    }

    /// Derives a new profile from sample text. On success the previous profile
    /// and the whole transcript are replaced; on failure both are left as they were.
    pub async fn analyze(&mut self, source_text: &str) -> Result<CharacterProfile, PipelineError> {
        if source_text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        self.set_banner(None);
        self.set_status(GenerationStatus::Analyzing);
        log::info!("Analyzing {} chars of sample text", source_text.len());

        match self.request_profile(source_text).await {
            Ok(profile) => {
                self.session.profile = Some(profile.clone());
                self.session.transcript.clear();
                self.emit(PipelineEvent::ProfileReplaced(profile.clone()));
                self.emit(PipelineEvent::TranscriptCleared);
                self.set_status(GenerationStatus::Idle);
                log::info!(
                    "Character analyzed with {} memory facts",
                    profile.long_term_memory.len()
                );
                Ok(profile)
            }
            Err(e) => {
                log::error!("Character analysis failed: {e}");
                self.set_banner(Some(e.to_string()));
                self.set_status(GenerationStatus::Error);
                Err(e)
            }
        }
    }

    async fn request_profile(&self, source_text: &str) -> Result<CharacterProfile, PipelineError> {
        let response = self
            .oracle
            .complete(&analysis_prompt(source_text))
            .await
            .map_err(|source| PipelineError::OracleFailure {
                stage: Stage::Analysis,
                source,
            })?;
        let profile = CharacterProfile::from_json(extract_json(&response))?;
        Ok(profile)
    }

    /// Runs one chat turn. The user message is kept in the transcript even when
    /// a later stage fails; the failure is recorded as a system message.
    pub async fn send_message(&mut self, message: &str) -> Result<ChatMessage, PipelineError> {
        if message.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        let Some(profile) = self.session.profile.clone() else {
            return Err(PipelineError::NoProfile);
        };

        self.append(ChatMessage::user(message));
        self.set_banner(None);
        self.set_status(GenerationStatus::GeneratingContent);

        match self.generate_reply(&profile, message).await {
            Ok(reply) => {
                self.append(reply.clone());
                self.set_status(GenerationStatus::Idle);
                Ok(reply)
            }
            Err(e) => {
                log::error!("Chat turn failed: {e}");
                self.append(ChatMessage::system(format!("Error: {e}")));
                self.set_banner(Some(e.to_string()));
                self.set_status(GenerationStatus::Error);
                Err(e)
            }
        }
    }

    async fn generate_reply(
        &mut self,
        profile: &CharacterProfile,
        message: &str,
    ) -> Result<ChatMessage, PipelineError> {
        // The transcript already holds the new user message at this point.
        let history_text = self.session.history_text();
        let prompt = content_prompt(
            &profile.personality,
            &profile.long_term_memory,
            &history_text,
            message,
        );
        let styleless_response =
            self.oracle
                .complete(&prompt)
                .await
                .map_err(|source| PipelineError::OracleFailure {
                    stage: Stage::Content,
                    source,
                })?;
        log::debug!("Styleless response: {styleless_response}");

        self.set_status(GenerationStatus::ApplyingStyle);
        let prompt = style_prompt(&profile.language_style, &styleless_response);
        let final_response =
            self.oracle
                .complete(&prompt)
                .await
                .map_err(|source| PipelineError::OracleFailure {
                    stage: Stage::Style,
                    source,
                })?;
        log::debug!("Final response: {final_response}");

        Ok(ChatMessage::assistant(styleless_response, final_response))
    }

    fn append(&mut self, message: ChatMessage) {
        self.session.transcript.push(message.clone());
        self.emit(PipelineEvent::Appended(message));
    }

    fn set_status(&mut self, status: GenerationStatus) {
        self.session.status = status;
        self.emit(PipelineEvent::Status(status));
    }

    fn set_banner(&mut self, banner: Option<String>) {
        self.session.error = banner.clone();
        self.emit(PipelineEvent::Banner(banner));
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
