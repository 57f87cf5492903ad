// /app.rs
use crate::{
    app_state::Focus,
    oracle::Oracle,
    pipeline::{Pipeline, PipelineEvent},
    session::{GenerationStatus, Session},
    settings::Settings,
    tui::{Tui, TuiEvent},
    ui::{
        self,
        constants::EXAMPLE_SOURCE_TEXT,
        spinner::Spinner,
        textarea::{new_textarea, new_textarea_with_text, textarea_text},
    },
};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use strum::IntoEnumIterator;
use tokio::sync::mpsc;
use tui_textarea::TextArea;

pub enum Action<O> {
    Quit,
    Analyze(String),
    SendMessage(String),
    LoadExample,
    DismissError,
    // A flow finished and hands the pipeline back.
    Settled(Box<Pipeline<O>>),
}

pub struct App<O> {
    running: bool,
    pub settings: Settings,

    // None while a flow is in flight: the spawned task owns it.
    pipeline: Option<Pipeline<O>>,
    // What the UI renders, kept current through pipeline events.
    pub session: Session,

    // --- Editors
    pub focus: Focus,
    pub source_text: TextArea<'static>,
    pub personality: TextArea<'static>,
    pub language_style: TextArea<'static>,
    pub memory_state: ListState,
    pub memory_editor: Option<TextArea<'static>>,
    pub chat_input: TextArea<'static>,

    // --- UI elements
    pub spinner: Spinner,
    pub show_details: bool,
    pub chat_scroll: usize,

    action_sender: mpsc::UnboundedSender<Action<O>>,
    action_receiver: mpsc::UnboundedReceiver<Action<O>>,
    event_receiver: mpsc::UnboundedReceiver<PipelineEvent>,
}

impl<O> App<O> {
    /// True when no flow is in flight and the pipeline can take a new call.
    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some() && !self.session.status.is_busy()
    }

    pub fn has_profile(&self) -> bool {
        self.session.profile.is_some()
    }

    pub fn focus_enabled(&self, focus: Focus) -> bool {
        if focus.needs_profile() && !self.has_profile() {
            return false;
        }
        match focus {
            Focus::SourceText => {
                self.session.status != GenerationStatus::Analyzing
            }
            _ => self.is_ready(),
        }
    }
}

impl<O> App<O>
where
    O: Oracle + Send + Sync + 'static,
{
    pub fn new(settings: Settings, oracle: O) -> Self {
        let (action_sender, action_receiver) = mpsc::unbounded_channel();
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let pipeline = Pipeline::new(oracle).with_events(event_sender);

        Self {
            running: true,
            settings,
            session: pipeline.session().clone(),
            pipeline: Some(pipeline),

            focus: Focus::SourceText,
            source_text: new_textarea("Paste dialogue or prose that shows the character..."),
            personality: new_textarea(""),
            language_style: new_textarea(""),
            memory_state: ListState::default(),
            memory_editor: None,
            chat_input: new_textarea("Type a message... (Alt+Enter for a new line)"),

            spinner: Spinner::new(),
            show_details: false,
            chat_scroll: 0,

            action_sender,
            action_receiver,
            event_receiver,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?.tick_rate(8.0);
        tui.enter()?;
        log::info!("Narikiri started with model {}", self.settings.model);

        while self.running {
            tui.draw(|frame| ui::draw(frame, self))?;

            tokio::select! {
                Some(event) = tui.next() => self.handle_tui_event(event),
                Some(action) = self.action_receiver.recv() => self.handle_action(action),
                Some(event) = self.event_receiver.recv() => self.apply_event(event),
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn handle_tui_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key) => self.on_key(key),
            TuiEvent::Paste(text) => {
                if let Some(textarea) = self.focused_textarea() {
                    textarea.insert_str(text);
                    self.sync_profile_edits();
                }
            }
            TuiEvent::Tick => {
                if self.session.status.is_busy() {
                    self.spinner.next_frame();
                }
            }
            TuiEvent::Error => log::warn!("Terminal event stream reported an error"),
            TuiEvent::Resize(_, _) => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.queue(Action::Quit);
                return;
            }
            KeyCode::Char('s') if ctrl => {
                self.queue(Action::Analyze(textarea_text(&self.source_text)));
                return;
            }
            KeyCode::Char('l') if ctrl => {
                self.queue(Action::LoadExample);
                return;
            }
            KeyCode::Char('d') if ctrl => {
                self.show_details = !self.show_details;
                return;
            }
            KeyCode::Tab => {
                self.cycle_focus(true);
                return;
            }
            KeyCode::BackTab => {
                self.cycle_focus(false);
                return;
            }
            KeyCode::PageUp => {
                self.chat_scroll = self.chat_scroll.saturating_add(5);
                return;
            }
            KeyCode::PageDown => {
                self.chat_scroll = self.chat_scroll.saturating_sub(5);
                return;
            }
            KeyCode::Esc if self.memory_editor.is_none() => {
                self.queue(Action::DismissError);
                return;
            }
            _ => {}
        }

        if !self.focus_enabled(self.focus) {
            return;
        }

        match self.focus {
            Focus::SourceText => {
                self.source_text.input(key);
            }
            Focus::Personality => {
                self.personality.input(key);
                self.sync_profile_edits();
            }
            Focus::LanguageStyle => {
                self.language_style.input(key);
                self.sync_profile_edits();
            }
            Focus::Memory => self.on_memory_key(key),
            Focus::ChatInput => match key.code {
                KeyCode::Enter if alt => self.chat_input.insert_newline(),
                KeyCode::Enter => {
                    let message = textarea_text(&self.chat_input);
                    if !message.trim().is_empty() {
                        self.queue(Action::SendMessage(message));
                    }
                }
                _ => {
                    self.chat_input.input(key);
                }
            },
        }
    }

    fn on_memory_key(&mut self, key: KeyEvent) {
        if let Some(editor) = self.memory_editor.as_mut() {
            match key.code {
                KeyCode::Esc => self.memory_editor = None,
                KeyCode::Enter => {
                    let value = textarea_text(editor);
                    self.memory_editor = None;
                    self.commit_memory_value(value);
                }
                _ => {
                    editor.input(key);
                }
            }
            return;
        }

        let fact_count = self
            .session
            .profile
            .as_ref()
            .map_or(0, |profile| profile.long_term_memory.len());
        if fact_count == 0 {
            return;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.memory_state.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => {
                let next = self.memory_state.selected().map_or(0, |i| i + 1);
                self.memory_state.select(Some(next.min(fact_count - 1)));
            }
            KeyCode::Enter => {
                let selected = self.memory_state.selected().unwrap_or(0);
                let value = self
                    .session
                    .profile
                    .as_ref()
                    .and_then(|profile| profile.long_term_memory.get_index(selected))
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default();
                self.memory_state.select(Some(selected));
                self.memory_editor = Some(new_textarea_with_text(&value, "Fact value"));
            }
            _ => {}
        }
    }

    fn commit_memory_value(&mut self, value: String) {
        let Some(selected) = self.memory_state.selected() else {
            return;
        };
        let Some(key) = self
            .session
            .profile
            .as_ref()
            .and_then(|profile| profile.long_term_memory.get_index(selected))
            .map(|(key, _)| key.clone())
        else {
            return;
        };

        // Values only; fact names stay as the analysis produced them.
        if let Some(profile) = self.pipeline.as_mut().and_then(|p| p.profile_mut()) {
            profile.set_memory(key.clone(), value.clone());
        }
        if let Some(profile) = self.session.profile.as_mut() {
            profile.set_memory(key, value);
        }
    }

    // Writes the profile editors back into the profile, as the user types.
    fn sync_profile_edits(&mut self) {
        if !matches!(self.focus, Focus::Personality | Focus::LanguageStyle) {
            return;
        }
        let personality = textarea_text(&self.personality);
        let language_style = textarea_text(&self.language_style);

        let pipeline_profile = self.pipeline.as_mut().and_then(|p| p.profile_mut());
        for profile in pipeline_profile
            .into_iter()
            .chain(self.session.profile.as_mut())
        {
            profile.set_personality(personality.clone());
            profile.set_language_style(language_style.clone());
        }
    }

    /// Applies one action. Analyze and send are ignored while a flow is in flight.
    pub fn handle_action(&mut self, action: Action<O>) {
        match action {
            Action::Quit => self.running = false,
            Action::LoadExample => {
                if self.session.status != GenerationStatus::Analyzing {
                    self.source_text = new_textarea_with_text(EXAMPLE_SOURCE_TEXT, "");
                    self.focus = Focus::SourceText;
                }
            }
            Action::DismissError => {
                self.session.dismiss_error();
                if let Some(pipeline) = self.pipeline.as_mut() {
                    pipeline.dismiss_error();
                }
            }
            Action::Analyze(text) => {
                if text.trim().is_empty() {
                    return;
                }
                let Some(mut pipeline) = self.take_pipeline() else {
                    return;
                };
                let sender = self.action_sender.clone();
                tokio::spawn(async move {
                    // The outcome is already recorded in the session the pipeline carries back.
                    let _ = pipeline.analyze(&text).await;
                    let _ = sender.send(Action::Settled(Box::new(pipeline)));
                });
            }
            Action::SendMessage(message) => {
                if !self.has_profile() {
                    return;
                }
                let Some(mut pipeline) = self.take_pipeline() else {
                    return;
                };
                self.chat_input = new_textarea("Type a message... (Alt+Enter for a new line)");
                self.chat_scroll = 0;
                let sender = self.action_sender.clone();
                tokio::spawn(async move {
                    let _ = pipeline.send_message(&message).await;
                    let _ = sender.send(Action::Settled(Box::new(pipeline)));
                });
            }
            Action::Settled(pipeline) => {
                // Events were sent before the pipeline came back; apply what is left first.
                self.apply_pending_events();
                self.session = pipeline.session().clone();
                self.pipeline = Some(*pipeline);
            }
        }
    }

    /// Waits for the next queued action, such as a flow handing the pipeline back.
    pub async fn next_action(&mut self) -> Option<Action<O>> {
        self.action_receiver.recv().await
    }

    /// The pipeline's own session, or None while a flow owns the pipeline.
    pub fn pipeline_session(&self) -> Option<&Session> {
        self.pipeline.as_ref().map(|pipeline| pipeline.session())
    }

    fn take_pipeline(&mut self) -> Option<Pipeline<O>> {
        if self.session.status.is_busy() {
            log::warn!("Ignored a request while {} is in flight", self.session.status);
            return None;
        }
        let pipeline = self.pipeline.take();
        if pipeline.is_none() {
            log::warn!("Ignored a request while the pipeline is away");
        }
        pipeline
    }

    /// Mirrors every pipeline event queued so far into `session`.
    pub fn apply_pending_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Status(status) => self.session.status = status,
            PipelineEvent::Appended(message) => self.session.transcript.push(message),
            PipelineEvent::TranscriptCleared => {
                self.session.transcript.clear();
                self.chat_scroll = 0;
            }
            PipelineEvent::Banner(banner) => self.session.error = banner,
            PipelineEvent::ProfileReplaced(profile) => {
                self.personality = new_textarea_with_text(&profile.personality, "");
                self.language_style = new_textarea_with_text(&profile.language_style, "");
                self.memory_editor = None;
                self.memory_state
                    .select((!profile.long_term_memory.is_empty()).then_some(0));
                self.session.profile = Some(profile);
            }
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let mut order: Vec<Focus> = Focus::iter().collect();
        if !forward {
            order.reverse();
        }
        let start = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.memory_editor = None;
        self.focus = order
            .iter()
            .cycle()
            .skip(start + 1)
            .take(order.len())
            .find(|focus| !focus.needs_profile() || self.has_profile())
            .copied()
            .unwrap_or(Focus::SourceText);
    }

    fn focused_textarea(&mut self) -> Option<&mut TextArea<'static>> {
        if !self.focus_enabled(self.focus) {
            return None;
        }
        match self.focus {
            Focus::SourceText => Some(&mut self.source_text),
            Focus::Personality => Some(&mut self.personality),
            Focus::LanguageStyle => Some(&mut self.language_style),
            Focus::Memory => self.memory_editor.as_mut(),
            Focus::ChatInput => Some(&mut self.chat_input),
        }
    }

    fn queue(&self, action: Action<O>) {
        let _ = self.action_sender.send(action);
    }
}
