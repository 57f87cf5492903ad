use std::{
    io::stdout,
    ops::{Deref, DerefMut},
    time::Duration,
};

use color_eyre::eyre::Result;

use futures::{FutureExt, StreamExt};
use ratatui::{
    DefaultTerminal,
    crossterm::{
        event::{
            DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent, KeyEvent,
            KeyEventKind,
        },
        execute,
    },
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug)]
pub enum TuiEvent {
    Error,
    Tick,
    Paste(String),
    Key(KeyEvent),
    Resize(u16, u16),
}

// Owns the terminal and a background task turning crossterm input into TuiEvents.
pub struct Tui {
    terminal: DefaultTerminal,
    task: Option<JoinHandle<()>>,
    cancellation_token: CancellationToken,
    event_rx: UnboundedReceiver<TuiEvent>,
    tick_rate: f64,
    restored: bool,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let (_, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: ratatui::init(),
            task: None,
            cancellation_token: CancellationToken::new(),
            event_rx,
            tick_rate: 8.0,
            restored: false,
        })
    }

    /// Ticks per second; ticks advance the spinner.
    pub fn tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn enter(&mut self) -> Result<()> {
        // Pasted text arrives as one Paste event instead of a burst of key presses.
        execute!(stdout(), EnableBracketedPaste)?;

        let tick_delay = Duration::from_secs_f64(1.0 / self.tick_rate);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.event_rx = event_rx;
        self.cancellation_token = CancellationToken::new();
        let cancellation_token = self.cancellation_token.clone();

        self.task = Some(tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_delay);
            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();
                let event = tokio::select! {
                    _ = cancellation_token.cancelled() => break,
                    maybe_event = crossterm_event => match maybe_event {
                        Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                            TuiEvent::Key(key)
                        }
                        Some(Ok(CrosstermEvent::Paste(text))) => TuiEvent::Paste(text),
                        Some(Ok(CrosstermEvent::Resize(x, y))) => TuiEvent::Resize(x, y),
                        Some(Ok(_)) => continue,
                        Some(Err(_)) => TuiEvent::Error,
                        None => break,
                    },
                    _ = tick => TuiEvent::Tick,
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        }));
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.cancellation_token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let paste = execute!(stdout(), DisableBracketedPaste);
        ratatui::restore();
        self.restored = true;
        log::info!("Narikiri exit: {}", chrono::Local::now());
        paste?;
        Ok(())
    }

    pub async fn next(&mut self) -> Option<TuiEvent> {
        self.event_rx.recv().await
    }
}

impl Deref for Tui {
    type Target = DefaultTerminal;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            log::error!("Failed to restore the terminal: {e}");
        }
    }
}
