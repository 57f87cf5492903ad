use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders};
use tui_textarea::TextArea;

pub fn new_textarea(placeholder: impl Into<String>) -> TextArea<'static> {
    new_textarea_with_text("", placeholder)
}

pub fn new_textarea_with_text(text: &str, placeholder: impl Into<String>) -> TextArea<'static> {
    let mut textarea = TextArea::new(text.split('\n').map(String::from).collect());
    textarea.set_placeholder_text(placeholder);
    textarea.set_cursor_line_style(Style::default());
    textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
    textarea.set_selection_style(Style::new().bg(Color::LightCyan));
    textarea
}

pub fn textarea_text(textarea: &TextArea) -> String {
    textarea.lines().join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Focused,
    Idle,
    Disabled,
}

impl FieldState {
    pub fn new(focused: bool, enabled: bool) -> Self {
        match (focused, enabled) {
            (_, false) => FieldState::Disabled,
            (true, true) => FieldState::Focused,
            (false, true) => FieldState::Idle,
        }
    }

    fn color(&self) -> Color {
        match self {
            FieldState::Focused => Color::LightCyan,
            FieldState::Idle => Color::Gray,
            FieldState::Disabled => Color::DarkGray,
        }
    }

    pub fn block<'a>(self, title: impl Into<Line<'a>>) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.color()))
            .title(title)
    }

    pub fn cursor_style(&self) -> Style {
        match self {
            FieldState::Focused => Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::REVERSED),
            // No visible cursor outside the focused field.
            _ => Style::default(),
        }
    }
}

/// Applies border, cursor and text colour for the field's current state.
pub fn style_textarea<'a>(textarea: &mut TextArea<'a>, title: &'a str, state: FieldState) {
    textarea.set_block(state.block(title));
    textarea.set_cursor_style(state.cursor_style());
    textarea.set_style(match state {
        FieldState::Disabled => Style::default().fg(Color::DarkGray),
        _ => Style::default(),
    });
}
