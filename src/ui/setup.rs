// ui/setup.rs

use crate::{app::App, app_state::Focus, session::GenerationStatus};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

use super::{
    constants::MEMORY_HINTS,
    spinner::spinner_frame,
    textarea::{FieldState, style_textarea},
    utils::center_rect,
};

// Left pane: sample text on top, the editable profile below once there is one.
pub fn draw_setup<O>(f: &mut Frame, app: &mut App<O>, area: Rect) {
    let chunks = if app.has_profile() {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(22),
                Constraint::Percentage(22),
                Constraint::Percentage(26),
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(4)])
            .split(area)
    };

    draw_source_text(f, app, chunks[0]);

    if !app.has_profile() {
        let hint = Paragraph::new(vec![
            Line::from("No character yet."),
            Line::from(Span::styled(
                "Paste sample text above and press Ctrl+S, or Ctrl+L for an example.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(hint, chunks[1]);
        return;
    }

    let personality_state = field_state(app, Focus::Personality);
    style_textarea(&mut app.personality, " Personality ", personality_state);
    f.render_widget(&app.personality, chunks[1]);

    let style_state = field_state(app, Focus::LanguageStyle);
    style_textarea(&mut app.language_style, " Speech style ", style_state);
    f.render_widget(&app.language_style, chunks[2]);

    draw_memory(f, app, chunks[3]);
}

fn field_state<O>(app: &App<O>, focus: Focus) -> FieldState {
    FieldState::new(app.focus == focus, app.focus_enabled(focus))
}

fn draw_source_text<O>(f: &mut Frame, app: &mut App<O>, area: Rect) {
    let state = field_state(app, Focus::SourceText);
    style_textarea(&mut app.source_text, " Sample text (Ctrl+S to analyze) ", state);
    f.render_widget(&app.source_text, area);

    if app.session.status != GenerationStatus::Analyzing {
        return;
    }
    if let Some(text) = spinner_frame(&app.spinner, app.session.status) {
        let spinner_area = Rect::new(area.x, area.bottom().saturating_sub(1), area.width, 1);
        let spinner_widget = Paragraph::new(text)
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center);
        f.render_widget(spinner_widget, spinner_area);
    }
}

fn draw_memory<O>(f: &mut Frame, app: &mut App<O>, area: Rect) {
    let state = field_state(app, Focus::Memory);
    let mut block = state.block(" Long-term memory ");
    if app.focus == Focus::Memory {
        block = block.title_bottom(Line::from(MEMORY_HINTS).right_aligned());
    }

    let items: Vec<ListItem> = app
        .session
        .profile
        .iter()
        .flat_map(|profile| profile.memory_facts())
        .map(|(key, value)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{}: ", key),
                    Style::default()
                        .fg(Color::LightYellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(value.to_string()),
            ]))
        })
        .collect();

    if items.is_empty() {
        let empty = Paragraph::new("(no facts recorded)")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .style(match state {
            FieldState::Disabled => Style::default().fg(Color::DarkGray),
            _ => Style::default(),
        })
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.memory_state);

    if let Some(editor) = app.memory_editor.as_mut() {
        let popup = center_rect(
            area,
            Constraint::Percentage(90),
            Constraint::Length(5),
        );
        style_textarea(editor, " Edit value (Enter to save) ", FieldState::Focused);
        f.render_widget(Clear, popup);
        f.render_widget(&*editor, popup);
    }
}
