// ui/chat.rs

use crate::{
    app::App,
    app_state::Focus,
    message::{ChatMessage, Role},
};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

use super::{
    spinner::spinner_frame,
    textarea::{FieldState, style_textarea},
    utils::wrapped_lines,
};

pub fn draw_chat<O>(f: &mut Frame, app: &mut App<O>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(5)])
        .split(area);

    draw_transcript(f, app, chunks[0]);
    draw_chat_input(f, app, chunks[1]);
}

fn draw_transcript<O>(f: &mut Frame, app: &mut App<O>, area: Rect) {
    let title = if app.show_details {
        " Conversation (details on) "
    } else {
        " Conversation "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Gray))
        .title(title);
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    if !app.has_profile() {
        let placeholder = Paragraph::new("Analyze a character to start chatting.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(placeholder, inner_area);
        return;
    }

    if app.session.transcript.is_empty() && !app.session.status.is_chatting() {
        let hint = Paragraph::new("No messages yet. Say hello!")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, inner_area);
        return;
    }

    let max_width = (inner_area.width as usize).saturating_sub(2);
    let mut lines: Vec<Line> = app
        .session
        .transcript
        .iter()
        .flat_map(|message| message_lines(message, max_width, app.show_details))
        .collect();

    let step = spinner_frame(&app.spinner, app.session.status)
        .filter(|_| app.session.status.is_chatting());
    if let Some(text) = step {
        lines.push(Line::from(Span::styled(text, Style::default().fg(Color::Green))));
    }

    // chat_scroll counts lines up from the bottom.
    let visible_height = inner_area.height as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    app.chat_scroll = app.chat_scroll.min(max_scroll);
    let scroll = max_scroll - app.chat_scroll;

    let transcript = Paragraph::new(lines).scroll((scroll as u16, 0));
    f.render_widget(transcript, inner_area);
}

fn message_lines(message: &ChatMessage, max_width: usize, show_details: bool) -> Vec<Line<'static>> {
    let (label, style, alignment) = match message.role {
        Role::User => ("You", Style::default().fg(Color::Cyan), Alignment::Right),
        Role::Assistant => (
            "Character",
            Style::default().fg(Color::LightGreen),
            Alignment::Left,
        ),
        Role::System => ("System", Style::default().fg(Color::Red), Alignment::Left),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            label,
            style.add_modifier(Modifier::BOLD),
        ))
        .alignment(alignment),
    ];
    lines.extend(
        wrapped_lines(&message.content, max_width)
            .into_iter()
            .map(|line| Line::from(Span::styled(line, style)).alignment(alignment)),
    );

    if show_details && message.has_generation_details() {
        let detail_style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC);
        if let Some(styleless) = &message.styleless_response {
            lines.push(Line::from(Span::styled("  step 1, content:", detail_style)));
            lines.extend(
                wrapped_lines(styleless, max_width.saturating_sub(4))
                    .into_iter()
                    .map(|line| Line::from(Span::styled(format!("    {line}"), detail_style))),
            );
        }
        if let Some(final_response) = &message.final_response {
            lines.push(Line::from(Span::styled("  step 2, styled:", detail_style)));
            lines.extend(
                wrapped_lines(final_response, max_width.saturating_sub(4))
                    .into_iter()
                    .map(|line| Line::from(Span::styled(format!("    {line}"), detail_style))),
            );
        }
    }

    lines.push(Line::default());
    lines
}

fn draw_chat_input<O>(f: &mut Frame, app: &mut App<O>, area: Rect) {
    let enabled = app.focus_enabled(Focus::ChatInput);
    let state = FieldState::new(app.focus == Focus::ChatInput, enabled);
    let title = if enabled {
        " Message (Enter to send) "
    } else if app.has_profile() {
        " Message (waiting...) "
    } else {
        " Message "
    };
    style_textarea(&mut app.chat_input, title, state);
    f.render_widget(&app.chat_input, area);
}
