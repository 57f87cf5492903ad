// ui/draw.rs

use crate::app::App;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

use super::{
    chat::draw_chat,
    constants::{KEY_HINTS, SUBTITLE, TITLE},
    setup::draw_setup,
};

pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 24;

pub fn draw<O>(f: &mut Frame, app: &mut App<O>) {
    let size = f.area();

    if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
        let warning = Paragraph::new("Terminal too small. Please resize.")
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        f.render_widget(warning, size);
        return;
    }

    let banner_height = if app.session.error.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(banner_height),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(f, chunks[0]);
    if let Some(error) = &app.session.error {
        render_banner(f, error, chunks[1]);
    }

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);
    draw_setup(f, app, panes[0]);
    draw_chat(f, app, panes[1]);

    render_status(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, area);
}

// The dismissible error banner.
fn render_banner(f: &mut Frame, error: &str, area: Rect) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(
            "An error occurred: ",
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        ),
        Span::styled(error, Style::default().fg(Color::LightRed)),
    ]))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .title_bottom(Line::from(" Esc to dismiss ").right_aligned()),
    );
    f.render_widget(banner, area);
}

fn render_status<O>(f: &mut Frame, app: &App<O>, area: Rect) {
    let text = if app.settings.debug_mode {
        format!(
            "{} | status: {} | focus: {} | model: {}",
            KEY_HINTS, app.session.status, app.focus, app.settings.model
        )
    } else {
        KEY_HINTS.to_string()
    };
    let status = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(status, area);
}
