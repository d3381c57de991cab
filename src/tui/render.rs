//! Frame layout and widgets

use super::App;
use crate::transcript::{Message, Sender};
use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const TITLE: &str = "AI Chat";

pub fn draw(app: &mut App, frame: &mut Frame) {
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(app, frame, header_area);
    draw_transcript(app, frame, chat_area);
    draw_input(app, frame, input_area);
    draw_footer(app, frame, footer_area);
}

fn draw_header(app: &App, frame: &mut Frame, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            format!(" {TITLE} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("→ {}", app.endpoint),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn draw_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let inner_width = area.width.saturating_sub(2);
    let viewport = area.height.saturating_sub(2);

    let lines = transcript_lines(app);
    let content = wrapped_height(&lines, inner_width);
    app.layout_pane(content, viewport);
    let offset = app.pane.map_or(0, |pane| pane.offset);

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    frame.render_widget(chat, area);
}

fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for message in app.snapshot.messages.iter() {
        lines.push(message_heading(message));
        let body_style = if message.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        for text in message.text.lines() {
            lines.push(Line::from(Span::styled(text.to_string(), body_style)));
        }
        lines.push(Line::default());
    }

    if app.snapshot.typing {
        let dots = ".".repeat(usize::from(app.animation_frame) + 1);
        lines.push(Line::from(Span::styled(
            format!("AI is thinking{dots}"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn message_heading(message: &Message) -> Line<'static> {
    let (label, color) = match message.sender {
        Sender::User => ("You", Color::Cyan),
        Sender::Ai if message.is_error => ("AI", Color::Red),
        Sender::Ai => ("AI", Color::Yellow),
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");

    Line::from(vec![
        Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {time}"), Style::default().fg(Color::DarkGray)),
    ])
}

/// Rows the lines occupy once wrapped to `width`. Counts chars, so wide
/// glyphs can make this short by a row or two.
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| {
            let chars: usize = line.spans.iter().map(|s| s.content.chars().count()).sum();
            chars.div_ceil(width).max(1)
        })
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn draw_input(app: &App, frame: &mut Frame, area: Rect) {
    let (title, border) = if app.snapshot.pending {
        (" Waiting for reply... ", Color::DarkGray)
    } else if app.input_focused {
        (" Message (Enter to send) ", Color::Yellow)
    } else {
        (" Message ", Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);

    // Keep the end of long input visible
    let inner_width = usize::from(area.width.saturating_sub(2));
    let char_count = app.input.chars().count();
    let skip = char_count.saturating_sub(inner_width.saturating_sub(1));
    let visible: String = app.input.chars().skip(skip).collect();
    let cursor_col = u16::try_from(char_count - skip).unwrap_or(u16::MAX);

    let style = if app.snapshot.pending {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    frame.render_widget(Paragraph::new(Span::styled(visible, style)).block(block), area);

    if app.input_focused && !app.snapshot.pending {
        frame.set_cursor_position(Position::new(
            area.x.saturating_add(1).saturating_add(cursor_col),
            area.y.saturating_add(1),
        ));
    }
}

fn draw_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!(" Session …{} ", short_id(&app.snapshot.conversation_id)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("│ {} messages ", app.snapshot.messages.len()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            "│ Tab focus │ Ctrl-L clear │ Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            format!("  {notice}"),
            Style::default().fg(Color::Magenta),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Last eight characters of the conversation id
fn short_id(id: &str) -> String {
    let count = id.chars().count();
    id.chars().skip(count.saturating_sub(8)).collect()
}
