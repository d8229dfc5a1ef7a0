//! Rendering of a single conversation entry

use kiwi_core::{ChatRole, ConversationEntry, Session};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

/// State of the deploy control on one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployControl {
    /// The entry carries no options
    Hidden,
    /// Pressing deploy on this entry sends its options
    Ready,
    /// The options were deployed or superseded
    Spent,
}

impl DeployControl {
    pub fn for_entry(session: &Session, index: usize, entry: &ConversationEntry) -> Self {
        if entry.deploy_options.is_none() {
            DeployControl::Hidden
        } else if session.is_deploy_ready(index) {
            DeployControl::Ready
        } else {
            DeployControl::Spent
        }
    }
}

const CODE_GUTTER: &str = "│ ";

/// Lines for one entry: role label, text, code block, deploy control, blank
pub fn render_entry(
    entry: &ConversationEntry,
    control: DeployControl,
    selected: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (label, color) = match entry.role {
        ChatRole::User => ("You:", Color::Cyan),
        ChatRole::Assistant => ("Kiwi:", Color::Yellow),
    };
    let mut label_spans = Vec::new();
    if selected {
        label_spans.push(Span::styled("> ", Style::default().fg(Color::Magenta)));
    }
    label_spans.push(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(label_spans));

    for line in entry.text.lines() {
        lines.push(Line::from(line.to_string()));
    }

    if let Some(code) = &entry.code {
        let gutter = Style::default().fg(Color::DarkGray);
        let body = Style::default().fg(Color::Green);
        for line in code.lines() {
            lines.push(Line::from(vec![
                Span::styled(CODE_GUTTER, gutter),
                Span::styled(line.to_string(), body),
            ]));
        }
    }

    match control {
        DeployControl::Hidden => {}
        DeployControl::Ready => {
            lines.push(Line::from(vec![
                Span::styled(
                    " Deploy ",
                    Style::default()
                        .bg(Color::Green)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    if selected { "  press d" } else { "  select and press d" },
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
        DeployControl::Spent => {
            lines.push(Line::from(Span::styled(
                " Deploy ",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT),
            )));
        }
    }

    lines.push(Line::default());
    lines
}

/// Rows `lines` occupy once word-wrapped to `width` columns, as the
/// conversation pane draws them
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    Paragraph::new(Text::from(lines.to_vec()))
        .wrap(Wrap { trim: false })
        .line_count(width.max(1))
        .try_into()
        .unwrap_or(u16::MAX)
}
