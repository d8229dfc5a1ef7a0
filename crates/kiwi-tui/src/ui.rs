use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use kiwi_core::Phase;

use crate::app::{App, FocusPane, InputMode};
use crate::message::{render_entry, DeployControl};

const TITLE: &str = " Kiwi Deployment Assistant ";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    // App list on the left third, conversation and input on the right
    let [apps_area, chat_column] = Layout::horizontal([
        Constraint::Percentage(33),
        Constraint::Percentage(67),
    ])
    .areas(body_area);

    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_column);

    // Store areas for mouse hit-testing
    app.apps_area = Some(apps_area);
    app.chat_area = Some(chat_area);

    render_apps(app, frame, apps_area);
    render_conversation(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let selected = match app.session.selected_app() {
        Some(name) => format!(" [{}]", name),
        None => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()),
        Span::styled(selected, Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn border_color(focused: bool) -> Color {
    if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

fn render_apps(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app.focus == FocusPane::Apps)))
        .title(" Available Apps ");

    let selector = app.session.selector();
    if selector.is_empty() {
        let placeholder = if app.session.is_busy() && app.session.selected_app().is_none() {
            "Loading apps..."
        } else {
            "No apps available"
        };
        let paragraph = Paragraph::new(placeholder)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let selected_app = app.session.selected_app();
    let items: Vec<ListItem> = selector
        .apps()
        .iter()
        .map(|name| {
            let style = if Some(name) == selected_app {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", name)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.apps_state);
}

fn render_conversation(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let title = match app.session.phase() {
        Phase::AwaitingDeployConfirmation => " Conversation (deploy ready) ",
        _ => " Conversation ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app.focus == FocusPane::Conversation)))
        .title(title);

    let mut lines: Vec<Line> = Vec::new();
    for (i, entry) in app.session.conversation().iter().enumerate() {
        let control = DeployControl::for_entry(&app.session, i, entry);
        let selected = app.focus == FocusPane::Conversation && app.selected_entry == Some(i);
        lines.extend(render_entry(entry, control, selected));
    }

    if app.session.is_busy() {
        lines.push(Line::from(Span::styled(
            "Kiwi:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Working{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = app.session.can_submit();
    let editing = app.input_mode == InputMode::Editing;
    let input_border_color = if app.focus == FocusPane::Input || editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Message ");

    if !enabled || (app.input.is_empty() && !editing) {
        let hint = if enabled {
            "Type your message..."
        } else {
            "Select an app to start"
        };
        let placeholder = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(input_block);
        frame.render_widget(placeholder, area);
        return;
    }

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let pairs: &[(&str, &str)] = match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => &[(" Enter ", " send "), (" Esc ", " stop editing ")],
        (InputMode::Normal, FocusPane::Apps) => &[
            (" j/k ", " nav "),
            (" Enter ", " select "),
            (" Tab ", " focus "),
            (" q ", " quit "),
        ],
        (InputMode::Normal, FocusPane::Conversation) => &[
            (" j/k ", " entry "),
            (" d ", " deploy "),
            (" ^d/^u ", " scroll "),
            (" Tab ", " focus "),
            (" q ", " quit "),
        ],
        (InputMode::Normal, FocusPane::Input) => &[
            (" i ", " edit "),
            (" Tab ", " focus "),
            (" q ", " quit "),
        ],
    };
    for (key, label) in pairs {
        hints.push(Span::styled(*key, key_style));
        hints.push(Span::styled(*label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
