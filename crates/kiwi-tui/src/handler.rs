use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Gateway(action) => app.dispatch(action),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Tab cycles: Apps -> Conversation -> Input -> Apps (Input only once an app is picked)
        KeyCode::Tab => match app.focus {
            FocusPane::Apps => app.focus = FocusPane::Conversation,
            FocusPane::Conversation => {
                if !app.focus_input() {
                    app.focus = FocusPane::Apps;
                }
            }
            FocusPane::Input => app.focus = FocusPane::Apps,
        },
        KeyCode::BackTab => match app.focus {
            FocusPane::Apps => {
                if !app.focus_input() {
                    app.focus = FocusPane::Conversation;
                }
            }
            FocusPane::Conversation => app.focus = FocusPane::Apps,
            FocusPane::Input => app.focus = FocusPane::Conversation,
        },

        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.focus_input();
        }

        _ => match app.focus {
            FocusPane::Apps => handle_apps_key(app, key),
            FocusPane::Conversation => handle_conversation_key(app, key),
            FocusPane::Input => {
                if key.code == KeyCode::Enter {
                    app.focus_input();
                }
            }
        },
    }
}

fn handle_apps_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.apps_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.apps_nav_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            // Straight to typing once an app is picked
            if app.select_highlighted_app() {
                app.focus_input();
            }
        }
        _ => {}
    }
}

fn handle_conversation_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.entry_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.entry_nav_up(),
        KeyCode::Char('g') => app.entry_first(),
        KeyCode::Char('G') => app.entry_last(),

        // Half-page scroll (must be before plain 'd' to match first)
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down((app.chat_height / 2).max(1));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up((app.chat_height / 2).max(1));
        }

        KeyCode::Char('d') | KeyCode::Enter => {
            app.deploy_selected();
        }

        KeyCode::Esc => app.selected_entry = None,
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Apps;
        }
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // Position-based scrolling
    let in_apps = app.apps_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_chat_down(3);
            } else if in_apps {
                app.apps_nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_chat_up(3);
            } else if in_apps {
                app.apps_nav_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use kiwi_core::{Action, AppId, GatewayClient};
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(GatewayClient::new("http://127.0.0.1:9"), tx)
    }

    #[test]
    fn test_char_to_byte_index_handles_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 10), 6);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = test_app();
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_skips_input_without_selected_app() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Conversation);
        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Apps);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn test_enter_on_app_selects_and_opens_input() {
        let mut app = test_app();
        handle_event(
            &mut app,
            AppEvent::Gateway(Action::AppsLoaded(vec![
                AppId::from("blog"),
                AppId::from("wiki"),
            ])),
        );
        handle_event(&mut app, key(KeyCode::Char('j')));
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.session.selected_app(), Some(&AppId::from("wiki")));
        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn test_editing_keys_and_submit() {
        let mut app = test_app();
        app.dispatch(Action::SelectApp(AppId::from("blog")));
        app.focus_input();

        type_text(&mut app, "héllo");
        handle_event(&mut app, key(KeyCode::Home));
        handle_event(&mut app, key(KeyCode::Delete));
        handle_event(&mut app, key(KeyCode::End));
        handle_event(&mut app, key(KeyCode::Backspace));
        handle_event(&mut app, key(KeyCode::Left));
        type_text(&mut app, "!");
        assert_eq!(app.input, "él!l");

        handle_event(&mut app, key(KeyCode::Enter));
        assert!(app.input.is_empty());
        assert_eq!(
            app.session.conversation().last().map(|e| e.text.as_str()),
            Some("él!l")
        );
    }
}
