use kiwi_core::{reduce, Action, Effect, GatewayClient, Session};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::message::{render_entry, wrapped_height, DeployControl};
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Apps,
    Conversation,
    Input,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub session: Session,

    // App list
    pub apps_state: ListState,

    // Conversation view
    pub selected_entry: Option<usize>,
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of chat area for scroll calculations
    pub chat_width: u16,  // Inner width of chat area for wrap calculations

    // Message input
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub apps_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    gateway: GatewayClient,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(gateway: GatewayClient, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Apps,
            session: Session::new(),

            apps_state: ListState::default(),

            selected_entry: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            input: String::new(),
            input_cursor: 0,

            animation_frame: 0,

            apps_area: None,
            chat_area: None,

            gateway,
            events,
        }
    }

    /// Run an action through the reducer and start the gateway calls it asks for
    pub fn dispatch(&mut self, action: Action) {
        let entries_before = self.session.conversation().len();
        let apps_before = self.session.selector().len();
        let in_flight_before = self.session.in_flight();

        let effects = reduce(&mut self.session, action);
        for effect in effects {
            self.spawn_effect(effect);
        }

        if self.session.selector().len() != apps_before {
            let selected = self
                .session
                .selected_app()
                .and_then(|app| self.session.selector().position(app))
                .or(if self.session.selector().is_empty() { None } else { Some(0) });
            self.apps_state.select(selected);
        }

        if self.session.conversation().len() > entries_before
            || self.session.in_flight() > in_flight_before
        {
            self.scroll_chat_to_bottom();
        }
    }

    fn spawn_effect(&self, effect: Effect) {
        tracing::debug!(?effect, "starting gateway call");
        let gateway = self.gateway.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let action = gateway.perform(effect).await;
            // The UI loop may already be gone on shutdown
            let _ = events.send(AppEvent::Gateway(action));
        });
    }

    // App list
    pub fn apps_nav_down(&mut self) {
        let len = self.session.selector().len();
        if len > 0 {
            let i = self.apps_state.selected().unwrap_or(0);
            self.apps_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn apps_nav_up(&mut self) {
        if !self.session.selector().is_empty() {
            let i = self.apps_state.selected().unwrap_or(0);
            self.apps_state.select(Some(i.saturating_sub(1)));
        }
    }

    /// Select the highlighted app; returns false when the list is empty
    pub fn select_highlighted_app(&mut self) -> bool {
        let app = self
            .apps_state
            .selected()
            .and_then(|i| self.session.selector().get(i))
            .cloned();
        match app {
            Some(app) => {
                self.dispatch(Action::SelectApp(app));
                true
            }
            None => false,
        }
    }

    // Message input
    pub fn submit_input(&mut self) {
        if !self.session.can_submit() || self.input.trim().is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.input);
        self.input_cursor = 0;
        self.dispatch(Action::SubmitMessage(text));
    }

    pub fn focus_input(&mut self) -> bool {
        if !self.session.can_submit() {
            return false;
        }
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
        self.input_cursor = self.input.chars().count();
        true
    }

    // Conversation
    pub fn entry_nav_down(&mut self) {
        let len = self.session.conversation().len();
        if len > 0 {
            let next = self.selected_entry.map_or(len - 1, |i| (i + 1).min(len - 1));
            self.selected_entry = Some(next);
            self.scroll_to_selected_entry();
        }
    }

    pub fn entry_nav_up(&mut self) {
        let len = self.session.conversation().len();
        if len > 0 {
            let prev = self.selected_entry.map_or(len - 1, |i| i.saturating_sub(1));
            self.selected_entry = Some(prev);
            self.scroll_to_selected_entry();
        }
    }

    pub fn entry_first(&mut self) {
        if !self.session.conversation().is_empty() {
            self.selected_entry = Some(0);
            self.chat_scroll = 0;
        }
    }

    pub fn entry_last(&mut self) {
        let len = self.session.conversation().len();
        if len > 0 {
            self.selected_entry = Some(len - 1);
            self.scroll_chat_to_bottom();
        }
    }

    /// Deploy from the selected entry if its control is live
    pub fn deploy_selected(&mut self) -> bool {
        match self.selected_entry {
            Some(index) if self.session.is_deploy_ready(index) => {
                self.dispatch(Action::ConfirmDeploy);
                true
            }
            _ => false,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_down(&mut self, rows: u16) {
        let max_scroll = self.total_chat_lines().saturating_sub(self.visible_chat_height());
        self.chat_scroll = self.chat_scroll.saturating_add(rows).min(max_scroll);
    }

    pub fn scroll_chat_up(&mut self, rows: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(rows);
    }

    /// Scroll chat to bottom so the newest entry and "Working..." are visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.total_chat_lines();
        let visible_height = self.visible_chat_height();
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    /// Rendered height of every entry, plus the busy indicator
    fn total_chat_lines(&self) -> u16 {
        let mut total = self.entry_offset(self.session.conversation().len());
        if self.session.is_busy() {
            total += 2; // "Kiwi:" + "Working..."
        }
        total
    }

    /// Row at which entry `index` starts
    fn entry_offset(&self, index: usize) -> u16 {
        let width = self.wrap_width();
        self.session
            .conversation()
            .iter()
            .enumerate()
            .take(index)
            .map(|(i, entry)| {
                let control = DeployControl::for_entry(&self.session, i, entry);
                let lines = render_entry(entry, control, self.selected_entry == Some(i));
                wrapped_height(&lines, width)
            })
            .sum()
    }

    fn scroll_to_selected_entry(&mut self) {
        let Some(index) = self.selected_entry else {
            return;
        };
        let start = self.entry_offset(index);
        let end = self.entry_offset(index + 1);
        let height = self.visible_chat_height();

        if start < self.chat_scroll {
            self.chat_scroll = start;
        } else if end > self.chat_scroll + height {
            // Keep the top of tall entries in view
            self.chat_scroll = end.saturating_sub(height).min(start);
        }
    }

    // Default to 50x20 until the first render reports the real area
    fn wrap_width(&self) -> u16 {
        if self.chat_width > 0 {
            self.chat_width
        } else {
            50
        }
    }

    fn visible_chat_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiwi_core::{AppId, DeployResponse, DetectResponse};
    use serde_json::json;
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        // Nothing listens here; calls that do get spawned just fail
        let gateway = GatewayClient::new("http://127.0.0.1:9");
        (App::new(gateway, tx), rx)
    }

    fn with_apps(app: &mut App) {
        app.dispatch(Action::AppsLoaded(vec![AppId::from("blog"), AppId::from("wiki")]));
    }

    #[test]
    fn test_apps_loaded_highlights_first_app() {
        let (mut app, _rx) = test_app();
        assert_eq!(app.apps_state.selected(), None);
        with_apps(&mut app);
        assert_eq!(app.apps_state.selected(), Some(0));

        app.apps_nav_down();
        app.apps_nav_down();
        assert_eq!(app.apps_state.selected(), Some(1));
        app.apps_nav_up();
        assert_eq!(app.apps_state.selected(), Some(0));
    }

    #[test]
    fn test_input_is_closed_until_app_selected() {
        let (mut app, _rx) = test_app();
        assert!(!app.focus_input());
        assert_eq!(app.input_mode, InputMode::Normal);

        app.input = "hello".to_string();
        app.submit_input();
        assert_eq!(app.session.conversation().len(), 1);
        assert_eq!(app.input, "hello");
    }

    #[tokio::test]
    async fn test_select_and_submit_clears_input() {
        let (mut app, _rx) = test_app();
        with_apps(&mut app);
        app.apps_nav_down();
        assert!(app.select_highlighted_app());
        assert_eq!(app.session.selected_app(), Some(&AppId::from("wiki")));

        assert!(app.focus_input());
        app.input = "deploy with 3 replicas".to_string();
        app.input_cursor = 22;
        app.submit_input();

        assert!(app.input.is_empty());
        assert_eq!(app.input_cursor, 0);
        assert_eq!(
            app.session.conversation().last().map(|e| e.text.as_str()),
            Some("deploy with 3 replicas")
        );
    }

    #[tokio::test]
    async fn test_blank_input_is_kept_out_of_conversation() {
        let (mut app, _rx) = test_app();
        app.dispatch(Action::SelectApp(AppId::from("blog")));
        app.input = "   ".to_string();
        app.submit_input();
        assert_eq!(app.session.conversation().len(), 1);
    }

    #[tokio::test]
    async fn test_deploy_only_from_ready_entry() {
        let (mut app, _rx) = test_app();
        app.dispatch(Action::SelectApp(AppId::from("blog")));
        app.dispatch(Action::SubmitMessage("go".to_string()));
        app.dispatch(Action::OptionsDetected {
            app: AppId::from("blog"),
            response: DetectResponse {
                message: "Detected".to_string(),
                options: json!({"replicas": 3}),
            },
        });

        app.selected_entry = Some(1);
        assert!(!app.deploy_selected());

        app.entry_last();
        assert_eq!(app.selected_entry, Some(2));
        let busy_before = app.session.in_flight();
        assert!(app.deploy_selected());
        assert_eq!(app.session.in_flight(), busy_before + 1);
    }

    #[test]
    fn test_entry_navigation_clamps() {
        let (mut app, _rx) = test_app();
        app.entry_nav_up();
        assert_eq!(app.selected_entry, Some(0));
        app.entry_nav_down();
        assert_eq!(app.selected_entry, Some(0));
    }

    #[test]
    fn test_new_entries_scroll_to_bottom() {
        let (mut app, _rx) = test_app();
        app.chat_height = 4;
        app.chat_width = 25;
        app.dispatch(Action::Deployed {
            app: AppId::from("blog"),
            options: json!({"replicas": 3}),
            response: DeployResponse {
                message: "Detected: replica_count_three memory_limit_512mb".to_string(),
            },
        });
        // welcome (label + 4 wrapped rows + blank) + reply (label + 3 wrapped rows + blank)
        assert_eq!(app.chat_scroll, 6 + 5 - 4);
    }

    #[test]
    fn test_tick_animates_only_when_busy() {
        let (mut app, _rx) = test_app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
    }
}
