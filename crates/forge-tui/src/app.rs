use forge_core::{ChatRequest, Config, OllamaClient, ServiceStatus, Session};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::actions::{self, ClipboardSlot};
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTab {
    Code,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Chat,
    Viewport,
}

/// Ticks (300ms each) the "Copied" badge stays up
const COPIED_FEEDBACK_TICKS: u8 = 7;

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub tab: ViewTab,
    pub sidebar_open: bool,

    pub session: Session,

    // Prompt input
    pub input: String,
    pub input_cursor: usize,

    // Chat pane
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Viewport pane
    pub viewport_scroll: u16,

    pub animation_frame: u8,
    pub copied_ticks: u8,
    pub notice: Option<String>,

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub viewport_area: Option<Rect>,

    pub config: Config,
    pub client: OllamaClient,
    pub clipboard: ClipboardSlot,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: Config, events: UnboundedSender<AppEvent>) -> Self {
        let client = OllamaClient::new(&config.server_url);
        let session = Session::new(config.model_directory());

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Chat,
            tab: ViewTab::Code,
            sidebar_open: true,

            session,

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            viewport_scroll: 0,

            animation_frame: 0,
            copied_ticks: 0,
            notice: None,

            chat_area: None,
            viewport_area: None,

            config,
            client,
            clipboard: ClipboardSlot::default(),
            events,
        }
    }

    /// Ask the server for its models, once. Only used when detecting.
    pub fn start_probe(&self) {
        if self.session.directory().status() != ServiceStatus::Probing {
            return;
        }

        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.list_models().await.map_err(|err| err.to_string());
            let _ = tx.send(AppEvent::Probe(result));
        });
    }

    pub fn on_probe(&mut self, result: Result<Vec<String>, String>) {
        self.session.probe_finished(result);
        if !self.session.input_enabled() {
            self.input_mode = InputMode::Normal;
        }
    }

    /// Send the current input. Blank input, a running exchange, or no model
    /// leaves everything as it was.
    pub fn submit_input(&mut self) {
        let Some(request) = self.session.submit(&self.input) else {
            return;
        };

        self.input.clear();
        self.input_cursor = 0;
        self.scroll_chat_to_bottom();
        self.spawn_exchange(request);
    }

    fn spawn_exchange(&self, request: ChatRequest) {
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let fragments = tx.clone();
            let result = client
                .stream_chat(&request, |fragment| {
                    let _ = fragments.send(AppEvent::Fragment(fragment));
                })
                .await;

            let _ = match result {
                Ok(()) => tx.send(AppEvent::StreamEnd),
                Err(err) => tx.send(AppEvent::StreamError(err.to_string())),
            };
        });
    }

    pub fn on_fragment(&mut self, fragment: &str) {
        self.session.fragment_received(fragment);
        self.scroll_chat_to_bottom();
    }

    pub fn on_stream_end(&mut self) {
        self.session.stream_end();
        self.scroll_chat_to_bottom();
    }

    pub fn on_stream_error(&mut self, reason: &str) {
        self.session.stream_error(reason);
        self.scroll_chat_to_bottom();
    }

    /// Tick animation frame and expire transient feedback
    pub fn tick(&mut self) {
        if self.session.is_in_progress() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.copied_ticks = self.copied_ticks.saturating_sub(1);
    }

    pub fn start_editing(&mut self) {
        if self.session.input_enabled() {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            ViewTab::Code => ViewTab::Preview,
            ViewTab::Preview => ViewTab::Code,
        };
        self.viewport_scroll = 0;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Chat => FocusPane::Viewport,
            FocusPane::Viewport => FocusPane::Chat,
        };
    }

    pub fn next_model(&mut self) {
        self.session.select_next_model();
    }

    pub fn prev_model(&mut self) {
        self.session.select_prev_model();
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_viewport_up(&mut self, lines: u16) {
        self.viewport_scroll = self.viewport_scroll.saturating_sub(lines);
    }

    pub fn scroll_viewport_down(&mut self, lines: u16) {
        self.viewport_scroll = self.viewport_scroll.saturating_add(lines);
    }

    /// Scroll chat so the newest turn (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for turn in self.session.turns() {
            total_lines = total_lines.saturating_add(1); // Role line
            for line in turn.content.lines() {
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { char_count / wrap_width + 1 };
                total_lines = total_lines.saturating_add(u16::try_from(wrapped).unwrap_or(u16::MAX));
            }
            total_lines = total_lines.saturating_add(1); // Blank line after turn
        }

        if self.session.is_in_progress() {
            total_lines = total_lines.saturating_add(1); // "Thinking..."
        }

        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    pub fn copy_code(&mut self) {
        if self.session.code().is_empty() {
            return;
        }
        match self.clipboard.copy(self.session.code()) {
            Ok(()) => self.copied_ticks = COPIED_FEEDBACK_TICKS,
            Err(err) => {
                tracing::error!(%err, "copy to clipboard failed");
                self.notice = Some("Clipboard unavailable".to_string());
            }
        }
    }

    /// Awaits the save dialog on its own task so drawing continues. Failures
    /// are logged only.
    pub fn save_code(&self) {
        if self.session.code().is_empty() {
            return;
        }
        let code = self.session.code().to_string();
        let mode = self.session.syntax();
        tokio::spawn(async move {
            match actions::save_with_dialog(&code, mode).await {
                Ok(Some(path)) => tracing::info!(path = %path.display(), "code saved"),
                Ok(None) => tracing::debug!("save dialog cancelled"),
                Err(err) => tracing::error!(%err, "saving code failed"),
            }
        });
    }

    pub fn deploy_code(&mut self) {
        if self.session.code().is_empty() {
            return;
        }
        match actions::deploy(&mut self.clipboard, self.session.code(), &self.config.deploy_url) {
            Ok(()) => {
                self.copied_ticks = COPIED_FEEDBACK_TICKS;
                self.notice = Some(format!("Code copied, paste it at {}", self.config.deploy_url));
            }
            Err(err) => {
                tracing::error!(%err, "deploy failed");
                self.notice = Some("Could not open the deployment page".to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::{ModelSource, FAILURE_MESSAGE};
    use tokio::sync::mpsc;

    fn static_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        // Bind then drop so nothing listens there; exchanges fail fast.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = Config {
            model_source: ModelSource::Static,
            server_url: format!("http://127.0.0.1:{port}"),
            ..Config::default()
        };
        (App::new(config, tx), rx)
    }

    #[tokio::test]
    async fn test_blank_input_does_not_submit() {
        let (mut app, _rx) = static_app();
        app.input = "   ".to_string();
        app.submit_input();
        assert_eq!(app.session.turns().len(), 1);
        assert_eq!(app.input, "   ");
    }

    #[tokio::test]
    async fn test_submit_clears_input_and_blocks_second_send() {
        let (mut app, _rx) = static_app();
        app.input = "build a landing page".to_string();
        app.input_cursor = app.input.chars().count();
        app.submit_input();

        assert!(app.input.is_empty());
        assert_eq!(app.input_cursor, 0);
        assert!(app.session.is_in_progress());
        assert_eq!(app.session.turns().len(), 3);

        app.input = "again".to_string();
        app.submit_input();
        assert_eq!(app.session.turns().len(), 3);
        assert_eq!(app.input, "again");
    }

    #[tokio::test]
    async fn test_unreachable_server_surfaces_failure() {
        let (mut app, mut rx) = static_app();
        app.input = "hello".to_string();
        app.submit_input();

        loop {
            match rx.recv().await.unwrap() {
                AppEvent::StreamError(reason) => {
                    app.on_stream_error(&reason);
                    break;
                }
                AppEvent::StreamEnd => panic!("stream should not succeed"),
                _ => {}
            }
        }

        assert_eq!(app.session.turns().last().unwrap().content, FAILURE_MESSAGE);
        assert!(!app.session.is_in_progress());
    }

    #[tokio::test]
    async fn test_probe_failure_disables_editing() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(Config::default(), tx);
        app.on_probe(Err("connection refused".to_string()));

        app.start_editing();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.session.can_submit());

        app.on_probe(Ok(vec!["a".to_string(), "b".to_string()]));
        app.start_editing();
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.session.directory().current(), Some("a"));
    }

    #[tokio::test]
    async fn test_scroll_follows_newest_turn() {
        let (mut app, _rx) = static_app();
        app.chat_height = 5;
        app.chat_width = 40;
        app.input = "go".to_string();
        app.submit_input();
        for _ in 0..10 {
            app.on_fragment("line\n");
        }
        assert!(app.chat_scroll > 0);
        let before = app.chat_scroll;
        app.on_fragment("one more\n");
        assert!(app.chat_scroll > before);
    }

    #[tokio::test]
    async fn test_model_cycle_locked_during_exchange() {
        let (mut app, _rx) = static_app();
        app.next_model();
        assert_eq!(app.session.directory().current_index(), Some(1));

        app.input = "hi".to_string();
        app.submit_input();
        app.next_model();
        assert_eq!(app.session.directory().current_index(), Some(1));
        app.prev_model();
        assert_eq!(app.session.directory().current_index(), Some(1));
    }

    #[tokio::test]
    async fn test_listing_result_applied_through_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Bind then drop so the listing fails.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let config = Config {
            server_url: format!("http://127.0.0.1:{port}"),
            ..Config::default()
        };
        let mut app = App::new(config, tx);
        app.start_probe();

        match rx.recv().await.unwrap() {
            AppEvent::Probe(result) => {
                assert!(result.is_err());
                app.on_probe(result);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(app.session.directory().status(), ServiceStatus::Offline);
        assert!(!app.session.input_enabled());
    }
}
