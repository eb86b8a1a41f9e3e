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
        AppEvent::Tick => app.tick(),
        AppEvent::Fragment(fragment) => app.on_fragment(&fragment),
        AppEvent::StreamEnd => app.on_stream_end(),
        AppEvent::StreamError(reason) => app.on_stream_error(&reason),
        AppEvent::Probe(result) => app.on_probe(result),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    app.notice = None;

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter => app.start_editing(),
        KeyCode::Tab => app.toggle_tab(),
        KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Char('b') => app.sidebar_open = !app.sidebar_open,
        KeyCode::Char('m') => app.next_model(),
        KeyCode::Char('M') => app.prev_model(),
        KeyCode::Char('y') => app.copy_code(),
        KeyCode::Char('s') => app.save_code(),
        KeyCode::Char('d') => app.deploy_code(),
        KeyCode::Char('j') | KeyCode::Down => scroll_focused(app, 1, true),
        KeyCode::Char('k') | KeyCode::Up => scroll_focused(app, 1, false),
        KeyCode::PageDown => scroll_focused(app, 10, true),
        KeyCode::PageUp => scroll_focused(app, 10, false),
        KeyCode::Char('G') | KeyCode::End => {
            if app.focus == FocusPane::Chat {
                app.scroll_chat_to_bottom();
            }
        }
        KeyCode::Char('g') | KeyCode::Home => match app.focus {
            FocusPane::Chat => app.chat_scroll = 0,
            FocusPane::Viewport => app.viewport_scroll = 0,
        },
        _ => {}
    }
}

fn scroll_focused(app: &mut App, lines: u16, down: bool) {
    match (app.focus, down) {
        (FocusPane::Chat, true) => app.scroll_chat_down(lines),
        (FocusPane::Chat, false) => app.scroll_chat_up(lines),
        (FocusPane::Viewport, true) => app.scroll_viewport_down(lines),
        (FocusPane::Viewport, false) => app.scroll_viewport_up(lines),
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    // The server can drop out from under us while typing.
    if !app.session.input_enabled() {
        app.input_mode = InputMode::Normal;
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            insert_char(app, '\n');
        }
        KeyCode::Enter => {
            app.submit_input();
        }
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
        KeyCode::Char(c) => insert_char(app, c),
        _ => {}
    }
}

fn insert_char(app: &mut App, c: char) {
    let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
    app.input.insert(byte_pos, c);
    app.input_cursor += 1;
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // Scroll whichever pane is under the pointer
    let in_chat = app.chat_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_viewport = app.viewport_area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_chat_down(3);
            } else if in_viewport {
                app.scroll_viewport_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_chat_up(3);
            } else if in_viewport {
                app.scroll_viewport_up(3);
            }
        }
        MouseEventKind::Down(_) => {
            if in_chat {
                app.focus = FocusPane::Chat;
            } else if in_viewport {
                app.focus = FocusPane::Viewport;
            }
        }
        _ => {}
    }
}
