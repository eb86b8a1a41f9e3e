use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
};
use forge_core::{preview, ChatRole, ServiceStatus};
use crate::app::{App, FocusPane, InputMode, ViewTab};

const SIDEBAR_WIDTH: u16 = 28;

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

    let workspace_area = if app.sidebar_open {
        let [sidebar_area, workspace_area] = Layout::horizontal([
            Constraint::Length(SIDEBAR_WIDTH),
            Constraint::Min(0),
        ])
        .areas(body_area);
        render_sidebar(app, frame, sidebar_area);
        workspace_area
    } else {
        body_area
    };

    let [chat_column, viewport_area] = Layout::horizontal([
        Constraint::Percentage(45),
        Constraint::Percentage(55),
    ])
    .areas(workspace_area);

    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_column);

    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_viewport(app, frame, viewport_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let tab_style = |tab: ViewTab| {
        if app.tab == tab {
            Style::default().bg(Color::Magenta).fg(Color::White).bold()
        } else {
            Style::default().fg(Color::Gray)
        }
    };

    let mut spans = vec![
        Span::styled(" * Nebula Forge ", Style::default().fg(Color::Magenta).bold()),
        Span::styled(
            format!("v{}  ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(" Code ", tab_style(ViewTab::Code)),
        Span::raw(" "),
        Span::styled(" Preview ", tab_style(ViewTab::Preview)),
        Span::raw("  "),
    ];

    if app.copied_ticks > 0 {
        spans.push(Span::styled(" Copied ", Style::default().fg(Color::Green).bold()));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &App, frame: &mut Frame, area: Rect) {
    let directory = app.session.directory();

    let [task_area, engine_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let task = Paragraph::new(vec![
        Line::from(Span::styled(" Current task", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(" > index.workspace", Style::default().fg(Color::White).bold())),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(task, task_area);

    let (status_text, status_color) = match directory.status() {
        ServiceStatus::Probing => ("detecting", Color::Yellow),
        ServiceStatus::Online => ("online", Color::Green),
        ServiceStatus::Offline => ("offline", Color::Red),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Line::from(vec![
            Span::raw(" ENGINE "),
            Span::styled(format!("[{}] ", status_text), Style::default().fg(status_color)),
        ]));

    if directory.models().is_empty() {
        let message = match directory.status() {
            ServiceStatus::Probing => "Asking Ollama for models...",
            ServiceStatus::Offline => "Ollama is not reachable.\nStart it with `ollama serve`\nand restart Nebula Forge.",
            ServiceStatus::Online => "No models installed.\nPull one with `ollama pull`.",
        };
        let placeholder = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(placeholder, engine_area);
        return;
    }

    let items: Vec<ListItem> = directory
        .models()
        .iter()
        .map(|model| {
            // Tags like "qwen2.5-coder:7b" read better without the variant
            let short = model.split(':').next().unwrap_or(model);
            ListItem::new(format!("{}  {}", short, model.strip_prefix(short).unwrap_or_default()))
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

    let mut state = ListState::default();
    state.select(directory.current_index());
    frame.render_stateful_widget(list, engine_area, &mut state);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    // Inner size minus borders, for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let focused = app.focus == FocusPane::Chat;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let title = match app.session.directory().current() {
        Some(model) => format!(" Chat: {} ", model),
        None => " Chat ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let turns = app.session.turns();
    let mut lines: Vec<Line> = Vec::new();

    for (i, turn) in turns.iter().enumerate() {
        match turn.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "ME:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "NF:",
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                )));
            }
        }

        let is_pending = app.session.is_in_progress() && i + 1 == turns.len() && turn.content.is_empty();
        if is_pending {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        } else {
            for line in turn.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        lines.push(Line::default());
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let title = if app.session.is_in_progress() {
        " Generating... "
    } else {
        " Describe your idea (i to type, Enter to send) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    if !app.session.input_enabled() {
        let reason = match app.session.directory().status() {
            ServiceStatus::Probing => "Waiting for the model list...",
            ServiceStatus::Offline => "Offline: Ollama is not running",
            ServiceStatus::Online => "No model selected",
        };
        let placeholder = Paragraph::new(reason)
            .style(Style::default().fg(Color::Red))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    if app.input.is_empty() && !editing {
        let placeholder = Paragraph::new("Type your idea here...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    // Newlines entered with Alt+Enter are shown as a marker on one line
    let visible_text: String = app
        .input
        .chars()
        .map(|c| if c == '\n' { '¶' } else { c })
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if editing {
        let cursor_x = u16::try_from(cursor_pos - scroll_offset).unwrap_or(u16::MAX);
        frame.set_cursor_position((area.x.saturating_add(cursor_x).saturating_add(1), area.y + 1));
    }
}

fn render_viewport(app: &mut App, frame: &mut Frame, area: Rect) {
    app.viewport_area = Some(area);

    let focused = app.focus == FocusPane::Viewport;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let syntax = app.session.syntax();

    let mut title = match app.tab {
        ViewTab::Code => format!(" {} [{}] ", syntax.default_file_name(), syntax.label()),
        ViewTab::Preview => " Preview ".to_string(),
    };
    if app.session.is_in_progress() {
        title.push_str("(read-only while streaming) ");
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_height = block.inner(area).height;

    if app.session.code().is_empty() {
        let placeholder = Paragraph::new("Generated code appears here as soon as the reply opens a ``` block.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let lines: Vec<Line> = match app.tab {
        ViewTab::Code => {
            let code_lines: Vec<&str> = app.session.code().lines().collect();
            let gutter = code_lines.len().max(1).to_string().len();
            code_lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    Line::from(vec![
                        Span::styled(
                            format!("{:>width$} ", i + 1, width = gutter),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::raw(line.to_string()),
                    ])
                })
                .collect()
        }
        ViewTab::Preview => preview::render(app.session.code(), syntax, block.inner(area).width as usize)
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect(),
    };

    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total_lines.saturating_sub(inner_height);
    app.viewport_scroll = app.viewport_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((app.viewport_scroll, 0));
    frame.render_widget(paragraph, area);

    if total_lines > inner_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(total_lines as usize)
            .position(app.viewport_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " FORGE ",
        InputMode::Editing => " TYPING ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" code/preview ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" m ", key_style),
            Span::styled(" model ", label_style),
            Span::styled(" y ", key_style),
            Span::styled(" copy ", label_style),
            Span::styled(" s ", key_style),
            Span::styled(" save ", label_style),
            Span::styled(" d ", key_style),
            Span::styled(" deploy ", label_style),
            Span::styled(" b ", key_style),
            Span::styled(" sidebar ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Alt+Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
    };

    let mut spans: Vec<Span> = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    spans.extend(hints);
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(format!("  {} ", notice), Style::default().fg(Color::Yellow)));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
