// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use rowscope_app::{
    AppCommand, AppEvent, AppState, EngineStatus, Field, Generator, IndexReply, IndexRequest,
    InputMode, Phase, SortDirection, SortSpec, VisibleRow,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);
const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";
const CHECKBOX: &str = "[ ]";
const SEARCH_CURSOR: &str = "▏";
const HEADER_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 2;
// Table borders plus the column header row.
const TABLE_CHROME_ROWS: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnSpec {
    field: Field,
    width: u16,
}

const COLUMNS: [ColumnSpec; 6] = [
    ColumnSpec {
        field: Field::Name,
        width: 22,
    },
    ColumnSpec {
        field: Field::Phone,
        width: 16,
    },
    ColumnSpec {
        field: Field::Score,
        width: 7,
    },
    ColumnSpec {
        field: Field::Email,
        width: 32,
    },
    ColumnSpec {
        field: Field::LastMessageAt,
        width: 22,
    },
    ColumnSpec {
        field: Field::AddedBy,
        width: 16,
    },
];

/// The interactive side's view of the index engine. Submitting never waits
/// for a result; replies are collected later with [`drain_replies`].
///
/// [`drain_replies`]: IndexRuntime::drain_replies
pub trait IndexRuntime {
    fn submit(&mut self, request: IndexRequest) -> Result<()>;
    fn drain_replies(&mut self) -> Result<Vec<IndexReply>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ViewData {
    selected_column: usize,
    status_token: u64,
}

pub fn run_app<R: IndexRuntime>(
    state: &mut AppState,
    generator: &Generator,
    runtime: &mut R,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    info!(
        universe_size = state.settings.universe_size,
        anchor = %generator.anchor(),
        "interactive session started"
    );

    let result = event_loop(
        &mut terminal,
        state,
        generator,
        runtime,
        &mut view_data,
        &internal_tx,
        &internal_rx,
    );

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("interactive session ended");
    result
}

fn event_loop<R: IndexRuntime>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    generator: &Generator,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) -> Result<()> {
    loop {
        process_internal_events(state, view_data, internal_rx);
        pump_runtime(state, runtime, view_data, internal_tx, Instant::now());

        let size = terminal.size().context("read terminal size")?;
        sync_viewport(state, Rect::new(0, 0, size.width, size.height));
        terminal
            .draw(|frame| render(frame, state, generator, view_data))
            .context("draw frame")?;

        let timeout = poll_timeout(state, Instant::now());
        if event::poll(timeout).context("poll event")?
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, runtime, view_data, internal_tx, key, Instant::now())
        {
            return Ok(());
        }
    }
}

/// Sleep no longer than the pending debounce deadline allows.
fn poll_timeout(state: &AppState, now: Instant) -> Duration {
    match state.debounce_deadline() {
        Some(deadline) => deadline.saturating_duration_since(now).min(POLL_INTERVAL),
        None => POLL_INTERVAL,
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn pump_runtime<R: IndexRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    now: Instant,
) {
    match runtime.drain_replies() {
        Ok(replies) => {
            for reply in replies {
                let events = state.dispatch(AppCommand::ReplyReceived(reply));
                apply_events(state, runtime, view_data, internal_tx, events);
            }
        }
        Err(error) => {
            if state.engine == EngineStatus::Available {
                let events = state.dispatch(AppCommand::EngineUnavailable(format!("{error:#}")));
                apply_events(state, runtime, view_data, internal_tx, events);
            }
        }
    }

    let events = state.dispatch(AppCommand::Tick { now });
    apply_events(state, runtime, view_data, internal_tx, events);
}

fn apply_events<R: IndexRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<AppEvent>,
) {
    for event in events {
        match event {
            AppEvent::RequestIssued(request) => {
                if let Err(error) = runtime.submit(request) {
                    let follow_up =
                        state.dispatch(AppCommand::EngineUnavailable(format!("{error:#}")));
                    apply_events(state, runtime, view_data, internal_tx, follow_up);
                }
            }
            AppEvent::StatusUpdated(_) => {
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(internal_tx, view_data.status_token);
            }
            AppEvent::StaleReplyDropped { seq } => {
                debug!(%seq, "ignored superseded reply");
            }
            _ => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn dispatch<R: IndexRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    apply_events(state, runtime, view_data, internal_tx, events);
}

fn handle_key_event<R: IndexRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if let Some(command) = scroll_command_for_key(state, key) {
        dispatch(state, runtime, view_data, internal_tx, command);
        return false;
    }

    match state.mode {
        InputMode::Search => {
            if let Some(command) = search_command_for_key(state, key, now) {
                dispatch(state, runtime, view_data, internal_tx, command);
            }
            false
        }
        InputMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key, now),
    }
}

fn handle_nav_key<R: IndexRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) -> bool {
    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => {
            move_column(view_data, -1);
            return false;
        }
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => AppCommand::EditQuery {
            text: String::new(),
            now,
        },
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => {
            move_column(view_data, 1);
            return false;
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) | (KeyCode::Enter, _) => {
            AppCommand::ActivateSort(COLUMNS[view_data.selected_column].field)
        }
        (KeyCode::Char(digit @ '1'..='6'), _) => {
            let column = digit as usize - '1' as usize;
            view_data.selected_column = column;
            AppCommand::ActivateSort(COLUMNS[column].field)
        }
        (KeyCode::Char('/'), _) => AppCommand::EnterSearch,
        (KeyCode::Esc, _) => AppCommand::ClearStatus,
        _ => return false,
    };
    dispatch(state, runtime, view_data, internal_tx, command);
    false
}

fn scroll_command_for_key(state: &AppState, key: KeyEvent) -> Option<AppCommand> {
    let row = i64::from(state.viewport.row_height());
    let page = i64::from(state.viewport.viewport_height()).max(row);
    let half_page = (page / 2).max(row);
    let nav = state.mode == InputMode::Nav;

    match (key.code, key.modifiers) {
        (KeyCode::Down, _) => Some(AppCommand::ScrollBy(row)),
        (KeyCode::Up, _) => Some(AppCommand::ScrollBy(-row)),
        (KeyCode::PageDown, _) => Some(AppCommand::ScrollBy(page)),
        (KeyCode::PageUp, _) => Some(AppCommand::ScrollBy(-page)),
        (KeyCode::Home, _) => Some(AppCommand::ScrollTo(0)),
        (KeyCode::End, _) => Some(AppCommand::ScrollToEnd),
        (KeyCode::Char('j'), KeyModifiers::NONE) if nav => Some(AppCommand::ScrollBy(row)),
        (KeyCode::Char('k'), KeyModifiers::NONE) if nav => Some(AppCommand::ScrollBy(-row)),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) if nav => {
            Some(AppCommand::ScrollBy(half_page))
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) if nav => {
            Some(AppCommand::ScrollBy(-half_page))
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) if nav => Some(AppCommand::ScrollTo(0)),
        (KeyCode::Char('G'), _) if nav => Some(AppCommand::ScrollToEnd),
        _ => None,
    }
}

fn search_command_for_key(state: &AppState, key: KeyEvent, now: Instant) -> Option<AppCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Enter, _) => Some(AppCommand::ExitSearch),
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Some(AppCommand::EditQuery {
            text: String::new(),
            now,
        }),
        (KeyCode::Backspace, _) => {
            let mut text = state.query.clone();
            text.pop()?;
            Some(AppCommand::EditQuery { text, now })
        }
        (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            let mut text = state.query.clone();
            text.push(ch);
            Some(AppCommand::EditQuery { text, now })
        }
        _ => None,
    }
}

fn move_column(view_data: &mut ViewData, delta: isize) {
    let len = COLUMNS.len() as isize;
    let next = (view_data.selected_column as isize + delta).clamp(0, len - 1);
    view_data.selected_column = next as usize;
}

fn main_layout(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

fn table_body_rows(area: Rect) -> u16 {
    main_layout(area)[1]
        .height
        .saturating_sub(TABLE_CHROME_ROWS)
}

fn sync_viewport(state: &mut AppState, area: Rect) {
    let viewport_height = u32::from(table_body_rows(area)) * state.viewport.row_height();
    if viewport_height != state.viewport.viewport_height() {
        state.dispatch(AppCommand::Resize { viewport_height });
    }
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    generator: &Generator,
    view_data: &ViewData,
) {
    let [header_area, table_area, status_area] = main_layout(frame.area());

    let header = Paragraph::new(search_line(state)).block(
        Block::default()
            .title("rowscope · all customers")
            .borders(Borders::ALL),
    );
    frame.render_widget(header, header_area);

    render_table(frame, table_area, state, generator, view_data);

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, status_area);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    generator: &Generator,
    view_data: &ViewData,
) {
    let window = state.visible_rows(generator);
    let body_rows = usize::from(area.height.saturating_sub(TABLE_CHROME_ROWS));
    let on_screen = rows_on_screen(&window, state, body_rows);

    let mut header_cells = vec![Cell::from(String::new())];
    header_cells.extend(COLUMNS.iter().enumerate().map(|(index, column)| {
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if index == view_data.selected_column {
            style = style.fg(Color::Black).bg(Color::Cyan);
        }
        Cell::from(header_label(column.field, state.sort)).style(style)
    }));
    let header = Row::new(header_cells);

    let rows = on_screen.iter().map(|row| {
        let record = &row.record;
        let muted = Style::default().fg(Color::Gray);
        Row::new(vec![
            Cell::from(CHECKBOX),
            Cell::from(record.name.clone()),
            Cell::from(record.phone.clone()).style(muted),
            Cell::from(record.score.to_string()),
            Cell::from(record.email.clone()).style(muted),
            Cell::from(record.last_message_at.to_string()).style(muted),
            Cell::from(record.added_by).style(muted),
        ])
    });

    let mut widths = vec![Constraint::Length(3)];
    widths.extend(COLUMNS.iter().map(|column| Constraint::Length(column.width)));

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state, on_screen))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

/// The materialized window includes overscan rows above and below the
/// viewport; only the ones from the first visible row down are drawn.
fn rows_on_screen<'a>(
    window: &'a [VisibleRow],
    state: &AppState,
    body_rows: usize,
) -> &'a [VisibleRow] {
    let first = state.viewport.first_visible_row(state.scroll_offset) as usize;
    let skip = window
        .iter()
        .position(|row| row.position >= first)
        .unwrap_or(window.len());
    let end = (skip + body_rows).min(window.len());
    &window[skip..end]
}

fn header_label(field: Field, sort: Option<SortSpec>) -> String {
    let mut label = field.label().to_owned();
    if let Some(sort) = sort
        && sort.field == field
    {
        label.push(' ');
        label.push_str(match sort.direction {
            SortDirection::Asc => SORT_MARK_ASC,
            SortDirection::Desc => SORT_MARK_DESC,
        });
    }
    label
}

fn table_title(state: &AppState, on_screen: &[VisibleRow]) -> String {
    let len = state.logical_len();
    let (Some(first), Some(last)) = (on_screen.first(), on_screen.last()) else {
        return format!("customers {len}");
    };
    let window = state.visible_range();
    format!(
        "customers {len} · rows {}-{} · window {}..{}",
        first.position + 1,
        last.position + 1,
        window.start,
        window.end
    )
}

fn search_line(state: &AppState) -> String {
    let cursor = if state.mode == InputMode::Search {
        SEARCH_CURSOR
    } else {
        ""
    };
    let pending = if state.phase() == Phase::Debouncing {
        " …"
    } else {
        ""
    };
    format!("search: {}{cursor}{pending}", state.query)
}

fn status_text(state: &AppState) -> String {
    let mode = match state.mode {
        InputMode::Nav => "NAV",
        InputMode::Search => "SEARCH",
    };
    let rows = if state.is_busy() {
        "Working...".to_owned()
    } else {
        format!("Showing {} rows", state.logical_len())
    };
    let hints = match state.mode {
        InputMode::Nav => "j/k g/G pg ^d/^u | h/l s 1-6 sort | / search ^l clear | q",
        InputMode::Search => "type to filter | enter/esc done | ^u clear",
    };
    let engine = match &state.engine {
        EngineStatus::Available => "",
        EngineStatus::Unavailable(_) => " | search off",
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {rows}{engine} | {status} | {hints}"),
        None => format!("{mode} | {rows}{engine} | {hints}"),
    }
}
