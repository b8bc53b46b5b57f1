use std::collections::BTreeSet;
use std::future::Future;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use scry_adapters::export::{
    export_file_name, export_page_to_csv, export_page_to_json, ExportError, ExportFormat,
};
use scry_adapters::http::ReqwestTransport;
use scry_core::debug_log::FileDebugLog;
use scry_core::fetch_coordinator::{FetchCoordinator, FetchTicket};
use scry_core::navigation::{NavigationStack, Screen, TableFilter};
use scry_core::operations::{PageOptions, SearchOptions, SortSpec};
use scry_core::query_client::{OperationAttempt, QueryClient, TransportError};
use scry_core::recent_connections::{FileRecentsStore, RecentConnection};
use scry_core::relationship_inference::{
    infer_relationships, RelationshipDirection, RelationshipInfo, RelationshipSource,
};
use scry_core::schema_model::{DataRow, DatabaseMap, TableMap, TableSchema};
use scry_core::viewport::{
    format_cell, natural_column_width, visible_column_span, visible_row_range, COLUMN_GAP,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::Mutex;

const TICK_RATE: Duration = Duration::from_millis(120);
const PAGE_LIMIT: u64 = 100;
const DEFAULT_URL: &str = "http://localhost:9925";

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("http client error: {0}")]
    Transport(#[from] TransportError),
}

pub fn run() -> Result<(), TuiError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut terminal = setup_terminal()?;
    let run_result = run_loop(&mut terminal, runtime.handle().clone());
    let restore_result = restore_terminal(&mut terminal);

    if let Err(error) = run_result {
        restore_result?;
        return Err(error);
    }

    restore_result?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), TuiError> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    handle: Handle,
) -> Result<(), TuiError> {
    let mut app = TuiApp::new(handle)?;
    let mut last_tick = Instant::now();

    loop {
        let size = terminal.size()?;
        app.set_viewport_width(size.width);
        terminal.draw(|frame| render(frame, &app))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(msg) = map_key_event(key, app.key_context()) {
                        app.handle(msg);
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.handle(Msg::Tick);
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectionKey {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScreenKind {
    Connect,
    Dashboard,
    Database,
    Table,
    Record,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyContext {
    kind: ScreenKind,
    editing: bool,
    retryable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    Quit,
    Back,
    ToggleHelp,
    Submit,
    Retry,
    RefreshAll,
    Disconnect,
    OpenSystem,
    ToggleSort,
    NextPage,
    PrevPage,
    OpenFilter,
    Export(ExportFormat),
    Navigate(DirectionKey),
    NextField,
    Input(char),
    Backspace,
    Tick,
}

fn map_key_event(key: KeyEvent, context: KeyContext) -> Option<Msg> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Msg::Quit);
    }

    if context.editing {
        return match key.code {
            KeyCode::Esc => Some(Msg::Back),
            KeyCode::Enter => Some(Msg::Submit),
            KeyCode::Tab => Some(Msg::NextField),
            KeyCode::Backspace => Some(Msg::Backspace),
            KeyCode::Up => Some(Msg::Navigate(DirectionKey::Up)),
            KeyCode::Down => Some(Msg::Navigate(DirectionKey::Down)),
            KeyCode::Char('r') if context.retryable => Some(Msg::Retry),
            KeyCode::Char(character) => Some(Msg::Input(character)),
            _ => None,
        };
    }

    let shared = match key.code {
        KeyCode::Char('q') => Some(Msg::Quit),
        KeyCode::Esc => Some(Msg::Back),
        KeyCode::Char('?') => Some(Msg::ToggleHelp),
        KeyCode::Enter => Some(Msg::Submit),
        KeyCode::Char('r') => Some(Msg::Retry),
        KeyCode::Tab => Some(Msg::NextField),
        KeyCode::Up | KeyCode::Char('k') => Some(Msg::Navigate(DirectionKey::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(Msg::Navigate(DirectionKey::Down)),
        KeyCode::Left | KeyCode::Char('h') => Some(Msg::Navigate(DirectionKey::Left)),
        KeyCode::Right | KeyCode::Char('l') => Some(Msg::Navigate(DirectionKey::Right)),
        _ => None,
    };
    if shared.is_some() {
        return shared;
    }

    match (context.kind, key.code) {
        (ScreenKind::Dashboard, KeyCode::Char('s')) => Some(Msg::OpenSystem),
        (ScreenKind::Dashboard, KeyCode::Char('R')) => Some(Msg::RefreshAll),
        (ScreenKind::Dashboard, KeyCode::Char('d')) => Some(Msg::Disconnect),
        (ScreenKind::Table, KeyCode::Char('s')) => Some(Msg::ToggleSort),
        (ScreenKind::Table, KeyCode::Char('n')) => Some(Msg::NextPage),
        (ScreenKind::Table, KeyCode::Char('p')) => Some(Msg::PrevPage),
        (ScreenKind::Table, KeyCode::Char('/')) => Some(Msg::OpenFilter),
        (ScreenKind::Table, KeyCode::Char('e')) => Some(Msg::Export(ExportFormat::Csv)),
        (ScreenKind::Table, KeyCode::Char('E')) => Some(Msg::Export(ExportFormat::Json)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectField {
    Url,
    Username,
    Password,
    Recents,
}

impl ConnectField {
    fn next(self, has_recents: bool) -> Self {
        match self {
            Self::Url => Self::Username,
            Self::Username => Self::Password,
            Self::Password => {
                if has_recents {
                    Self::Recents
                } else {
                    Self::Url
                }
            }
            Self::Recents => Self::Url,
        }
    }

    fn previous(self, has_recents: bool) -> Self {
        match self {
            Self::Url => {
                if has_recents {
                    Self::Recents
                } else {
                    Self::Password
                }
            }
            Self::Username => Self::Url,
            Self::Password => Self::Username,
            Self::Recents => Self::Password,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Username => "username",
            Self::Password => "password",
            Self::Recents => "recent",
        }
    }
}

#[derive(Debug, Clone)]
struct ConnectArgs {
    url: String,
    username: String,
    password: String,
}

#[derive(Debug)]
struct ConnectState {
    url: String,
    username: String,
    password: String,
    active_field: ConnectField,
    recent_entries: Vec<RecentConnection>,
    selected_recent: usize,
    retry_armed: bool,
    fetch: FetchCoordinator<ConnectArgs, ()>,
}

impl ConnectState {
    fn new(recent_entries: Vec<RecentConnection>) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            username: String::new(),
            password: String::new(),
            active_field: ConnectField::Url,
            recent_entries,
            selected_recent: 0,
            retry_armed: false,
            fetch: FetchCoordinator::new(),
        }
    }
}

#[derive(Debug)]
struct DashboardState {
    selected: usize,
    fetch: FetchCoordinator<bool, Arc<DatabaseMap>>,
}

impl DashboardState {
    fn new() -> Self {
        Self {
            selected: 0,
            fetch: FetchCoordinator::new(),
        }
    }
}

#[derive(Debug)]
struct DatabaseState {
    selected: usize,
    fetch: FetchCoordinator<String, Arc<TableMap>>,
}

impl DatabaseState {
    fn new() -> Self {
        Self {
            selected: 0,
            fetch: FetchCoordinator::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct ColumnSort {
    attribute: String,
    descending: bool,
}

#[derive(Debug, Clone)]
struct RowsArgs {
    database: String,
    table: String,
    filter: Option<TableFilter>,
    sort: Option<ColumnSort>,
    offset: u64,
}

#[derive(Debug)]
struct TablePage {
    schema: Arc<TableSchema>,
    rows: Vec<DataRow>,
}

#[derive(Debug)]
struct TableState {
    filter: Option<TableFilter>,
    sort: Option<ColumnSort>,
    offset: u64,
    selected_row: usize,
    selected_column: usize,
    column_start: usize,
    prompt: Option<String>,
    fetch: FetchCoordinator<RowsArgs, TablePage>,
}

impl TableState {
    fn new(filter: Option<TableFilter>) -> Self {
        Self {
            filter,
            sort: None,
            offset: 0,
            selected_row: 0,
            selected_column: 0,
            column_start: 0,
            prompt: None,
            fetch: FetchCoordinator::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct LinkArgs {
    database: String,
    table: String,
    id: Value,
}

#[derive(Debug)]
struct RecordState {
    selected_entry: usize,
    pending_link: Option<(String, String)>,
    tables: FetchCoordinator<String, Arc<TableMap>>,
    link: FetchCoordinator<LinkArgs, Vec<DataRow>>,
}

impl RecordState {
    fn new() -> Self {
        Self {
            selected_entry: 0,
            pending_link: None,
            tables: FetchCoordinator::new(),
            link: FetchCoordinator::new(),
        }
    }
}

#[derive(Debug)]
struct SystemState {
    scroll: usize,
    fetch: FetchCoordinator<(), Map<String, Value>>,
}

impl SystemState {
    fn new() -> Self {
        Self {
            scroll: 0,
            fetch: FetchCoordinator::new(),
        }
    }
}

#[derive(Debug)]
enum ScreenState {
    Connect(ConnectState),
    Dashboard(DashboardState),
    Database(DatabaseState),
    Table(TableState),
    Record(RecordState),
    System(SystemState),
}

impl ScreenState {
    fn kind(&self) -> ScreenKind {
        match self {
            Self::Connect(_) => ScreenKind::Connect,
            Self::Dashboard(_) => ScreenKind::Dashboard,
            Self::Database(_) => ScreenKind::Database,
            Self::Table(_) => ScreenKind::Table,
            Self::Record(_) => ScreenKind::Record,
            Self::System(_) => ScreenKind::System,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RecordEntry {
    Attribute {
        name: String,
        link: Option<RelationshipInfo>,
    },
    ReverseLink(RelationshipInfo),
}

fn record_entries(record: &DataRow, table: &str, tables: Option<&TableMap>) -> Vec<RecordEntry> {
    let relationships = tables
        .and_then(|tables| {
            tables
                .get(table)
                .map(|schema| infer_relationships(table, schema, tables))
        })
        .unwrap_or_default();

    let mut entries: Vec<RecordEntry> = record
        .keys()
        .map(|name| RecordEntry::Attribute {
            name: name.clone(),
            link: relationships
                .iter()
                .find(|info| {
                    info.direction == RelationshipDirection::Forward && info.attribute == *name
                })
                .cloned(),
        })
        .collect();

    for info in relationships {
        if info.direction == RelationshipDirection::Reverse {
            entries.push(RecordEntry::ReverseLink(info));
        }
    }

    entries
}

fn source_label(source: RelationshipSource) -> &'static str {
    match source {
        RelationshipSource::Api => "api",
        RelationshipSource::Inferred => "inferred",
    }
}

#[derive(Debug)]
struct TuiApp {
    client: Arc<Mutex<QueryClient<ReqwestTransport>>>,
    handle: Handle,
    recents: Option<FileRecentsStore>,
    debug: Option<FileDebugLog>,
    nav: NavigationStack,
    states: Vec<ScreenState>,
    connected_url: Option<String>,
    viewport_width: u16,
    show_help: bool,
    should_quit: bool,
    status_line: String,
}

impl TuiApp {
    fn new(handle: Handle) -> Result<Self, TuiError> {
        let transport = ReqwestTransport::new()?;
        let recents = FileRecentsStore::load_default().ok();
        let debug = FileDebugLog::load_default().ok();
        let recent_entries = recents
            .as_ref()
            .map(|store| store.connections().to_vec())
            .unwrap_or_default();

        Ok(Self {
            client: Arc::new(Mutex::new(QueryClient::new(transport))),
            handle,
            recents,
            debug,
            nav: NavigationStack::new(Screen::Connect),
            states: vec![ScreenState::Connect(ConnectState::new(recent_entries))],
            connected_url: None,
            viewport_width: 80,
            show_help: false,
            should_quit: false,
            status_line: "press ? for help".to_string(),
        })
    }

    fn set_viewport_width(&mut self, width: u16) {
        self.viewport_width = width;
    }

    fn current_kind(&self) -> ScreenKind {
        self.states
            .last()
            .map_or(ScreenKind::Connect, ScreenState::kind)
    }

    fn input_mode(&self) -> bool {
        match self.states.last() {
            Some(ScreenState::Connect(state)) => state.active_field != ConnectField::Recents,
            Some(ScreenState::Table(state)) => state.prompt.is_some(),
            _ => false,
        }
    }

    fn key_context(&self) -> KeyContext {
        let retryable = match self.states.last() {
            Some(ScreenState::Connect(state)) => {
                state.retry_armed && !state.fetch.is_loading() && state.fetch.error().is_some()
            }
            _ => false,
        };
        KeyContext {
            kind: self.current_kind(),
            editing: self.input_mode(),
            retryable,
        }
    }

    fn handle(&mut self, msg: Msg) {
        if self.show_help && !matches!(msg, Msg::Quit | Msg::ToggleHelp | Msg::Back | Msg::Tick) {
            return;
        }

        match msg {
            Msg::Quit => self.should_quit = true,
            Msg::Back => self.back(),
            Msg::ToggleHelp => self.show_help = !self.show_help,
            Msg::Submit => self.submit(),
            Msg::Retry => self.retry_current(),
            Msg::RefreshAll => self.refresh_dashboard(),
            Msg::Disconnect => self.disconnect(),
            Msg::OpenSystem => self.open_system(),
            Msg::ToggleSort => self.toggle_sort(),
            Msg::NextPage => self.next_page(),
            Msg::PrevPage => self.previous_page(),
            Msg::OpenFilter => self.open_filter(),
            Msg::Export(format) => self.export_current_page(format),
            Msg::Navigate(direction) => self.navigate(direction),
            Msg::NextField => self.next_field(),
            Msg::Input(character) => self.insert_char(character),
            Msg::Backspace => self.delete_char(),
            Msg::Tick => self.on_tick(),
        }
    }

    fn back(&mut self) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        if let Some(ScreenState::Table(state)) = self.states.last_mut() {
            if state.prompt.take().is_some() {
                self.status_line = "filter prompt cancelled".to_string();
                return;
            }
        }
        if self.pop_screen() {
            self.status_line = self.breadcrumb();
        } else {
            self.should_quit = true;
        }
    }

    fn push_screen(&mut self, screen: Screen, state: ScreenState) {
        self.nav.push(screen);
        self.states.push(state);
    }

    fn pop_screen(&mut self) -> bool {
        if self.nav.pop() {
            self.states.pop();
            true
        } else {
            false
        }
    }

    fn breadcrumb(&self) -> String {
        self.nav
            .screens()
            .map(screen_label)
            .collect::<Vec<_>>()
            .join(" > ")
    }

    fn submit(&mut self) {
        match self.current_kind() {
            ScreenKind::Connect => self.submit_connect(),
            ScreenKind::Dashboard => self.open_selected_database(),
            ScreenKind::Database => self.open_selected_table(),
            ScreenKind::Table => {
                let editing = matches!(
                    self.states.last(),
                    Some(ScreenState::Table(state)) if state.prompt.is_some()
                );
                if editing {
                    self.apply_filter();
                } else {
                    self.open_record_from_table();
                }
            }
            ScreenKind::Record => self.follow_record_link(),
            ScreenKind::System => {}
        }
    }

    fn submit_connect(&mut self) {
        let Some(ScreenState::Connect(state)) = self.states.last_mut() else {
            return;
        };
        if state.active_field == ConnectField::Recents {
            if let Some(entry) = state.recent_entries.get(state.selected_recent) {
                state.url = entry.url.clone();
                state.username = entry.username.clone();
                state.active_field = ConnectField::Password;
                state.retry_armed = false;
                self.status_line = "recent connection loaded; enter the password".to_string();
            }
            return;
        }
        if state.url.trim().is_empty() {
            self.status_line = "url is required".to_string();
            return;
        }

        let args = ConnectArgs {
            url: state.url.trim().to_string(),
            username: state.username.clone(),
            password: state.password.clone(),
        };
        let ticket = state.fetch.begin(args.clone());
        self.status_line = format!("connecting to {}", args.url);
        self.spawn_connect(args, ticket);
    }

    fn open_selected_database(&mut self) {
        let Some(ScreenState::Dashboard(state)) = self.states.last() else {
            return;
        };
        let Some(databases) = state.fetch.data() else {
            return;
        };
        let Some(name) = databases.keys().nth(state.selected) else {
            return;
        };
        let database = name.clone();

        self.push_screen(
            Screen::Database {
                database: database.clone(),
            },
            ScreenState::Database(DatabaseState::new()),
        );
        self.status_line = format!("opened {database}");
        self.start_database_fetch();
    }

    fn open_selected_table(&mut self) {
        let Screen::Database { database } = self.nav.current() else {
            return;
        };
        let database = database.clone();
        let Some(ScreenState::Database(state)) = self.states.last() else {
            return;
        };
        let Some(tables) = state.fetch.data() else {
            return;
        };
        let Some(name) = tables.keys().nth(state.selected) else {
            return;
        };
        let table = name.clone();

        self.push_screen(
            Screen::Table {
                database,
                table,
                filter: None,
            },
            ScreenState::Table(TableState::new(None)),
        );
        self.start_table_fetch();
    }

    fn open_record_from_table(&mut self) {
        let Screen::Table {
            database, table, ..
        } = self.nav.current()
        else {
            return;
        };
        let database = database.clone();
        let table = table.clone();
        let Some(ScreenState::Table(state)) = self.states.last() else {
            return;
        };
        let Some(page) = state.fetch.data() else {
            return;
        };
        let Some(record) = page.rows.get(state.selected_row) else {
            return;
        };
        let record = record.clone();

        self.open_record(database, table, record);
    }

    fn open_record(&mut self, database: String, table: String, record: DataRow) {
        self.push_screen(
            Screen::Record {
                database: database.clone(),
                table,
                record,
            },
            ScreenState::Record(RecordState::new()),
        );
        self.start_record_tables_fetch(database);
    }

    fn follow_record_link(&mut self) {
        let Screen::Record {
            database,
            table,
            record,
        } = self.nav.current()
        else {
            return;
        };
        let database = database.clone();
        let table = table.clone();
        let record = record.clone();

        enum Jump {
            Forward {
                target: String,
                id: Value,
            },
            Reverse {
                target: String,
                attribute: String,
                value: Value,
            },
        }

        let jump = {
            let Some(ScreenState::Record(state)) = self.states.last() else {
                return;
            };
            let tables = state.tables.data().map(Arc::as_ref);
            let entries = record_entries(&record, &table, tables);
            match entries.get(state.selected_entry) {
                Some(RecordEntry::Attribute {
                    name,
                    link: Some(link),
                }) => {
                    let value = record.get(name).cloned().unwrap_or(Value::Null);
                    if value.is_null() {
                        self.status_line = format!("{name} has no value to follow");
                        return;
                    }
                    Jump::Forward {
                        target: link.target_table.clone(),
                        id: value,
                    }
                }
                Some(RecordEntry::ReverseLink(link)) => {
                    let hash_value = tables
                        .and_then(|tables| tables.get(&table))
                        .and_then(|schema| record.get(&schema.hash_attribute))
                        .cloned();
                    let Some(value) = hash_value else {
                        self.status_line = "record has no key value to follow".to_string();
                        return;
                    };
                    Jump::Reverse {
                        target: link.target_table.clone(),
                        attribute: link.attribute.clone(),
                        value,
                    }
                }
                _ => {
                    self.status_line = "no link on this entry".to_string();
                    return;
                }
            }
        };

        match jump {
            Jump::Forward { target, id } => {
                let Some(ScreenState::Record(state)) = self.states.last_mut() else {
                    return;
                };
                state.pending_link = Some((database.clone(), target.clone()));
                let args = LinkArgs {
                    database,
                    table: target,
                    id,
                };
                let ticket = state.link.begin(args.clone());
                self.status_line = "following link".to_string();
                self.spawn_link(args, ticket);
            }
            Jump::Reverse {
                target,
                attribute,
                value,
            } => {
                let filter = TableFilter::new(attribute, value);
                self.push_screen(
                    Screen::Table {
                        database,
                        table: target,
                        filter: Some(filter.clone()),
                    },
                    ScreenState::Table(TableState::new(Some(filter))),
                );
                self.start_table_fetch();
            }
        }
    }

    fn open_system(&mut self) {
        self.push_screen(Screen::System, ScreenState::System(SystemState::new()));
        self.start_system_fetch();
    }

    fn refresh_dashboard(&mut self) {
        let ticket = match self.states.last_mut() {
            Some(ScreenState::Dashboard(state)) => state.fetch.begin(true),
            _ => return,
        };
        self.status_line = "cache cleared; refreshing".to_string();
        self.spawn_dashboard(true, ticket);
    }

    fn disconnect(&mut self) {
        let client = Arc::clone(&self.client);
        self.handle.spawn(async move {
            client.lock().await.disconnect();
        });

        self.connected_url = None;
        self.nav.reset();
        let recent_entries = self
            .recents
            .as_ref()
            .map(|store| store.connections().to_vec())
            .unwrap_or_default();
        self.states.clear();
        self.states
            .push(ScreenState::Connect(ConnectState::new(recent_entries)));
        self.status_line = "disconnected".to_string();
    }

    fn toggle_sort(&mut self) {
        let Some(ScreenState::Table(state)) = self.states.last_mut() else {
            return;
        };
        if state.filter.is_some() {
            self.status_line = "clear the filter to sort".to_string();
            return;
        }
        let Some(page) = state.fetch.data() else {
            return;
        };
        let columns = table_columns(page);
        let Some(column) = columns.get(state.selected_column) else {
            return;
        };
        let column = column.clone();

        state.sort = match state.sort.take() {
            Some(sort) if sort.attribute == column && !sort.descending => Some(ColumnSort {
                attribute: column,
                descending: true,
            }),
            Some(sort) if sort.attribute == column => None,
            _ => Some(ColumnSort {
                attribute: column,
                descending: false,
            }),
        };
        state.offset = 0;
        state.selected_row = 0;
        self.status_line = match &state.sort {
            Some(sort) if sort.descending => format!("sort {} descending", sort.attribute),
            Some(sort) => format!("sort {} ascending", sort.attribute),
            None => "sort cleared".to_string(),
        };
        self.start_table_fetch();
    }

    fn next_page(&mut self) {
        let Some(ScreenState::Table(state)) = self.states.last_mut() else {
            return;
        };
        let Some(page) = state.fetch.data() else {
            return;
        };
        if (page.rows.len() as u64) < PAGE_LIMIT {
            self.status_line = "already at the last page".to_string();
            return;
        }
        state.offset += PAGE_LIMIT;
        state.selected_row = 0;
        self.status_line = format!("page {}", state.offset / PAGE_LIMIT + 1);
        self.start_table_fetch();
    }

    fn previous_page(&mut self) {
        let Some(ScreenState::Table(state)) = self.states.last_mut() else {
            return;
        };
        if state.offset == 0 {
            self.status_line = "already at the first page".to_string();
            return;
        }
        state.offset = state.offset.saturating_sub(PAGE_LIMIT);
        state.selected_row = 0;
        self.status_line = format!("page {}", state.offset / PAGE_LIMIT + 1);
        self.start_table_fetch();
    }

    fn open_filter(&mut self) {
        let Some(ScreenState::Table(state)) = self.states.last_mut() else {
            return;
        };
        let Some(page) = state.fetch.data() else {
            return;
        };
        let columns = table_columns(page);
        let Some(column) = columns.get(state.selected_column) else {
            return;
        };
        self.status_line = format!("filter on {column}: Enter applies, empty clears");
        state.prompt = Some(String::new());
    }

    fn apply_filter(&mut self) {
        let Some(ScreenState::Table(state)) = self.states.last_mut() else {
            return;
        };
        let Some(buffer) = state.prompt.take() else {
            return;
        };
        let trimmed = buffer.trim();

        if trimmed.is_empty() {
            state.filter = None;
            state.offset = 0;
            state.selected_row = 0;
            self.status_line = "filter cleared".to_string();
            self.start_table_fetch();
            return;
        }

        let Some(page) = state.fetch.data() else {
            return;
        };
        let columns = table_columns(page);
        let Some(column) = columns.get(state.selected_column) else {
            return;
        };
        let filter = TableFilter::new(column.clone(), parse_filter_value(trimmed));
        self.status_line = format!("filter {} = {trimmed}", filter.attribute);
        state.filter = Some(filter);
        state.sort = None;
        state.offset = 0;
        state.selected_row = 0;
        self.start_table_fetch();
    }

    fn export_current_page(&mut self, format: ExportFormat) {
        let Screen::Table {
            database, table, ..
        } = self.nav.current()
        else {
            return;
        };
        let database = database.clone();
        let table = table.clone();
        let Some(ScreenState::Table(state)) = self.states.last() else {
            return;
        };
        let Some(page) = state.fetch.data() else {
            self.status_line = "nothing to export yet".to_string();
            return;
        };

        let columns = table_columns(page);
        let directory = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match export_page(&directory, &database, &table, format, &columns, &page.rows) {
            Ok(path) => {
                self.status_line =
                    format!("exported {} rows to {}", page.rows.len(), path.display());
            }
            Err(error) => self.status_line = format!("export failed: {error}"),
        }
    }

    fn navigate(&mut self, direction: DirectionKey) {
        self.disarm_connect_retry();
        match self.states.last_mut() {
            Some(ScreenState::Connect(state)) => navigate_connect(state, direction),
            Some(ScreenState::Dashboard(state)) => {
                let count = state.fetch.data().map_or(0, |databases| databases.len());
                state.selected = step_selection(state.selected, count, direction);
            }
            Some(ScreenState::Database(state)) => {
                let count = state.fetch.data().map_or(0, |tables| tables.len());
                state.selected = step_selection(state.selected, count, direction);
            }
            Some(ScreenState::Table(state)) => {
                if state.prompt.is_none() {
                    navigate_table(state, direction, self.viewport_width);
                }
            }
            Some(ScreenState::Record(state)) => {
                let count = match self.nav.current() {
                    Screen::Record { table, record, .. } => {
                        let tables = state.tables.data().map(Arc::as_ref);
                        record_entries(record, table, tables).len()
                    }
                    _ => 0,
                };
                state.selected_entry = step_selection(state.selected_entry, count, direction);
            }
            Some(ScreenState::System(state)) => {
                let count = state.fetch.data().map_or(0, Map::len);
                state.scroll = step_selection(state.scroll, count, direction);
            }
            None => {}
        }
    }

    fn next_field(&mut self) {
        self.disarm_connect_retry();
        if let Some(ScreenState::Connect(state)) = self.states.last_mut() {
            state.active_field = state.active_field.next(!state.recent_entries.is_empty());
        }
    }

    fn insert_char(&mut self, character: char) {
        self.disarm_connect_retry();
        match self.states.last_mut() {
            Some(ScreenState::Connect(state)) => match state.active_field {
                ConnectField::Url => state.url.push(character),
                ConnectField::Username => state.username.push(character),
                ConnectField::Password => state.password.push(character),
                ConnectField::Recents => {}
            },
            Some(ScreenState::Table(state)) => {
                if let Some(buffer) = state.prompt.as_mut() {
                    buffer.push(character);
                }
            }
            _ => {}
        }
    }

    fn delete_char(&mut self) {
        self.disarm_connect_retry();
        match self.states.last_mut() {
            Some(ScreenState::Connect(state)) => match state.active_field {
                ConnectField::Url => {
                    state.url.pop();
                }
                ConnectField::Username => {
                    state.username.pop();
                }
                ConnectField::Password => {
                    state.password.pop();
                }
                ConnectField::Recents => {}
            },
            Some(ScreenState::Table(state)) => {
                if let Some(buffer) = state.prompt.as_mut() {
                    buffer.pop();
                }
            }
            _ => {}
        }
    }

    fn disarm_connect_retry(&mut self) {
        if let Some(ScreenState::Connect(state)) = self.states.last_mut() {
            if state.retry_armed {
                state.retry_armed = false;
                if let Some(error) = state.fetch.error() {
                    self.status_line = error.to_string();
                }
            }
        }
    }

    fn retry_current(&mut self) {
        enum Restart {
            Connect(ConnectArgs, FetchTicket<()>),
            Dashboard(bool, FetchTicket<Arc<DatabaseMap>>),
            Database(String, FetchTicket<Arc<TableMap>>),
            Table(RowsArgs, FetchTicket<TablePage>),
            Link(LinkArgs, FetchTicket<Vec<DataRow>>),
            System(FetchTicket<Map<String, Value>>),
        }

        let restart = match self.states.last_mut() {
            Some(ScreenState::Connect(state)) if state.fetch.error().is_some() => state
                .fetch
                .retry()
                .map(|(args, ticket)| Restart::Connect(args, ticket)),
            Some(ScreenState::Dashboard(state)) if state.fetch.error().is_some() => state
                .fetch
                .retry()
                .map(|(args, ticket)| Restart::Dashboard(args, ticket)),
            Some(ScreenState::Database(state)) if state.fetch.error().is_some() => state
                .fetch
                .retry()
                .map(|(args, ticket)| Restart::Database(args, ticket)),
            Some(ScreenState::Table(state)) if state.fetch.error().is_some() => state
                .fetch
                .retry()
                .map(|(args, ticket)| Restart::Table(args, ticket)),
            Some(ScreenState::Record(state)) => {
                if state.tables.error().is_some() {
                    state
                        .tables
                        .retry()
                        .map(|(args, ticket)| Restart::Database(args, ticket))
                } else if state.link.error().is_some() {
                    state
                        .link
                        .retry()
                        .map(|(args, ticket)| Restart::Link(args, ticket))
                } else {
                    None
                }
            }
            Some(ScreenState::System(state)) => Some(Restart::System(state.fetch.begin(()))),
            _ => None,
        };

        let Some(restart) = restart else {
            return;
        };
        self.status_line = "retrying".to_string();
        match restart {
            Restart::Connect(args, ticket) => self.spawn_connect(args, ticket),
            Restart::Dashboard(clear_cache, ticket) => self.spawn_dashboard(clear_cache, ticket),
            Restart::Database(database, ticket) => self.spawn_database(database, ticket),
            Restart::Table(args, ticket) => self.spawn_table(args, ticket),
            Restart::Link(args, ticket) => self.spawn_link(args, ticket),
            Restart::System(ticket) => self.spawn_system(ticket),
        }
    }

    fn on_tick(&mut self) {
        enum Transition {
            None,
            Connected {
                url: String,
                username: String,
            },
            OpenRecord {
                database: String,
                table: String,
                record: DataRow,
            },
        }

        let mut transition = Transition::None;

        match self.states.last_mut() {
            Some(ScreenState::Connect(state)) => {
                if state.fetch.poll() {
                    if let Some(error) = state.fetch.error() {
                        state.retry_armed = true;
                        self.status_line = format!("{error} (press r to retry)");
                    } else if state.fetch.data().is_some() {
                        if let Some(args) = state.fetch.last_args() {
                            transition = Transition::Connected {
                                url: args.url.clone(),
                                username: args.username.clone(),
                            };
                        }
                    }
                }
            }
            Some(ScreenState::Dashboard(state)) => {
                if state.fetch.poll() {
                    if let Some(error) = state.fetch.error() {
                        self.status_line = format!("{error} (press r to retry)");
                    } else if let Some(databases) = state.fetch.data() {
                        state.selected = state.selected.min(databases.len().saturating_sub(1));
                        self.status_line = format!("{} databases", databases.len());
                    }
                }
            }
            Some(ScreenState::Database(state)) => {
                if state.fetch.poll() {
                    if let Some(error) = state.fetch.error() {
                        self.status_line = format!("{error} (press r to retry)");
                    } else if let Some(tables) = state.fetch.data() {
                        state.selected = state.selected.min(tables.len().saturating_sub(1));
                        self.status_line = format!("{} tables", tables.len());
                    }
                }
            }
            Some(ScreenState::Table(state)) => {
                if state.fetch.poll() {
                    if let Some(error) = state.fetch.error() {
                        self.status_line = format!("{error} (press r to retry)");
                    } else if let Some(page) = state.fetch.data() {
                        state.selected_row =
                            state.selected_row.min(page.rows.len().saturating_sub(1));
                        let columns = table_columns(page);
                        state.selected_column =
                            state.selected_column.min(columns.len().saturating_sub(1));
                        state.column_start = state.column_start.min(state.selected_column);
                        self.status_line = format!("{} rows", page.rows.len());
                    }
                }
            }
            Some(ScreenState::Record(state)) => {
                if state.tables.poll() {
                    if let Some(error) = state.tables.error() {
                        self.status_line = format!("relationships unavailable: {error}");
                    }
                }
                if state.link.poll() {
                    if let Some(error) = state.link.error() {
                        self.status_line = format!("link failed: {error}");
                    } else if let Some(rows) = state.link.data() {
                        match (rows.first(), state.pending_link.take()) {
                            (Some(record), Some((database, table))) => {
                                transition = Transition::OpenRecord {
                                    database,
                                    table,
                                    record: record.clone(),
                                };
                            }
                            (None, Some(_)) => {
                                self.status_line = "linked record not found".to_string();
                            }
                            _ => {}
                        }
                    }
                }
            }
            Some(ScreenState::System(state)) => {
                if state.fetch.poll() {
                    if let Some(error) = state.fetch.error() {
                        self.status_line = format!("{error} (press r to retry)");
                    } else if let Some(info) = state.fetch.data() {
                        state.scroll = state.scroll.min(info.len().saturating_sub(1));
                        self.status_line = format!("{} entries", info.len());
                    }
                }
            }
            None => {}
        }

        match transition {
            Transition::None => {}
            Transition::Connected { url, username } => self.finish_connect(url, username),
            Transition::OpenRecord {
                database,
                table,
                record,
            } => self.open_record(database, table, record),
        }
    }

    fn finish_connect(&mut self, url: String, username: String) {
        if let Some(store) = self.recents.as_mut() {
            store.record(url.clone(), username.clone());
            if let Err(error) = store.persist() {
                self.status_line = format!("failed to save recent connections: {error}");
            }
        }
        let connections = self
            .recents
            .as_ref()
            .map(|store| store.connections().to_vec())
            .unwrap_or_default();
        if let Some(ScreenState::Connect(state)) = self.states.first_mut() {
            state.recent_entries = connections;
        }

        self.status_line = format!("connected to {url}");
        self.connected_url = Some(url);
        self.push_screen(
            Screen::Dashboard,
            ScreenState::Dashboard(DashboardState::new()),
        );
        self.start_dashboard_fetch(false);
    }

    fn start_dashboard_fetch(&mut self, clear_cache: bool) {
        let Some(ScreenState::Dashboard(state)) = self.states.last_mut() else {
            return;
        };
        let ticket = state.fetch.begin(clear_cache);
        self.spawn_dashboard(clear_cache, ticket);
    }

    fn start_database_fetch(&mut self) {
        let Screen::Database { database } = self.nav.current() else {
            return;
        };
        let database = database.clone();
        let Some(ScreenState::Database(state)) = self.states.last_mut() else {
            return;
        };
        let ticket = state.fetch.begin(database.clone());
        self.spawn_database(database, ticket);
    }

    fn start_table_fetch(&mut self) {
        let Screen::Table {
            database, table, ..
        } = self.nav.current()
        else {
            return;
        };
        let database = database.clone();
        let table = table.clone();
        let Some(ScreenState::Table(state)) = self.states.last_mut() else {
            return;
        };
        let args = RowsArgs {
            database,
            table,
            filter: state.filter.clone(),
            sort: state.sort.clone(),
            offset: state.offset,
        };
        let ticket = state.fetch.begin(args.clone());
        self.spawn_table(args, ticket);
    }

    fn start_record_tables_fetch(&mut self, database: String) {
        let Some(ScreenState::Record(state)) = self.states.last_mut() else {
            return;
        };
        let ticket = state.tables.begin(database.clone());
        self.spawn_database(database, ticket);
    }

    fn start_system_fetch(&mut self) {
        let Some(ScreenState::System(state)) = self.states.last_mut() else {
            return;
        };
        let ticket = state.fetch.begin(());
        self.spawn_system(ticket);
    }

    fn spawn_task<T, F>(&self, ticket: FetchTicket<T>, future: F)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, String>> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let debug = self.debug.clone();
        self.handle.spawn(async move {
            let result = future.await;
            if let Some(log) = &debug {
                let attempts = client.lock().await.drain_attempts();
                for attempt in attempts {
                    let _ = log.append("client", render_attempt(&attempt));
                }
            }
            ticket.complete(result);
        });
    }

    fn spawn_connect(&self, args: ConnectArgs, ticket: FetchTicket<()>) {
        let client = Arc::clone(&self.client);
        self.spawn_task(ticket, async move {
            client
                .lock()
                .await
                .connect(&args.url, &args.username, &args.password)
                .await
                .map_err(|error| error.to_string())
        });
    }

    fn spawn_dashboard(&self, clear_cache: bool, ticket: FetchTicket<Arc<DatabaseMap>>) {
        let client = Arc::clone(&self.client);
        self.spawn_task(ticket, async move {
            let mut client = client.lock().await;
            if clear_cache {
                client.clear_cache();
            }
            client
                .describe_all()
                .await
                .map_err(|error| error.to_string())
        });
    }

    fn spawn_database(&self, database: String, ticket: FetchTicket<Arc<TableMap>>) {
        let client = Arc::clone(&self.client);
        self.spawn_task(ticket, async move {
            client
                .lock()
                .await
                .describe_database(&database)
                .await
                .map_err(|error| error.to_string())
        });
    }

    fn spawn_table(&self, args: RowsArgs, ticket: FetchTicket<TablePage>) {
        let client = Arc::clone(&self.client);
        self.spawn_task(ticket, async move {
            let mut client = client.lock().await;
            let schema = client
                .describe_table(&args.database, &args.table)
                .await
                .map_err(|error| error.to_string())?;

            let rows = match &args.filter {
                Some(filter) => {
                    let page = PageOptions {
                        attributes: None,
                        limit: Some(PAGE_LIMIT),
                        offset: Some(args.offset),
                    };
                    client
                        .search_by_value(
                            &args.database,
                            &args.table,
                            &filter.attribute,
                            filter.value.clone(),
                            &page,
                        )
                        .await
                        .map_err(|error| error.to_string())?
                }
                None => {
                    let options = SearchOptions {
                        operator: None,
                        sort: args
                            .sort
                            .as_ref()
                            .map(|sort| SortSpec::new(sort.attribute.clone(), sort.descending)),
                        limit: Some(PAGE_LIMIT),
                        offset: Some(args.offset),
                        attributes: None,
                    };
                    client
                        .search_by_conditions(
                            &args.database,
                            &args.table,
                            Vec::new(),
                            &options,
                            Some(&schema.hash_attribute),
                        )
                        .await
                        .map_err(|error| error.to_string())?
                }
            };

            Ok(TablePage { schema, rows })
        });
    }

    fn spawn_link(&self, args: LinkArgs, ticket: FetchTicket<Vec<DataRow>>) {
        let client = Arc::clone(&self.client);
        self.spawn_task(ticket, async move {
            let LinkArgs {
                database,
                table,
                id,
            } = args;
            client
                .lock()
                .await
                .search_by_id(&database, &table, vec![id], None)
                .await
                .map_err(|error| error.to_string())
        });
    }

    fn spawn_system(&self, ticket: FetchTicket<Map<String, Value>>) {
        let client = Arc::clone(&self.client);
        self.spawn_task(ticket, async move {
            client
                .lock()
                .await
                .system_information(None)
                .await
                .map_err(|error| error.to_string())
        });
    }

    fn top_activity(&self) -> String {
        match self.states.last() {
            Some(ScreenState::Connect(state)) => fetch_activity(&state.fetch),
            Some(ScreenState::Dashboard(state)) => fetch_activity(&state.fetch),
            Some(ScreenState::Database(state)) => fetch_activity(&state.fetch),
            Some(ScreenState::Table(state)) => fetch_activity(&state.fetch),
            Some(ScreenState::Record(state)) => {
                if state.link.is_loading() {
                    fetch_activity(&state.link)
                } else {
                    fetch_activity(&state.tables)
                }
            }
            Some(ScreenState::System(state)) => fetch_activity(&state.fetch),
            None => String::new(),
        }
    }

    fn body_title(&self) -> String {
        match self.nav.current() {
            Screen::Connect => "connect".to_string(),
            Screen::Dashboard => "databases".to_string(),
            Screen::Database { database } => database.clone(),
            Screen::Table {
                database, table, ..
            } => {
                let mut title = format!("{database}.{table}");
                if let Some(ScreenState::Table(state)) = self.states.last() {
                    if let Some(filter) = &state.filter {
                        title.push_str(&format!(
                            "  filter {} = {}",
                            filter.attribute,
                            format_cell(&filter.attribute, &filter.value)
                        ));
                    }
                    if let Some(sort) = &state.sort {
                        let order = if sort.descending { "desc" } else { "asc" };
                        title.push_str(&format!("  sort {} {order}", sort.attribute));
                    }
                    title.push_str(&format!("  page {}", state.offset / PAGE_LIMIT + 1));
                }
                title
            }
            Screen::Record { table, .. } => format!("{table} record"),
            Screen::System => "system information".to_string(),
        }
    }

    fn key_hints(&self) -> &'static str {
        match (self.current_kind(), self.input_mode()) {
            (ScreenKind::Connect, _) => "Enter connect | Tab next field | arrows move | Esc quit",
            (ScreenKind::Dashboard, _) => {
                "Enter open | s system | R refresh | d disconnect | ? help | q quit"
            }
            (ScreenKind::Database, _) => "Enter open | r retry | Esc back | ? help",
            (ScreenKind::Table, true) => "Enter apply (empty clears) | Esc cancel",
            (ScreenKind::Table, false) => {
                "Enter record | / filter | s sort | n/p page | e/E export | Esc back"
            }
            (ScreenKind::Record, _) => "Enter follow link | Esc back | ? help",
            (ScreenKind::System, _) => "r refresh | Esc back | ? help",
        }
    }
}

fn navigate_connect(state: &mut ConnectState, direction: DirectionKey) {
    let has_recents = !state.recent_entries.is_empty();
    match direction {
        DirectionKey::Up => {
            if state.active_field == ConnectField::Recents && state.selected_recent > 0 {
                state.selected_recent -= 1;
            } else {
                state.active_field = state.active_field.previous(has_recents);
            }
        }
        DirectionKey::Down => {
            if state.active_field == ConnectField::Recents
                && state.selected_recent + 1 < state.recent_entries.len()
            {
                state.selected_recent += 1;
            } else {
                state.active_field = state.active_field.next(has_recents);
            }
        }
        DirectionKey::Left | DirectionKey::Right => {}
    }
}

fn navigate_table(state: &mut TableState, direction: DirectionKey, viewport_width: u16) {
    let Some(page) = state.fetch.data() else {
        return;
    };
    let row_count = page.rows.len();
    let columns = table_columns(page);

    match direction {
        DirectionKey::Up => state.selected_row = state.selected_row.saturating_sub(1),
        DirectionKey::Down => {
            if row_count > 0 {
                state.selected_row = (state.selected_row + 1).min(row_count - 1);
            }
        }
        DirectionKey::Left | DirectionKey::Right => {
            if columns.is_empty() {
                return;
            }
            let widths = column_widths(&columns, &page.rows);
            state.selected_column = match direction {
                DirectionKey::Left => state.selected_column.saturating_sub(1),
                _ => (state.selected_column + 1).min(columns.len() - 1),
            };
            let budget = usize::from(viewport_width.saturating_sub(4));
            state.column_start =
                follow_selected_column(state.column_start, state.selected_column, &widths, budget);
        }
    }
}

fn step_selection(current: usize, count: usize, direction: DirectionKey) -> usize {
    if count == 0 {
        return 0;
    }
    match direction {
        DirectionKey::Up | DirectionKey::Left => current.saturating_sub(1),
        DirectionKey::Down | DirectionKey::Right => (current + 1).min(count - 1),
    }
}

fn follow_selected_column(start: usize, selected: usize, widths: &[usize], budget: usize) -> usize {
    let mut start = start.min(selected);
    loop {
        let span = visible_column_span(widths, start, budget);
        if selected < span.end || span.end >= widths.len() {
            break;
        }
        start += 1;
    }
    start
}

fn table_columns(page: &TablePage) -> Vec<String> {
    let mut columns = page.schema.attribute_names();
    let known: BTreeSet<String> = columns.iter().cloned().collect();
    let mut extra: BTreeSet<String> = BTreeSet::new();
    for row in &page.rows {
        for key in row.keys() {
            if !known.contains(key) {
                extra.insert(key.clone());
            }
        }
    }
    columns.extend(extra);
    columns
}

fn column_widths(columns: &[String], rows: &[DataRow]) -> Vec<usize> {
    columns
        .iter()
        .map(|column| {
            let cells: Vec<String> = rows
                .iter()
                .map(|row| format_cell(column, row.get(column).unwrap_or(&Value::Null)))
                .collect();
            natural_column_width(column, &cells)
        })
        .collect()
}

fn pad_cell(text: &str, width: usize) -> String {
    let mut cell: String = text.chars().take(width).collect();
    while cell.chars().count() < width {
        cell.push(' ');
    }
    cell
}

fn parse_filter_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed == "true" {
        return Value::Bool(true);
    }
    if trimmed == "false" {
        return Value::Bool(false);
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::from(integer);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }
    Value::String(trimmed.to_string())
}

fn render_attempt(attempt: &OperationAttempt) -> String {
    let outcome = if attempt.succeeded { "ok" } else { "failed" };
    format!(
        "{} {}ms {outcome}",
        attempt.operation,
        attempt.elapsed.as_millis()
    )
}

fn export_page(
    directory: &Path,
    database: &str,
    table: &str,
    format: ExportFormat,
    columns: &[String],
    rows: &[DataRow],
) -> Result<PathBuf, ExportError> {
    let path = directory.join(export_file_name(database, table, format));
    match format {
        ExportFormat::Csv => export_page_to_csv(&path, columns, rows)?,
        ExportFormat::Json => export_page_to_json(&path, columns, rows)?,
    };
    Ok(path)
}

fn fetch_activity<A, T>(fetch: &FetchCoordinator<A, T>) -> String {
    if fetch.is_loading() {
        return "loading...".to_string();
    }
    match fetch.elapsed() {
        Some(elapsed) => format!("{} ms", elapsed.as_millis()),
        None => "idle".to_string(),
    }
}

fn screen_label(screen: &Screen) -> String {
    match screen {
        Screen::Connect => "connect".to_string(),
        Screen::Dashboard => "databases".to_string(),
        Screen::Database { database } => database.clone(),
        Screen::Table { table, .. } => table.clone(),
        Screen::Record { .. } => "record".to_string(),
        Screen::System => "system".to_string(),
    }
}

fn render(frame: &mut Frame<'_>, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    if app.show_help {
        render_help_popup(frame);
    }
}

fn render_header(frame: &mut Frame<'_>, app: &TuiApp, area: Rect) {
    let instance = app.connected_url.as_deref().unwrap_or("not connected");
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            app.breadcrumb(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::raw(format!("instance: {instance}")),
        Span::raw("  |  "),
        Span::raw(app.top_activity()),
    ]))
    .block(Block::default().borders(Borders::ALL).title("scry"));
    frame.render_widget(header, area);
}

fn render_body(frame: &mut Frame<'_>, app: &TuiApp, area: Rect) {
    let lines = match app.states.last() {
        Some(ScreenState::Connect(state)) => connect_lines(state),
        Some(ScreenState::Dashboard(state)) => dashboard_lines(state),
        Some(ScreenState::Database(state)) => database_lines(state),
        Some(ScreenState::Table(state)) => table_lines(state, area),
        Some(ScreenState::Record(state)) => record_lines(state, app.nav.current()),
        Some(ScreenState::System(state)) => system_lines(state, area),
        None => Vec::new(),
    };
    let body = Paragraph::new(lines).alignment(Alignment::Left).block(
        Block::default()
            .borders(Borders::ALL)
            .title(app.body_title()),
    );
    frame.render_widget(body, area);
}

fn render_footer(frame: &mut Frame<'_>, app: &TuiApp, area: Rect) {
    let footer = Paragraph::new(vec![
        Line::from(app.key_hints()),
        Line::from(format!("status: {}", app.status_line)),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn render_help_popup(frame: &mut Frame<'_>) {
    let area = centered_rect(70, 60, frame.area());
    let lines = vec![
        Line::from("? toggle this help"),
        Line::from("Esc back (quits from the connect screen)"),
        Line::from("q quit, Ctrl+C quit"),
        Line::from("Enter open / submit"),
        Line::from("arrows or hjkl move"),
        Line::from("r retry a failed fetch (refetch on the system screen)"),
        Line::from(""),
        Line::from("dashboard: s system info, R clear cache and refetch, d disconnect"),
        Line::from("table: / filter, s sort, n next page, p previous page"),
        Line::from("table: e export csv, E export json"),
        Line::from("record: Enter follows the selected link"),
    ];
    let help = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("help"));
    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn pending_lines<A, T>(fetch: &FetchCoordinator<A, T>) -> Option<Vec<Line<'static>>> {
    if let Some(error) = fetch.error() {
        return Some(vec![
            Line::from(format!("error: {error}")),
            Line::from("press r to retry"),
        ]);
    }
    if fetch.data().is_none() {
        if fetch.is_loading() {
            return Some(vec![Line::from("loading...")]);
        }
        return Some(vec![Line::from("no data")]);
    }
    None
}

fn connect_lines(state: &ConnectState) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("connect to an instance"), Line::from("")];

    let masked = "*".repeat(state.password.chars().count());
    let fields = [
        (ConnectField::Url, state.url.clone()),
        (ConnectField::Username, state.username.clone()),
        (ConnectField::Password, masked),
    ];
    for (field, value) in fields {
        let marker = if state.active_field == field { ">" } else { " " };
        lines.push(Line::from(format!("{marker} {}: {value}", field.label())));
    }

    if let Some(error) = state.fetch.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("error: {error}")));
        if state.retry_armed {
            lines.push(Line::from("press r to retry"));
        }
    } else if state.fetch.is_loading() {
        lines.push(Line::from(""));
        lines.push(Line::from("connecting..."));
    }

    if !state.recent_entries.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from("recent connections"));
        for (index, entry) in state.recent_entries.iter().enumerate() {
            let marker =
                if state.active_field == ConnectField::Recents && index == state.selected_recent {
                    ">"
                } else {
                    " "
                };
            lines.push(Line::from(format!(
                "{marker} {} ({})",
                entry.url, entry.username
            )));
        }
    }

    lines
}

fn dashboard_lines(state: &DashboardState) -> Vec<Line<'static>> {
    if let Some(lines) = pending_lines(&state.fetch) {
        return lines;
    }
    let Some(databases) = state.fetch.data() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for (index, (name, tables)) in databases.iter().enumerate() {
        let marker = if index == state.selected { ">" } else { " " };
        lines.push(Line::from(format!(
            "{marker} {name}  ({} tables)",
            tables.len()
        )));
    }
    if databases.is_empty() {
        lines.push(Line::from("no databases"));
    }
    lines
}

fn database_lines(state: &DatabaseState) -> Vec<Line<'static>> {
    if let Some(lines) = pending_lines(&state.fetch) {
        return lines;
    }
    let Some(tables) = state.fetch.data() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for (index, (name, schema)) in tables.iter().enumerate() {
        let marker = if index == state.selected { ">" } else { " " };
        lines.push(Line::from(format!(
            "{marker} {name}  ({} records, key: {})",
            schema.record_count, schema.hash_attribute
        )));
    }
    if tables.is_empty() {
        lines.push(Line::from("no tables"));
    }
    lines
}

fn table_lines(state: &TableState, area: Rect) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(buffer) = &state.prompt {
        lines.push(Line::from(format!("filter value: {buffer}_")));
        lines.push(Line::from(""));
    }

    if let Some(error) = state.fetch.error() {
        lines.push(Line::from(format!("error: {error}")));
        lines.push(Line::from("press r to retry"));
        return lines;
    }
    let Some(page) = state.fetch.data() else {
        if state.fetch.is_loading() {
            lines.push(Line::from("loading..."));
        } else {
            lines.push(Line::from("no data"));
        }
        return lines;
    };

    let columns = table_columns(page);
    if columns.is_empty() {
        lines.push(Line::from("table has no attributes"));
        return lines;
    }
    let widths = column_widths(&columns, &page.rows);
    let budget = usize::from(area.width.saturating_sub(4));
    let span = visible_column_span(&widths, state.column_start, budget);

    lines.push(Line::from(format!(
        "columns {}-{} of {}  ({} hidden left, {} hidden right)",
        span.start + 1,
        span.end,
        columns.len(),
        span.hidden_left,
        span.hidden_right,
    )));

    let gap = " ".repeat(COLUMN_GAP);
    let mut header_spans = vec![Span::raw("  ")];
    for index in span.start..span.end {
        let text = format!("{}{gap}", pad_cell(&columns[index], widths[index]));
        if index == state.selected_column {
            header_spans.push(Span::styled(
                text,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            header_spans.push(Span::raw(text));
        }
    }
    lines.push(Line::from(header_spans));

    let max_rows = usize::from(area.height)
        .saturating_sub(lines.len() + 2)
        .max(1);
    let window = visible_row_range(page.rows.len(), state.selected_row, max_rows);
    for row_index in window.start..window.end {
        let row = &page.rows[row_index];
        let marker = if row_index == state.selected_row {
            "> "
        } else {
            "  "
        };
        let mut text = String::from(marker);
        for column_index in span.start..span.end {
            let column = &columns[column_index];
            let value = row.get(column).unwrap_or(&Value::Null);
            text.push_str(&pad_cell(&format_cell(column, value), widths[column_index]));
            text.push_str(&gap);
        }
        lines.push(Line::from(text));
    }
    if page.rows.is_empty() {
        lines.push(Line::from("no rows"));
    }
    lines
}

fn record_lines(state: &RecordState, screen: &Screen) -> Vec<Line<'static>> {
    let Screen::Record { table, record, .. } = screen else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    if let Some(error) = state.tables.error() {
        lines.push(Line::from(format!("relationships unavailable: {error}")));
        lines.push(Line::from(""));
    } else if state.tables.is_loading() {
        lines.push(Line::from("resolving relationships..."));
        lines.push(Line::from(""));
    }
    if let Some(error) = state.link.error() {
        lines.push(Line::from(format!("link failed: {error}")));
        lines.push(Line::from(""));
    } else if state.link.is_loading() {
        lines.push(Line::from("following link..."));
        lines.push(Line::from(""));
    }

    let tables = state.tables.data().map(Arc::as_ref);
    let entries = record_entries(record, table, tables);
    let mut reverse_started = false;
    for (index, entry) in entries.iter().enumerate() {
        let marker = if index == state.selected_entry {
            ">"
        } else {
            " "
        };
        match entry {
            RecordEntry::Attribute { name, link } => {
                let value = format_cell(name, record.get(name).unwrap_or(&Value::Null));
                let annotation = link
                    .as_ref()
                    .map(|link| {
                        format!("  -> {} [{}]", link.target_table, source_label(link.source))
                    })
                    .unwrap_or_default();
                lines.push(Line::from(format!("{marker} {name}: {value}{annotation}")));
            }
            RecordEntry::ReverseLink(link) => {
                if !reverse_started {
                    lines.push(Line::from(""));
                    lines.push(Line::from("linked records"));
                    reverse_started = true;
                }
                lines.push(Line::from(format!(
                    "{marker} {}.{} [{}]",
                    link.target_table,
                    link.attribute,
                    source_label(link.source)
                )));
            }
        }
    }
    if entries.is_empty() {
        lines.push(Line::from("empty record"));
    }
    lines
}

fn system_lines(state: &SystemState, area: Rect) -> Vec<Line<'static>> {
    if let Some(lines) = pending_lines(&state.fetch) {
        return lines;
    }
    let Some(info) = state.fetch.data() else {
        return Vec::new();
    };

    let entries: Vec<(&String, &Value)> = info.iter().collect();
    let max_visible = usize::from(area.height).saturating_sub(2).max(1);
    let window = visible_row_range(entries.len(), state.scroll, max_visible);

    let mut lines = Vec::new();
    for index in window.start..window.end {
        let (key, value) = entries[index];
        let marker = if index == state.scroll { ">" } else { " " };
        let rendered = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        lines.push(Line::from(format!("{marker} {key}: {rendered}")));
    }
    if entries.is_empty() {
        lines.push(Line::from("no system information"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use scry_core::schema_model::Attribute;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn context(kind: ScreenKind, editing: bool) -> KeyContext {
        KeyContext {
            kind,
            editing,
            retryable: false,
        }
    }

    fn test_app() -> (tokio::runtime::Runtime, TuiApp) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime should build");
        let mut app = TuiApp::new(runtime.handle().clone()).expect("app should build");
        app.recents = None;
        app.debug = None;
        (runtime, app)
    }

    fn seed_connect_failure(app: &mut TuiApp, message: &str) {
        let ticket = match app.states.last_mut() {
            Some(ScreenState::Connect(state)) => state.fetch.begin(ConnectArgs {
                url: "http://127.0.0.1:9925".to_string(),
                username: "reader".to_string(),
                password: "secret".to_string(),
            }),
            other => panic!("expected the connect screen, got {other:?}"),
        };
        ticket.complete(Err(message.to_string()));
        app.handle(Msg::Tick);
    }

    fn schema(database: &str, table: &str, hash: &str, attributes: &[&str]) -> TableSchema {
        TableSchema {
            schema: database.to_string(),
            name: table.to_string(),
            hash_attribute: hash.to_string(),
            audit: false,
            schema_defined: false,
            record_count: 0,
            attributes: attributes
                .iter()
                .map(|name| Attribute::new(*name))
                .collect(),
            extra: Map::new(),
        }
    }

    #[test]
    fn keymap_distinguishes_editing_from_normal_mode() {
        assert_eq!(
            map_key_event(key(KeyCode::Char('q')), context(ScreenKind::Connect, true)),
            Some(Msg::Input('q'))
        );
        assert_eq!(
            map_key_event(
                key(KeyCode::Char('q')),
                context(ScreenKind::Dashboard, false)
            ),
            Some(Msg::Quit)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Enter), context(ScreenKind::Connect, true)),
            Some(Msg::Submit)
        );

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(
            map_key_event(ctrl_c, context(ScreenKind::Connect, true)),
            Some(Msg::Quit)
        );
    }

    #[test]
    fn keymap_routes_screen_specific_keys() {
        assert_eq!(
            map_key_event(key(KeyCode::Char('s')), context(ScreenKind::Table, false)),
            Some(Msg::ToggleSort)
        );
        assert_eq!(
            map_key_event(
                key(KeyCode::Char('s')),
                context(ScreenKind::Dashboard, false)
            ),
            Some(Msg::OpenSystem)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('s')), context(ScreenKind::Record, false)),
            None
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('/')), context(ScreenKind::Table, false)),
            Some(Msg::OpenFilter)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('E')), context(ScreenKind::Table, false)),
            Some(Msg::Export(ExportFormat::Json))
        );
        assert_eq!(
            map_key_event(
                key(KeyCode::Char('d')),
                context(ScreenKind::Dashboard, false)
            ),
            Some(Msg::Disconnect)
        );
    }

    #[test]
    fn retry_key_reaches_the_connect_form_only_when_armed() {
        let armed = KeyContext {
            kind: ScreenKind::Connect,
            editing: true,
            retryable: true,
        };
        assert_eq!(
            map_key_event(key(KeyCode::Char('r')), armed),
            Some(Msg::Retry)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('u')), armed),
            Some(Msg::Input('u'))
        );

        assert_eq!(
            map_key_event(key(KeyCode::Char('r')), context(ScreenKind::Connect, true)),
            Some(Msg::Input('r'))
        );
    }

    #[test]
    fn failed_connect_arms_the_retry_key_without_touching_the_form() {
        let (_runtime, mut app) = test_app();
        seed_connect_failure(&mut app, "connection refused");

        let context = app.key_context();
        assert!(context.editing);
        assert!(context.retryable);
        assert_eq!(
            map_key_event(key(KeyCode::Char('r')), context),
            Some(Msg::Retry)
        );

        app.handle(Msg::Retry);
        match app.states.last() {
            Some(ScreenState::Connect(state)) => {
                assert!(state.fetch.is_loading());
                assert!(state.fetch.error().is_none());
                assert_eq!(state.url, DEFAULT_URL);
            }
            other => panic!("expected the connect screen, got {other:?}"),
        }
    }

    #[test]
    fn editing_the_connect_form_disarms_the_retry_key() {
        let (_runtime, mut app) = test_app();
        seed_connect_failure(&mut app, "connection refused");
        assert!(app.status_line.contains("press r to retry"));

        app.handle(Msg::Input('x'));

        let context = app.key_context();
        assert!(!context.retryable);
        assert_eq!(
            map_key_event(key(KeyCode::Char('r')), context),
            Some(Msg::Input('r'))
        );
        assert_eq!(app.status_line, "connection refused");
        match app.states.last() {
            Some(ScreenState::Connect(state)) => assert!(state.url.ends_with('x')),
            other => panic!("expected the connect screen, got {other:?}"),
        }
    }

    #[test]
    fn connect_records_the_pair_that_authenticated() {
        let (_runtime, mut app) = test_app();
        let temp = TempDir::new().expect("temp dir should be created");
        let store = FileRecentsStore::load_from_path(temp.path().join("recents.toml"))
            .expect("store should load");
        app.recents = Some(store);

        let ticket = match app.states.last_mut() {
            Some(ScreenState::Connect(state)) => {
                state.url = "http://db-one:9925".to_string();
                state.username = "reader".to_string();
                state.password = "secret".to_string();
                state.fetch.begin(ConnectArgs {
                    url: state.url.clone(),
                    username: state.username.clone(),
                    password: state.password.clone(),
                })
            }
            other => panic!("expected the connect screen, got {other:?}"),
        };

        app.handle(Msg::Input('x'));
        ticket.complete(Ok(()));
        app.handle(Msg::Tick);

        assert_eq!(app.connected_url.as_deref(), Some("http://db-one:9925"));
        assert!(matches!(app.nav.current(), Screen::Dashboard));
        let recorded = app
            .recents
            .as_ref()
            .and_then(|store| store.connections().first())
            .expect("the submitted pair should be recorded");
        assert_eq!(recorded.url, "http://db-one:9925");
        assert_eq!(recorded.username, "reader");
    }

    #[test]
    fn connect_field_cycle_skips_recents_when_empty() {
        assert_eq!(ConnectField::Password.next(false), ConnectField::Url);
        assert_eq!(ConnectField::Password.next(true), ConnectField::Recents);
        assert_eq!(ConnectField::Recents.next(true), ConnectField::Url);
        assert_eq!(ConnectField::Url.previous(true), ConnectField::Recents);
        assert_eq!(ConnectField::Url.previous(false), ConnectField::Password);
    }

    #[test]
    fn filter_values_parse_into_typed_json() {
        assert_eq!(parse_filter_value("42"), json!(42));
        assert_eq!(parse_filter_value("-3.5"), json!(-3.5));
        assert_eq!(parse_filter_value("true"), json!(true));
        assert_eq!(parse_filter_value("false"), json!(false));
        assert_eq!(parse_filter_value("widget"), json!("widget"));
        assert_eq!(parse_filter_value(" 7 "), json!(7));
    }

    #[test]
    fn table_columns_keep_schema_order_then_extras() {
        let mut row = Map::new();
        row.insert("zz_extra".to_string(), json!(1));
        row.insert("id".to_string(), json!(1));
        let page = TablePage {
            schema: Arc::new(schema("retail", "orders", "id", &["id", "total"])),
            rows: vec![row],
        };

        assert_eq!(
            table_columns(&page),
            ["id", "total", "zz_extra"].map(String::from)
        );
    }

    #[test]
    fn record_entries_annotate_forward_and_reverse_links() {
        let mut tables = TableMap::new();
        tables.insert(
            "owner".to_string(),
            schema("app", "owner", "id", &["id", "name"]),
        );
        tables.insert(
            "dog".to_string(),
            schema("app", "dog", "id", &["id", "ownerId", "name"]),
        );

        let mut dog = Map::new();
        dog.insert("id".to_string(), json!(1));
        dog.insert("ownerId".to_string(), json!(7));
        let entries = record_entries(&dog, "dog", Some(&tables));
        let forward = entries
            .iter()
            .find_map(|entry| match entry {
                RecordEntry::Attribute {
                    name,
                    link: Some(link),
                } if name == "ownerId" => Some(link),
                _ => None,
            })
            .expect("ownerId should link to the owner table");
        assert_eq!(forward.target_table, "owner");
        assert_eq!(forward.direction, RelationshipDirection::Forward);

        let mut owner = Map::new();
        owner.insert("id".to_string(), json!(7));
        owner.insert("name".to_string(), json!("ada"));
        let entries = record_entries(&owner, "owner", Some(&tables));
        let reverse: Vec<_> = entries
            .iter()
            .filter(|entry| matches!(entry, RecordEntry::ReverseLink(_)))
            .collect();
        assert_eq!(reverse.len(), 1);

        let plain = record_entries(&owner, "owner", None);
        assert!(plain
            .iter()
            .all(|entry| matches!(entry, RecordEntry::Attribute { link: None, .. })));
    }

    #[test]
    fn follow_selected_column_keeps_selection_visible() {
        let widths = [10, 10, 10, 10];

        let start = follow_selected_column(0, 2, &widths, 24);
        let span = visible_column_span(&widths, start, 24);
        assert!(span.start <= 2 && 2 < span.end);

        assert_eq!(follow_selected_column(3, 1, &widths, 24), 1);
    }

    #[test]
    fn selection_steps_stay_in_bounds() {
        assert_eq!(step_selection(0, 3, DirectionKey::Down), 1);
        assert_eq!(step_selection(2, 3, DirectionKey::Down), 2);
        assert_eq!(step_selection(0, 3, DirectionKey::Up), 0);
        assert_eq!(step_selection(5, 0, DirectionKey::Down), 0);
    }

    #[test]
    fn pad_cell_truncates_and_pads() {
        assert_eq!(pad_cell("abcdef", 4), "abcd");
        assert_eq!(pad_cell("ab", 4), "ab  ");
    }

    #[test]
    fn attempts_render_with_outcome_and_elapsed() {
        let attempt = OperationAttempt {
            operation: "describe_all".to_string(),
            elapsed: Duration::from_millis(12),
            succeeded: true,
        };
        assert_eq!(render_attempt(&attempt), "describe_all 12ms ok");
    }

    #[test]
    fn export_writes_the_visible_page_to_disk() {
        let temp = TempDir::new().expect("temp dir should be created");
        let mut row = Map::new();
        row.insert("id".to_string(), json!(1));
        row.insert("name".to_string(), json!("alpha"));
        let columns = vec!["id".to_string(), "name".to_string()];

        let path = export_page(
            temp.path(),
            "retail",
            "orders",
            ExportFormat::Csv,
            &columns,
            &[row],
        )
        .expect("export should succeed");

        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        assert!(name.starts_with("retail.orders-"));
        assert!(name.ends_with(".csv"));

        let contents = std::fs::read_to_string(&path).expect("export file should be readable");
        assert!(contents.starts_with("id,name"));
        assert!(contents.contains("1,alpha"));
    }

    #[test]
    fn screen_labels_name_each_screen() {
        assert_eq!(screen_label(&Screen::Connect), "connect");
        assert_eq!(screen_label(&Screen::Dashboard), "databases");
        assert_eq!(
            screen_label(&Screen::Database {
                database: "app".to_string()
            }),
            "app"
        );
        assert_eq!(screen_label(&Screen::System), "system");
    }
}
