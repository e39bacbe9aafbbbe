// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use assetdesk_app::{
    AppCommand, AppEvent, AppState, AssetField, AssetForm, AssetNumber, AssetRecord, AssetStatus,
    AssetStore, CategoryGroup, CommitOutcome, FieldKind, FilterField, FormField, FormKind,
    LoadStatus, Notification, NotificationLog, Notifier, RefreshOutcome, Session, Severity,
    StoreError, TableController, View,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::warn;

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const EDIT_CURSOR: &str = "▏";
const PENDING_MARK: &str = "*";

pub const LIST_COLUMNS: [FormField; 11] = [
    FormField::AssetNumber,
    FormField::Field(AssetField::Name),
    FormField::Field(AssetField::Category),
    FormField::Field(AssetField::Brand),
    FormField::Field(AssetField::Model),
    FormField::Field(AssetField::SerialNumber),
    FormField::Field(AssetField::IpAddress),
    FormField::Field(AssetField::EmployeeName),
    FormField::Field(AssetField::Division),
    FormField::Field(AssetField::Floor),
    FormField::Field(AssetField::Status),
];

/// What the event loop needs from the rest of the program: the table it
/// drives and a way to start and end sessions against the same backend.
pub trait AppRuntime {
    type Store: AssetStore;

    fn table(&self) -> &TableController<Self::Store>;
    fn table_mut(&mut self) -> &mut TableController<Self::Store>;
    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError>;
    fn logout(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LoginFocus {
    #[default]
    Username,
    Password,
}

impl LoginFocus {
    const fn toggle(self) -> Self {
        match self {
            Self::Username => Self::Password,
            Self::Password => Self::Username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct LoginUiState {
    username: String,
    password: String,
    focus: LoginFocus,
    error: Option<String>,
}

impl LoginUiState {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginFocus::Username => &mut self.username,
            LoginFocus::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InlineEditUi {
    asset_number: AssetNumber,
    field: AssetField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterEntry {
    Field(FilterField),
    Group,
    Department,
}

const FILTER_ENTRIES: [FilterEntry; 6] = [
    FilterEntry::Field(FilterField::Division),
    FilterEntry::Field(FilterField::Category),
    FilterEntry::Group,
    FilterEntry::Field(FilterField::Brand),
    FilterEntry::Field(FilterField::Floor),
    FilterEntry::Department,
];

impl FilterEntry {
    const fn label(self) -> &'static str {
        match self {
            Self::Field(field) => field.label(),
            Self::Group => "Category Group",
            Self::Department => "Department",
        }
    }

    fn options(self) -> Vec<&'static str> {
        match self {
            Self::Field(field) => field
                .asset_field()
                .options()
                .map(<[&str]>::to_vec)
                .unwrap_or_default(),
            Self::Group => CategoryGroup::ALL.map(CategoryGroup::label).to_vec(),
            Self::Department => Vec::new(),
        }
    }

    fn current<S: AssetStore>(self, table: &TableController<S>) -> Option<&str> {
        match self {
            Self::Field(field) => table.filters().constraint(field),
            Self::Group => table.filters().group().map(CategoryGroup::label),
            Self::Department => table.filters().department(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct FilterPickerUiState {
    visible: bool,
    entry_index: usize,
    input: String,
}

impl FilterPickerUiState {
    fn entry(&self) -> FilterEntry {
        FILTER_ENTRIES[self.entry_index % FILTER_ENTRIES.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormUiState {
    form: AssetForm,
    field_index: usize,
    error: Option<String>,
}

impl FormUiState {
    fn new(form: AssetForm) -> Self {
        Self {
            form,
            field_index: 0,
            error: None,
        }
    }

    fn selected_field(&self) -> Option<FormField> {
        self.form.fields().get(self.field_index).copied()
    }
}

#[derive(Debug, Default)]
struct ViewData {
    login: LoginUiState,
    selected_row: usize,
    selected_col: usize,
    inline_edit: Option<InlineEditUi>,
    filter_picker: FilterPickerUiState,
    form: Option<FormUiState>,
    detail: Option<AssetRecord>,
    confirm_delete: Option<AssetNumber>,
    help_visible: bool,
    notices: NotificationLog,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    if state.view == View::List {
        refresh_list(state, runtime, &mut view_data, &internal_tx);
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) =
            terminal.draw(|frame| render(frame, state, runtime.table(), &view_data))
        {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
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

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn publish_notices(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if let Some(notice) = view_data.notices.drain().pop() {
        emit_status(state, view_data, internal_tx, notice.line());
    }
}

fn settle<R: AppRuntime, T>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    result: &Result<T, StoreError>,
) {
    publish_notices(state, view_data, internal_tx);
    if let Err(StoreError::Unauthorized(reason)) = result {
        warn!(%reason, "session rejected by asset service");
        expire_session(state, runtime, view_data, internal_tx);
    }
}

fn expire_session<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    runtime.logout();
    reset_view_data(view_data);
    state.dispatch(AppCommand::SignOut);
    emit_status(
        state,
        view_data,
        internal_tx,
        "session expired -- sign in again",
    );
}

fn reset_view_data(view_data: &mut ViewData) {
    let status_token = view_data.status_token;
    *view_data = ViewData {
        status_token,
        ..ViewData::default()
    };
}

fn outcome_result(outcome: RefreshOutcome) -> Result<(), StoreError> {
    match outcome {
        RefreshOutcome::Applied | RefreshOutcome::Stale => Ok(()),
        RefreshOutcome::Failed(error) => Err(error),
    }
}

fn refresh_list<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let outcome = runtime.table_mut().refresh(&mut view_data.notices);
    after_fetch(state, runtime, view_data, internal_tx, outcome);
}

/// Returns whether the fetch went through.
fn after_fetch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    outcome: RefreshOutcome,
) -> bool {
    clamp_table_cursor(runtime.table().rows().len(), view_data);
    let result = outcome_result(outcome);
    settle(state, runtime, view_data, internal_tx, &result);
    result.is_ok()
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::RedirectedToLogin))
    {
        emit_status(state, view_data, internal_tx, "sign in first");
    }

    let Some(view) = events.iter().rev().find_map(|event| match event {
        AppEvent::ViewChanged(view) => Some(view.clone()),
        _ => None,
    }) else {
        return;
    };

    view_data.inline_edit = None;
    view_data.confirm_delete = None;
    view_data.filter_picker = FilterPickerUiState::default();
    match view {
        View::Login => reset_view_data(view_data),
        View::List => {
            view_data.form = None;
            view_data.detail = None;
            refresh_list(state, runtime, view_data, internal_tx);
        }
        View::Detail(asset_number) => {
            view_data.form = None;
            load_detail(state, runtime, view_data, internal_tx, &asset_number);
        }
        View::Add => {
            view_data.form = Some(FormUiState::new(AssetForm::blank()));
        }
        View::Edit(asset_number) => {
            let result = runtime.table_mut().get_asset(&asset_number);
            match &result {
                Ok(record) => view_data.form = Some(FormUiState::new(AssetForm::from_record(record))),
                Err(error) => view_data.notices.notify(Notification::failure(error)),
            }
            settle(state, runtime, view_data, internal_tx, &result);
            if result.is_err() && state.is_signed_in() {
                dispatch_and_refresh(state, runtime, view_data, AppCommand::Back, internal_tx);
            }
        }
    }
}

fn load_detail<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    asset_number: &AssetNumber,
) {
    let result = runtime.table_mut().get_asset(asset_number);
    match &result {
        Ok(record) => view_data.detail = Some(record.clone()),
        Err(error) => {
            view_data.detail = None;
            view_data.notices.notify(Notification::failure(error));
        }
    }
    settle(state, runtime, view_data, internal_tx, &result);
    if result.is_err() && state.is_signed_in() {
        dispatch_and_refresh(state, runtime, view_data, AppCommand::ShowList, internal_tx);
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    match state.view.clone() {
        View::Login => handle_login_key(state, runtime, view_data, internal_tx, key),
        View::List => handle_list_key(state, runtime, view_data, internal_tx, key),
        View::Detail(asset_number) => {
            handle_detail_key(state, runtime, view_data, internal_tx, &asset_number, key);
        }
        View::Add | View::Edit(_) => handle_form_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_login_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let login = &mut view_data.login;
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            login.focus = login.focus.toggle();
        }
        KeyCode::Backspace => {
            login.focused_mut().pop();
        }
        KeyCode::Enter => submit_login(state, runtime, view_data, internal_tx),
        KeyCode::Char(value) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            login.focused_mut().push(value);
        }
        _ => {}
    }
}

fn submit_login<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let username = view_data.login.username.clone();
    let password = view_data.login.password.clone();
    match runtime.login(&username, &password) {
        Ok(session) => {
            view_data.login = LoginUiState::default();
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::SignedIn(session),
                internal_tx,
            );
        }
        Err(error) => {
            view_data.login.password.clear();
            view_data.login.focus = LoginFocus::Password;
            view_data.login.error = Some(error.to_string());
            emit_status(state, view_data, internal_tx, error.to_string());
        }
    }
}

fn handle_list_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if view_data.confirm_delete.is_some() {
        handle_delete_confirm_key(state, runtime, view_data, internal_tx, key);
        return;
    }
    if view_data.filter_picker.visible {
        handle_filter_picker_key(state, runtime, view_data, internal_tx, key);
        return;
    }
    if view_data.inline_edit.is_some() {
        handle_inline_edit_key(state, runtime, view_data, internal_tx, key);
        return;
    }

    let row_count = runtime.table().rows().len();
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => move_row(view_data, row_count, 1),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => move_row(view_data, row_count, -1),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => move_col(view_data, -1),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => move_col(view_data, 1),
        (KeyCode::Char('g'), _) => view_data.selected_row = 0,
        (KeyCode::Char('G'), _) => view_data.selected_row = row_count.saturating_sub(1),
        (KeyCode::Char(']'), _) | (KeyCode::Char('n'), KeyModifiers::NONE) => {
            match runtime.table_mut().next_page(&mut view_data.notices) {
                Some(outcome) => {
                    view_data.selected_row = 0;
                    after_fetch(state, runtime, view_data, internal_tx, outcome);
                }
                None => emit_status(state, view_data, internal_tx, "already on the last page"),
            }
        }
        (KeyCode::Char('['), _) | (KeyCode::Char('p'), KeyModifiers::NONE) => {
            match runtime.table_mut().prev_page(&mut view_data.notices) {
                Some(outcome) => {
                    view_data.selected_row = 0;
                    after_fetch(state, runtime, view_data, internal_tx, outcome);
                }
                None => emit_status(state, view_data, internal_tx, "already on the first page"),
            }
        }
        (KeyCode::Char('z'), _) => {
            let size = runtime.table().paging().next_page_size();
            match runtime
                .table_mut()
                .set_page_size(size, &mut view_data.notices)
            {
                Ok(outcome) => {
                    view_data.selected_row = 0;
                    if after_fetch(state, runtime, view_data, internal_tx, outcome) {
                        emit_status(state, view_data, internal_tx, format!("{size} per page"));
                    }
                }
                Err(error) => emit_status(state, view_data, internal_tx, error.to_string()),
            }
        }
        (KeyCode::Char('r'), _) => refresh_list(state, runtime, view_data, internal_tx),
        (KeyCode::Char('f'), _) => open_filter_picker(runtime.table(), view_data),
        (KeyCode::Char('F'), _) => {
            let outcome = runtime.table_mut().reset_filters(&mut view_data.notices);
            view_data.selected_row = 0;
            if after_fetch(state, runtime, view_data, internal_tx, outcome) {
                emit_status(state, view_data, internal_tx, "filters cleared");
            }
        }
        (KeyCode::Char('e'), _) => begin_inline_edit(state, runtime, view_data, internal_tx),
        (KeyCode::Enter, _) => {
            if let Some(asset_number) = selected_asset_number(runtime.table(), view_data) {
                dispatch_and_refresh(
                    state,
                    runtime,
                    view_data,
                    AppCommand::OpenDetail(asset_number),
                    internal_tx,
                );
            }
        }
        (KeyCode::Char('a'), _) => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::OpenAdd, internal_tx);
        }
        (KeyCode::Char('m'), _) => {
            if let Some(asset_number) = selected_asset_number(runtime.table(), view_data) {
                dispatch_and_refresh(
                    state,
                    runtime,
                    view_data,
                    AppCommand::OpenEdit(asset_number),
                    internal_tx,
                );
            }
        }
        (KeyCode::Char('D'), _) => {
            if let Some(asset_number) = selected_asset_number(runtime.table(), view_data) {
                view_data.confirm_delete = Some(asset_number);
            }
        }
        (KeyCode::Char('L'), _) => sign_out(state, runtime, view_data, internal_tx),
        (KeyCode::Char('?'), _) => view_data.help_visible = true,
        _ => {}
    }
}

fn handle_detail_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    asset_number: &AssetNumber,
    key: KeyEvent,
) {
    if view_data.confirm_delete.is_some() {
        handle_delete_confirm_key(state, runtime, view_data, internal_tx, key);
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('b') => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::Back, internal_tx);
        }
        KeyCode::Char('m') => dispatch_and_refresh(
            state,
            runtime,
            view_data,
            AppCommand::OpenEdit(asset_number.clone()),
            internal_tx,
        ),
        KeyCode::Char('D') => view_data.confirm_delete = Some(asset_number.clone()),
        KeyCode::Char('r') => load_detail(state, runtime, view_data, internal_tx, asset_number),
        KeyCode::Char('L') => sign_out(state, runtime, view_data, internal_tx),
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
}

fn handle_delete_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(asset_number) = view_data.confirm_delete.take() else {
        return;
    };
    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        emit_status(state, view_data, internal_tx, "delete canceled");
        return;
    }

    let result = runtime
        .table_mut()
        .delete_asset(&asset_number, &mut view_data.notices);
    let deleted = result.is_ok();
    let result = result.and_then(outcome_result);
    clamp_table_cursor(runtime.table().rows().len(), view_data);
    settle(state, runtime, view_data, internal_tx, &result);
    if deleted && matches!(state.view, View::Detail(_)) {
        dispatch_and_refresh(state, runtime, view_data, AppCommand::ShowList, internal_tx);
    }
}

fn sign_out<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    runtime.logout();
    dispatch_and_refresh(state, runtime, view_data, AppCommand::SignOut, internal_tx);
}

fn selected_asset_number<S: AssetStore>(
    table: &TableController<S>,
    view_data: &ViewData,
) -> Option<AssetNumber> {
    table
        .rows()
        .get(view_data.selected_row)
        .map(|row| row.asset_number.clone())
}

fn move_row(view_data: &mut ViewData, row_count: usize, delta: isize) {
    if row_count == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = view_data.selected_row.saturating_add_signed(delta);
    view_data.selected_row = next.min(row_count - 1);
}

fn move_col(view_data: &mut ViewData, delta: isize) {
    let next = view_data.selected_col.saturating_add_signed(delta);
    view_data.selected_col = next.min(LIST_COLUMNS.len() - 1);
}

fn clamp_table_cursor(row_count: usize, view_data: &mut ViewData) {
    view_data.selected_row = view_data
        .selected_row
        .min(row_count.saturating_sub(1));
}

fn begin_inline_edit<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(asset_number) = selected_asset_number(runtime.table(), view_data) else {
        emit_status(state, view_data, internal_tx, "nothing to edit");
        return;
    };
    let FormField::Field(field) = LIST_COLUMNS[view_data.selected_col] else {
        emit_status(
            state,
            view_data,
            internal_tx,
            "asset number cannot be changed after creation",
        );
        return;
    };

    if runtime.table_mut().begin_edit(&asset_number, field) {
        view_data.inline_edit = Some(InlineEditUi {
            asset_number,
            field,
        });
    }
}

fn handle_inline_edit_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(edit) = view_data.inline_edit.clone() else {
        return;
    };
    let table = runtime.table_mut();
    let draft = table
        .draft(&edit.asset_number, edit.field)
        .unwrap_or_default()
        .to_owned();

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            table.cancel_edit(&edit.asset_number, edit.field);
            view_data.inline_edit = None;
            emit_status(state, view_data, internal_tx, "edit canceled");
        }
        (KeyCode::Enter, _) | (KeyCode::Tab, _) => {
            commit_inline_edit(state, runtime, view_data, internal_tx, &edit);
        }
        (KeyCode::Backspace, _) => {
            let mut next = draft;
            next.pop();
            table.update_draft(&edit.asset_number, edit.field, &next);
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            table.update_draft(&edit.asset_number, edit.field, "");
        }
        (KeyCode::Char(value), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            let mut next = draft;
            next.push(value);
            table.update_draft(&edit.asset_number, edit.field, &next);
        }
        _ => {}
    }
}

fn commit_inline_edit<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    edit: &InlineEditUi,
) {
    let result =
        runtime
            .table_mut()
            .commit_edit(&edit.asset_number, edit.field, &mut view_data.notices);
    if matches!(
        result,
        Ok(CommitOutcome::Committed { .. } | CommitOutcome::NoDraft)
    ) {
        view_data.inline_edit = None;
    }
    settle(state, runtime, view_data, internal_tx, &result);
}

fn open_filter_picker<S: AssetStore>(table: &TableController<S>, view_data: &mut ViewData) {
    let entry_index = match LIST_COLUMNS[view_data.selected_col] {
        FormField::Field(field) => FILTER_ENTRIES
            .iter()
            .position(|entry| {
                matches!(entry, FilterEntry::Field(filter) if filter.asset_field() == field)
            })
            .unwrap_or(0),
        FormField::AssetNumber => 0,
    };
    view_data.filter_picker = FilterPickerUiState {
        visible: true,
        entry_index,
        input: FILTER_ENTRIES[entry_index]
            .current(table)
            .unwrap_or_default()
            .to_owned(),
    };
}

fn cycle_option(options: &[&str], current: &str, forward: bool) -> String {
    let count = options.len() + 1;
    let index = options
        .iter()
        .position(|option| option.eq_ignore_ascii_case(current.trim()))
        .map_or(0, |position| position + 1);
    let next = if forward {
        (index + 1) % count
    } else {
        (index + count - 1) % count
    };
    next.checked_sub(1)
        .and_then(|position| options.get(position))
        .map(|option| (*option).to_owned())
        .unwrap_or_default()
}

fn handle_filter_picker_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let entry = view_data.filter_picker.entry();
    let options = entry.options();
    match key.code {
        KeyCode::Esc => view_data.filter_picker = FilterPickerUiState::default(),
        KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
            let count = FILTER_ENTRIES.len();
            let picker = &mut view_data.filter_picker;
            picker.entry_index = if matches!(key.code, KeyCode::Up | KeyCode::BackTab) {
                (picker.entry_index + count - 1) % count
            } else {
                (picker.entry_index + 1) % count
            };
            picker.input = picker
                .entry()
                .current(runtime.table())
                .unwrap_or_default()
                .to_owned();
        }
        KeyCode::Char(' ') | KeyCode::Right | KeyCode::Left if !options.is_empty() => {
            let picker = &mut view_data.filter_picker;
            picker.input = cycle_option(&options, &picker.input, key.code != KeyCode::Left);
        }
        KeyCode::Backspace if options.is_empty() => {
            view_data.filter_picker.input.pop();
        }
        KeyCode::Enter => apply_filter_entry(state, runtime, view_data, internal_tx, entry),
        KeyCode::Char(value)
            if options.is_empty() && !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            view_data.filter_picker.input.push(value);
        }
        _ => {}
    }
}

fn apply_filter_entry<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    entry: FilterEntry,
) {
    let value = std::mem::take(&mut view_data.filter_picker.input);
    view_data.filter_picker = FilterPickerUiState::default();
    let constraint = Some(value.trim()).filter(|value| !value.is_empty());
    let table = runtime.table_mut();
    let notices = &mut view_data.notices;
    let outcome = match entry {
        FilterEntry::Field(field) => table.set_filter(field, constraint, notices),
        FilterEntry::Group => table.set_group(constraint.and_then(CategoryGroup::parse), notices),
        FilterEntry::Department => table.set_department(constraint, notices),
    };
    view_data.selected_row = 0;
    if after_fetch(state, runtime, view_data, internal_tx, outcome) {
        let message = match constraint {
            Some(value) => format!("{} = {value}", entry.label()),
            None => format!("{} filter cleared", entry.label()),
        };
        emit_status(state, view_data, internal_tx, message);
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(ui) = view_data.form.as_mut() else {
        return;
    };
    let field_count = ui.form.fields().len();

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.form = None;
            dispatch_and_refresh(state, runtime, view_data, AppCommand::Back, internal_tx);
        }
        (KeyCode::Tab, _) | (KeyCode::Down, _) => {
            ui.field_index = (ui.field_index + 1) % field_count;
        }
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
            ui.field_index = (ui.field_index + field_count - 1) % field_count;
        }
        (KeyCode::Enter, _) => submit_form(state, runtime, view_data, internal_tx),
        (KeyCode::Char('s'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            submit_form(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Backspace, _) => {
            let Some(field) = ui.selected_field() else {
                return;
            };
            let mut value = ui.form.value(field).to_owned();
            value.pop();
            if let Err(error) = ui.form.set_value(field, &value) {
                emit_status(state, view_data, internal_tx, error.to_string());
            }
        }
        (KeyCode::Char(' '), _) if ui.selected_field().is_some_and(is_choice_field) => {
            if let Some(field) = ui.selected_field() {
                let next = next_choice(field, ui.form.value(field));
                if let Err(error) = ui.form.set_value(field, &next) {
                    emit_status(state, view_data, internal_tx, error.to_string());
                }
            }
        }
        (KeyCode::Char(value), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            let Some(field) = ui.selected_field() else {
                return;
            };
            let mut text = ui.form.value(field).to_owned();
            text.push(value);
            if let Err(error) = ui.form.set_value(field, &text) {
                emit_status(state, view_data, internal_tx, error.to_string());
            }
        }
        _ => {}
    }
}

fn is_choice_field(field: FormField) -> bool {
    matches!(
        field,
        FormField::Field(field)
            if matches!(field.kind(), FieldKind::Status | FieldKind::Flag)
                || field.options().is_some()
    )
}

fn next_choice(field: FormField, current: &str) -> String {
    match field {
        FormField::Field(field) if field.kind() == FieldKind::Status => AssetStatus::parse(current)
            .unwrap_or_default()
            .next()
            .label()
            .to_owned(),
        FormField::Field(field) if field.kind() == FieldKind::Flag => {
            if current.eq_ignore_ascii_case("yes") {
                "No".to_owned()
            } else {
                "Yes".to_owned()
            }
        }
        FormField::Field(field) => match field.options() {
            Some(options) => {
                let next = options
                    .iter()
                    .position(|option| option.eq_ignore_ascii_case(current.trim()))
                    .map_or(0, |position| (position + 1) % options.len());
                options
                    .get(next)
                    .map_or_else(|| current.to_owned(), |option| (*option).to_owned())
            }
            None => current.to_owned(),
        },
        FormField::AssetNumber => current.to_owned(),
    }
}

fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(ui) = view_data.form.clone() else {
        return;
    };

    match (ui.form.kind(), state.view.clone()) {
        (FormKind::Add, _) => {
            let result = ui.form.to_record().and_then(|record| {
                runtime
                    .table_mut()
                    .create_asset(&record, &mut view_data.notices)
                    .map(|(_, refreshed)| Some(refreshed))
            });
            finish_form(state, runtime, view_data, internal_tx, result, AppCommand::ShowList);
        }
        (FormKind::Edit, View::Edit(asset_number)) => {
            let result = ui.form.to_update().and_then(|update| {
                runtime
                    .table_mut()
                    .update_asset(&asset_number, &update, &mut view_data.notices)
                    .map(|_| None)
            });
            finish_form(
                state,
                runtime,
                view_data,
                internal_tx,
                result,
                AppCommand::OpenDetail(asset_number),
            );
        }
        (FormKind::Edit, _) => {}
    }
}

fn finish_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    result: Result<Option<RefreshOutcome>, StoreError>,
    next: AppCommand,
) {
    match &result {
        Ok(refreshed) => {
            if let Some(RefreshOutcome::Failed(error @ StoreError::Unauthorized(_))) = refreshed {
                view_data.form = None;
                settle(state, runtime, view_data, internal_tx, &Err::<(), _>(error.clone()));
                return;
            }
            let saved = view_data
                .notices
                .entries()
                .iter()
                .rev()
                .find(|notice| notice.severity == Severity::Success)
                .cloned();
            view_data.notices.drain();
            view_data.form = None;
            dispatch_and_refresh(state, runtime, view_data, next, internal_tx);
            if let Some(notice) = saved
                && state.is_signed_in()
            {
                emit_status(state, view_data, internal_tx, notice.line());
            }
        }
        Err(error) => {
            if matches!(error, StoreError::Validation(_)) && view_data.notices.last().is_none() {
                view_data.notices.notify(Notification::failure(error));
            }
            if let Some(ui) = view_data.form.as_mut() {
                ui.error = Some(error.to_string());
            }
            settle(state, runtime, view_data, internal_tx, &result);
        }
    }
}

fn render<S: AssetStore>(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    table: &TableController<S>,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().title("assetdesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    frame.render_widget(header, layout[0]);

    match &state.view {
        View::Login => {
            let area = centered_rect(50, 40, layout[1]);
            let login = Paragraph::new(login_text(&view_data.login))
                .block(Block::default().title("sign in").borders(Borders::ALL));
            frame.render_widget(login, area);
        }
        View::List => render_asset_table(frame, layout[1], table, view_data),
        View::Detail(_) => {
            let body = view_data
                .detail
                .as_ref()
                .map(detail_text)
                .unwrap_or_default();
            let detail = Paragraph::new(body).block(
                Block::default()
                    .title(state.view.title())
                    .borders(Borders::ALL),
            );
            frame.render_widget(detail, layout[1]);
        }
        View::Add | View::Edit(_) => {
            let body = view_data.form.as_ref().map(form_text).unwrap_or_default();
            let form = Paragraph::new(body).block(
                Block::default()
                    .title(state.view.title())
                    .borders(Borders::ALL),
            );
            frame.render_widget(form, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if view_data.filter_picker.visible {
        let area = centered_rect(50, 40, frame.area());
        frame.render_widget(Clear, area);
        let picker = Paragraph::new(filter_picker_text(&view_data.filter_picker, table))
            .block(Block::default().title("filter").borders(Borders::ALL));
        frame.render_widget(picker, area);
    }

    if let Some(asset_number) = &view_data.confirm_delete {
        let area = centered_rect(40, 20, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(format!("delete {asset_number}? y to confirm, any key to keep"))
            .block(
                Block::default()
                    .title("delete")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(confirm, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_asset_table<S: AssetStore>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    table: &TableController<S>,
    view_data: &ViewData,
) {
    let widths = vec![Constraint::Min(8); LIST_COLUMNS.len()];
    let header = Row::new(LIST_COLUMNS.iter().map(|column| {
        Cell::from(column.label()).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = table.rows().iter().enumerate().map(|(row_index, row)| {
        let selected_row = row_index == view_data.selected_row;
        let cells = LIST_COLUMNS
            .iter()
            .enumerate()
            .map(|(column_index, column)| {
                let text = cell_text(row, *column, table, view_data.inline_edit.as_ref());
                let mut style = Style::default();
                if selected_row {
                    style = style.bg(Color::DarkGray);
                }
                if selected_row && column_index == view_data.selected_col {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                Cell::from(text).style(style)
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(table))
                .borders(Borders::ALL),
        );
    frame.render_widget(widget, area);
}

fn cell_text<S: AssetStore>(
    row: &AssetRecord,
    column: FormField,
    table: &TableController<S>,
    active: Option<&InlineEditUi>,
) -> String {
    let FormField::Field(field) = column else {
        return row.asset_number.to_string();
    };
    match table.draft(&row.asset_number, field) {
        Some(draft)
            if active
                .is_some_and(|edit| edit.asset_number == row.asset_number && edit.field == field) =>
        {
            format!("{draft}{EDIT_CURSOR}")
        }
        Some(draft) => format!("{draft}{PENDING_MARK}"),
        None => row.display(field),
    }
}

fn table_title<S: AssetStore>(table: &TableController<S>) -> String {
    let paging = table.paging();
    let mut title = format!(
        "assets | page {}/{} | {} total | {} per page",
        paging.page() + 1,
        table.page_count(),
        table.total(),
        paging.page_size()
    );

    let filters = FilterField::ALL
        .into_iter()
        .filter_map(|field| {
            table
                .filters()
                .constraint(field)
                .map(|value| format!("{}={value}", field.query_key()))
        })
        .collect::<Vec<_>>();
    if !filters.is_empty() {
        title.push_str(" | ");
        title.push_str(&filters.join(" "));
    }
    if let Some(group) = table.filters().group() {
        title.push_str(&format!(" | {}", group.label()));
    }
    if let Some(department) = table.filters().department() {
        title.push_str(&format!(" | dept {department}"));
    }
    match table.status() {
        LoadStatus::Idle => {}
        LoadStatus::Loading => title.push_str(" | loading"),
        LoadStatus::Error(message) => title.push_str(&format!(" | load failed: {message}")),
    }
    title
}

fn header_text(state: &AppState) -> String {
    match &state.session {
        Some(session) => format!("{} | signed in as {}", state.view.title(), session.username),
        None => state.view.title().to_owned(),
    }
}

fn login_text(login: &LoginUiState) -> String {
    let marker = |focus: LoginFocus| if login.focus == focus { ">" } else { " " };
    let mut lines = vec![
        format!("{} username: {}", marker(LoginFocus::Username), login.username),
        format!(
            "{} password: {}",
            marker(LoginFocus::Password),
            "*".repeat(login.password.chars().count())
        ),
    ];
    if let Some(error) = &login.error {
        lines.push(String::new());
        lines.push(error.clone());
    }
    lines.join("\n")
}

fn detail_text(record: &AssetRecord) -> String {
    let mut lines = vec![format!(
        "{}: {}",
        FormField::AssetNumber.label(),
        record.asset_number
    )];
    lines.extend(
        AssetField::ALL
            .into_iter()
            .map(|field| format!("{}: {}", field.label(), record.display(field))),
    );
    lines.join("\n")
}

fn form_text(ui: &FormUiState) -> String {
    let mut lines = ui
        .form
        .fields()
        .into_iter()
        .enumerate()
        .map(|(index, field)| {
            let marker = if index == ui.field_index { ">" } else { " " };
            let required = if AssetForm::is_required(field) { "*" } else { "" };
            let read_only = if ui.form.is_read_only(field) {
                " (read-only)"
            } else {
                ""
            };
            format!(
                "{marker} {}{required}{read_only}: {}",
                field.label(),
                ui.form.value(field)
            )
        })
        .collect::<Vec<_>>();
    if let Some(error) = &ui.error {
        lines.push(String::new());
        lines.push(error.clone());
    }
    lines.join("\n")
}

fn filter_picker_text<S: AssetStore>(
    picker: &FilterPickerUiState,
    table: &TableController<S>,
) -> String {
    let mut lines = FILTER_ENTRIES
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = if index == picker.entry_index { ">" } else { " " };
            let current = entry.current(table).unwrap_or("any");
            format!("{marker} {}: {current}", entry.label())
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    if picker.entry().options().is_empty() {
        lines.push(format!("value: {}{EDIT_CURSOR}", picker.input));
        lines.push("type value | enter apply (empty clears) | up/down entry | esc close".into());
    } else {
        let shown = if picker.input.is_empty() { "any" } else { &picker.input };
        lines.push(format!("value: < {shown} >"));
        lines.push("space/left/right cycle | enter apply | up/down entry | esc close".to_owned());
    }
    lines.join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let (mode, hints) = match &state.view {
        View::Login => ("LOGIN", "tab field | enter sign in | ctrl+q quit"),
        View::List if view_data.inline_edit.is_some() => (
            "EDIT",
            "enter/tab save | esc cancel | ctrl+u clear",
        ),
        View::List if view_data.filter_picker.visible => (
            "FILTER",
            "space cycle or type | up/down entry | enter apply | esc close",
        ),
        View::List => (
            "NAV",
            "j/k/h/l move | [/] page | z size | f/F filter | e edit | enter open | a/m/D | r | ? help | ctrl+q",
        ),
        View::Detail(_) => ("DETAIL", "esc back | m modify | D delete | r reload | ? help"),
        View::Add | View::Edit(_) => (
            "FORM",
            "tab/shift+tab field | space cycle choice | enter save | esc cancel",
        ),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help | L sign out\n\
list: j/k rows | h/l columns | g/G first/last | ]/n next page | [/p prev page | z page size\n\
list: f filter picker | F clear filters | r refresh | enter details | a add | m modify | D delete\n\
filter: up/down entry | space/left/right cycle option | type department | enter apply | esc close\n\
inline edit: e edit cell | type to change | enter/tab save | esc cancel | ctrl+u clear\n\
detail: esc back | m modify | D delete | r reload\n\
form: tab/shift+tab field | space cycle listed choices | enter or ctrl+s save | esc cancel"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, LIST_COLUMNS, ViewData, detail_text, form_text,
        handle_key_event, help_overlay_text, process_internal_events, status_text, table_title,
    };
    use assetdesk_app::{
        AppState, AssetField, AssetForm, AssetNumber, AssetRecord, Authenticator, FilterState,
        FormField, LocalAuthenticator, PaginationState, Session, StoreError, TableController,
        View,
    };
    use assetdesk_testkit::{AssetFaker, MemoryStore, StoreOp, sample_assets};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::mpsc;

    struct TestRuntime {
        table: TableController<MemoryStore>,
        auth: LocalAuthenticator,
        logouts: usize,
    }

    impl TestRuntime {
        fn with_records(records: Vec<AssetRecord>) -> Self {
            Self {
                table: TableController::new(
                    MemoryStore::new(records),
                    FilterState::default(),
                    PaginationState::default(),
                ),
                auth: LocalAuthenticator,
                logouts: 0,
            }
        }
    }

    impl AppRuntime for TestRuntime {
        type Store = MemoryStore;

        fn table(&self) -> &TableController<MemoryStore> {
            &self.table
        }

        fn table_mut(&mut self) -> &mut TableController<MemoryStore> {
            &mut self.table
        }

        fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
            self.auth.login(username, password)
        }

        fn logout(&mut self) {
            self.logouts += 1;
        }
    }

    struct Harness {
        state: AppState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: mpsc::Sender<InternalEvent>,
        rx: mpsc::Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(records: Vec<AssetRecord>) -> Self {
            let (tx, rx) = mpsc::channel();
            Self {
                state: AppState::default(),
                runtime: TestRuntime::with_records(records),
                view_data: ViewData::default(),
                tx,
                rx,
            }
        }

        fn signed_in(records: Vec<AssetRecord>) -> Self {
            let mut harness = Self::new(records);
            harness.typed("admin");
            harness.press(KeyCode::Tab);
            harness.typed("secret");
            harness.press(KeyCode::Enter);
            harness
        }

        fn key(&mut self, key: KeyEvent) -> bool {
            let quit = handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                key,
            );
            process_internal_events(&mut self.state, &self.view_data, &self.rx);
            quit
        }

        fn press(&mut self, code: KeyCode) {
            self.key(KeyEvent::new(code, KeyModifiers::NONE));
        }

        fn ctrl(&mut self, value: char) -> bool {
            self.key(KeyEvent::new(KeyCode::Char(value), KeyModifiers::CONTROL))
        }

        fn typed(&mut self, text: &str) {
            for value in text.chars() {
                self.press(KeyCode::Char(value));
            }
        }

        fn status(&self) -> String {
            self.state.status_line.clone().unwrap_or_default()
        }

        fn visible_numbers(&self) -> Vec<String> {
            self.runtime
                .table
                .rows()
                .iter()
                .map(|row| row.asset_number.to_string())
                .collect()
        }

        fn select_column(&mut self, field: AssetField) {
            let index = LIST_COLUMNS
                .iter()
                .position(|column| *column == FormField::Field(field))
                .expect("column is listed");
            for _ in 0..index {
                self.press(KeyCode::Char('l'));
            }
        }
    }

    #[test]
    fn ctrl_q_quits_from_any_view() {
        let mut harness = Harness::new(sample_assets());
        assert!(harness.ctrl('q'));
    }

    #[test]
    fn login_with_credentials_loads_first_page() {
        let harness = Harness::signed_in(sample_assets());

        assert_eq!(harness.state.view, View::List);
        assert_eq!(harness.visible_numbers(), vec!["A-001", "A-002", "A-003", "A-004"]);
        assert!(harness.status().contains("signed in as admin"));
    }

    #[test]
    fn empty_password_keeps_login_view() {
        let mut harness = Harness::new(sample_assets());
        harness.typed("admin");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.view, View::Login);
        assert_eq!(harness.status(), "Please enter username and password");
        assert_eq!(harness.runtime.table.store().calls().list, 0);
    }

    #[test]
    fn page_keys_move_between_pages() {
        let mut harness = Harness::signed_in(AssetFaker::new(2).assets(12));

        harness.press(KeyCode::Char(']'));
        assert_eq!(harness.runtime.table.paging().page(), 1);
        harness.press(KeyCode::Char(']'));
        assert_eq!(harness.visible_numbers(), vec!["A-010", "A-011"]);

        harness.press(KeyCode::Char(']'));
        assert_eq!(harness.status(), "already on the last page");

        harness.press(KeyCode::Char('['));
        assert_eq!(harness.runtime.table.paging().page(), 1);

        harness.press(KeyCode::Char('z'));
        assert_eq!(harness.runtime.table.paging().page(), 0);
        assert_eq!(harness.runtime.table.paging().page_size(), 10);
        assert_eq!(harness.visible_numbers().len(), 10);
    }

    #[test]
    fn inline_edit_commits_one_field() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.select_column(AssetField::SerialNumber);

        harness.press(KeyCode::Char('e'));
        harness.ctrl('u');
        harness.typed("SN-099");
        harness.press(KeyCode::Enter);

        assert_eq!(
            harness.runtime.table.store().field_updates(),
            &[(
                AssetNumber::from("A-001"),
                AssetField::SerialNumber,
                "SN-099".to_owned()
            )]
        );
        assert_eq!(
            harness.runtime.table.rows()[0].serial_number.as_deref(),
            Some("SN-099")
        );
        assert!(harness.view_data.inline_edit.is_none());
        assert!(harness.status().starts_with("Asset Updated Successfully"));
    }

    #[test]
    fn escape_cancels_inline_edit_without_store_call() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.select_column(AssetField::Brand);

        harness.press(KeyCode::Char('e'));
        harness.typed("XYZ");
        harness.press(KeyCode::Esc);

        assert_eq!(harness.runtime.table.store().calls().update_field, 0);
        assert!(
            harness
                .runtime
                .table
                .draft(&AssetNumber::from("A-001"), AssetField::Brand)
                .is_none()
        );
        assert_eq!(harness.status(), "edit canceled");
    }

    #[test]
    fn rejected_inline_commit_stays_in_edit_mode() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.select_column(AssetField::SerialNumber);

        harness.press(KeyCode::Char('e'));
        harness.ctrl('u');
        harness.typed("SN-002");
        harness.press(KeyCode::Enter);

        assert!(harness.view_data.inline_edit.is_some());
        assert_eq!(
            harness
                .runtime
                .table
                .draft(&AssetNumber::from("A-001"), AssetField::SerialNumber),
            Some("SN-002")
        );
        assert!(harness.status().starts_with("Operation Failed"));
    }

    #[test]
    fn asset_number_column_is_not_editable() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.press(KeyCode::Char('e'));

        assert!(harness.view_data.inline_edit.is_none());
        assert!(harness.status().contains("cannot be changed"));
    }

    #[test]
    fn filter_picker_applies_and_clears_constraint() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.select_column(AssetField::Division);

        // Administration, IT, Engineering.
        harness.press(KeyCode::Char('f'));
        harness.typed("   ");
        harness.press(KeyCode::Enter);
        assert_eq!(harness.visible_numbers(), vec!["A-003"]);
        assert_eq!(harness.status(), "Division = Engineering");

        harness.press(KeyCode::Char('F'));
        assert_eq!(harness.visible_numbers().len(), 4);
        assert_eq!(harness.runtime.table.paging().page(), 0);
    }

    #[test]
    fn filter_picker_ignores_typing_on_listed_entries() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.select_column(AssetField::Brand);

        harness.press(KeyCode::Char('f'));
        harness.typed("Toshiba");
        assert_eq!(harness.view_data.filter_picker.input, "");

        harness.press(KeyCode::Left);
        assert_eq!(harness.view_data.filter_picker.input, "APC");
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Right);
        assert_eq!(harness.view_data.filter_picker.input, "Dell");
        harness.press(KeyCode::Enter);
        assert_eq!(harness.visible_numbers(), vec!["A-003"]);
    }

    #[test]
    fn group_entry_cycles_through_every_group() {
        let mut records = sample_assets();
        for (number, category) in [("A-005", "UPS"), ("A-006", "Server")] {
            let mut record = AssetRecord::new(number);
            record.category = Some(category.to_owned());
            records.push(record);
        }
        let mut harness = Harness::signed_in(records);
        harness.press(KeyCode::Char(']'));
        assert_eq!(harness.runtime.table.paging().page(), 1);

        let expected: [(&str, &[&str]); 4] = [
            ("IT Equipment", &["A-001", "A-003"]),
            ("Server Equipment", &["A-006"]),
            ("Network Equipment", &["A-002", "A-004"]),
            ("Other", &["A-005"]),
        ];
        for (label, numbers) in expected {
            harness.press(KeyCode::Char('f'));
            harness.press(KeyCode::Down);
            harness.press(KeyCode::Down);
            harness.press(KeyCode::Char(' '));
            harness.press(KeyCode::Enter);

            assert_eq!(harness.visible_numbers(), numbers.to_vec(), "{label}");
            assert_eq!(harness.runtime.table.paging().page(), 0);
            assert_eq!(harness.status(), format!("Category Group = {label}"));
            assert!(table_title(&harness.runtime.table).contains(label));
        }

        harness.press(KeyCode::Char('f'));
        harness.press(KeyCode::Down);
        harness.press(KeyCode::Down);
        harness.press(KeyCode::Char(' '));
        harness.press(KeyCode::Enter);
        assert_eq!(harness.status(), "Category Group filter cleared");
        assert_eq!(harness.runtime.table.total(), 6);
    }

    #[test]
    fn department_entry_is_typed_and_clearable() {
        let mut harness = Harness::signed_in(sample_assets());

        harness.press(KeyCode::Char('f'));
        harness.press(KeyCode::Up);
        harness.typed("Operations");
        harness.press(KeyCode::Enter);
        assert_eq!(harness.visible_numbers(), vec!["A-004"]);
        assert_eq!(harness.status(), "Department = Operations");
        assert!(table_title(&harness.runtime.table).contains("dept Operations"));

        // Clearing user filters keeps the department.
        harness.press(KeyCode::Char('F'));
        assert_eq!(harness.visible_numbers(), vec!["A-004"]);

        harness.press(KeyCode::Char('f'));
        harness.press(KeyCode::Up);
        for _ in 0.."Operations".len() {
            harness.press(KeyCode::Backspace);
        }
        harness.press(KeyCode::Enter);
        assert_eq!(harness.status(), "Department filter cleared");
        assert_eq!(harness.visible_numbers().len(), 4);
    }

    #[test]
    fn space_cycles_listed_form_fields() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.press(KeyCode::Char('a'));
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Tab);

        harness.press(KeyCode::Char(' '));
        harness.press(KeyCode::Char(' '));
        let ui = harness.view_data.form.as_ref().expect("form open");
        assert_eq!(
            ui.form.value(FormField::Field(AssetField::Category)),
            "Laptop"
        );
    }

    #[test]
    fn unlisted_form_value_is_not_saved() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.press(KeyCode::Char('m'));
        for _ in 0..3 {
            harness.press(KeyCode::Tab);
        }
        harness.press(KeyCode::Backspace);
        harness.press(KeyCode::Backspace);
        harness.typed("Toshiba");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.view, View::Edit(AssetNumber::from("A-001")));
        assert!(harness.status().contains("Brand must be one of"));
        assert_eq!(harness.runtime.table.store().calls().update, 0);
    }

    #[test]
    fn add_form_reports_missing_required_fields() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.press(KeyCode::Char('a'));
        assert_eq!(harness.state.view, View::Add);

        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.view, View::Add);
        assert!(harness.status().contains("Please fill required fields"));
        assert_eq!(harness.runtime.table.store().calls().create, 0);

        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.view, View::List);
    }

    #[test]
    fn modify_form_saves_and_returns_to_detail() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.press(KeyCode::Char('m'));
        assert_eq!(harness.state.view, View::Edit(AssetNumber::from("A-001")));

        // Name follows the read-only asset number.
        harness.press(KeyCode::Tab);
        harness.typed("-B");
        harness.press(KeyCode::Enter);
        assert!(harness.status().contains("Emp. No"));

        for _ in 0..6 {
            harness.press(KeyCode::Tab);
        }
        harness.typed("E-100");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.view, View::Detail(AssetNumber::from("A-001")));
        let detail = harness.view_data.detail.clone().expect("detail loaded");
        assert_eq!(detail.name.as_deref(), Some("Printer-01-B"));
        assert!(harness.status().starts_with("Asset Updated Successfully"));
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut harness = Harness::signed_in(sample_assets());

        harness.press(KeyCode::Char('D'));
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.status(), "delete canceled");
        assert_eq!(harness.runtime.table.total(), 4);

        harness.press(KeyCode::Char('D'));
        harness.press(KeyCode::Char('y'));
        assert_eq!(harness.runtime.table.total(), 3);
        assert!(harness.status().starts_with("Asset Deleted"));
    }

    #[test]
    fn enter_opens_detail_and_escape_returns() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.view, View::Detail(AssetNumber::from("A-002")));
        let text = detail_text(harness.view_data.detail.as_ref().expect("detail"));
        assert!(text.contains("Brand: Cisco"));
        assert!(text.contains("Floor: —"));

        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.view, View::List);
    }

    #[test]
    fn unauthorized_refresh_signs_out() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.runtime.table.store_mut().fail_next(
            StoreOp::List,
            StoreError::Unauthorized("Token expired".to_owned()),
        );

        harness.press(KeyCode::Char('r'));

        assert_eq!(harness.state.view, View::Login);
        assert!(harness.state.session.is_none());
        assert_eq!(harness.runtime.logouts, 1);
        assert_eq!(harness.status(), "session expired -- sign in again");
    }

    #[test]
    fn add_followed_by_rejected_refresh_signs_out() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.press(KeyCode::Char('a'));
        let mut record = sample_assets()[0].clone();
        record.asset_number = AssetNumber::from("A-010");
        record.serial_number = Some("SN-010".to_owned());
        record.employee_number = Some("E-010".to_owned());
        let form = &mut harness.view_data.form.as_mut().expect("form open").form;
        form.set_value(FormField::AssetNumber, "A-010").expect("editable");
        for field in assetdesk_app::FORM_FIELDS {
            form.set_value(FormField::Field(field), &field.value_of(&record))
                .expect("editable");
        }
        harness.runtime.table.store_mut().fail_next(
            StoreOp::List,
            StoreError::Unauthorized("Token expired".to_owned()),
        );

        harness.press(KeyCode::Enter);

        assert_eq!(harness.runtime.table.store().records().len(), 5);
        assert_eq!(harness.state.view, View::Login);
        assert_eq!(harness.runtime.logouts, 1);
        assert_eq!(harness.status(), "session expired -- sign in again");
    }

    #[test]
    fn delete_followed_by_rejected_refresh_signs_out() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.runtime.table.store_mut().fail_next(
            StoreOp::List,
            StoreError::Unauthorized("Token expired".to_owned()),
        );

        harness.press(KeyCode::Char('D'));
        harness.press(KeyCode::Char('y'));

        assert_eq!(harness.runtime.table.store().records().len(), 3);
        assert_eq!(harness.state.view, View::Login);
        assert_eq!(harness.runtime.logouts, 1);
    }

    #[test]
    fn refresh_failure_keeps_rows_and_reports_once() {
        let mut harness = Harness::signed_in(sample_assets());
        harness.runtime.table.store_mut().fail_next(
            StoreOp::List,
            StoreError::Network("connection refused".to_owned()),
        );

        harness.press(KeyCode::Char('r'));

        assert_eq!(harness.state.view, View::List);
        assert_eq!(harness.visible_numbers().len(), 4);
        assert!(harness.status().contains("connection refused"));
        assert!(table_title(&harness.runtime.table).contains("load failed"));
    }

    #[test]
    fn stale_status_clear_is_ignored() {
        let mut harness = Harness::signed_in(sample_assets());
        let token = harness.view_data.status_token;

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: token - 1 })
            .expect("send");
        process_internal_events(&mut harness.state, &harness.view_data, &harness.rx);
        assert!(harness.state.status_line.is_some());

        harness
            .tx
            .send(InternalEvent::ClearStatus { token })
            .expect("send");
        process_internal_events(&mut harness.state, &harness.view_data, &harness.rx);
        assert!(harness.state.status_line.is_none());
    }

    #[test]
    fn table_title_reports_paging_and_filters() {
        let mut runtime = TestRuntime::with_records(AssetFaker::new(4).assets(12));
        let mut log = assetdesk_app::NotificationLog::default();
        runtime.table.set_department(Some("IT"), &mut log);

        let title = table_title(&runtime.table);
        assert!(title.contains("page 1/"));
        assert!(title.contains("dept IT"));
    }

    #[test]
    fn form_text_marks_required_and_read_only() {
        let form = AssetForm::from_record(&sample_assets()[0]);
        let text = form_text(&super::FormUiState::new(form));
        assert!(text.starts_with("> Asset Number* (read-only): A-001"));
        assert!(text.contains("Serial Number*: SN-001"));
    }

    #[test]
    fn status_text_shows_mode_and_hints() {
        let state = AppState::default();
        let view_data = ViewData::default();
        assert!(status_text(&state, &view_data).starts_with("LOGIN | "));
        assert!(help_overlay_text().contains("z page size"));
    }
}
