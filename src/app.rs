// App state and main event loop.
// Manages tabs, the dialog stack, keyboard input, and async gateway calls.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::layout::Position;
use ratatui::prelude::*;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::Config;
use crate::error::{HubError, Result};
use crate::hub::{ApiDocs, DataGateway, FormFields, PathEntry};
use crate::state::{
    ActiveDialog, ApiDocView, ConsoleState, DialogConfig, DialogHost, DialogId, DialogLauncher,
    DialogOutcome, FormDraft, LoadDataController, LoadDataFocus, LoadDataSelection, NodeId,
    PendingOutcome, SaveTarget, SelectableList,
};
use crate::ui;

/// Active tab in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Home,
    ApiDocs,
    Console,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::ApiDocs => "API Docs",
            Tab::Console => "Console",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Home => Tab::ApiDocs,
            Tab::ApiDocs => Tab::Console,
            Tab::Console => Tab::Home,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Tab::Home => Tab::Console,
            Tab::ApiDocs => Tab::Home,
            Tab::Console => Tab::ApiDocs,
        }
    }
}

/// Results delivered back to the event loop from spawned tasks.
#[derive(Debug)]
pub enum AppEvent {
    RootsListed {
        dialog: DialogId,
        result: Result<Vec<PathEntry>>,
    },
    ChildrenListed {
        dialog: DialogId,
        node: NodeId,
        result: Result<Vec<PathEntry>>,
    },
    SaveFinished {
        dialog: DialogId,
        result: Result<()>,
    },
    ApiDocsLoaded(Result<ApiDocs>),
    LoadDataClosed(DialogOutcome<LoadDataSelection>),
    EntityClosed(DialogOutcome<FormDraft>),
    FlowClosed(DialogOutcome<FormDraft>),
}

/// A dialog shown by the app together with its presentation policy.
#[derive(Debug)]
pub struct OpenDialog {
    pub config: DialogConfig,
    pub dialog: ActiveDialog,
}

/// Modal stack. The last entry is on top and receives input.
#[derive(Debug, Default)]
pub struct DialogStack {
    entries: Vec<OpenDialog>,
}

impl DialogHost for DialogStack {
    fn present(&mut self, config: DialogConfig, dialog: ActiveDialog) {
        tracing::info!(dialog = %dialog.id(), template = config.template, "dialog opened");
        self.entries.push(OpenDialog { config, dialog });
    }
}

impl DialogStack {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpenDialog> {
        self.entries.iter()
    }

    pub fn top_mut(&mut self) -> Option<&mut OpenDialog> {
        self.entries.last_mut()
    }

    pub fn find_mut(&mut self, id: DialogId) -> Option<&mut ActiveDialog> {
        self.entries
            .iter_mut()
            .map(|entry| &mut entry.dialog)
            .find(|dialog| dialog.id() == id)
    }

    /// Drop dialogs whose outcome has been delivered.
    pub fn prune_closed(&mut self) {
        self.entries.retain(|entry| !entry.dialog.is_closed());
    }
}

/// A confirmed dialog outcome, for the Home tab history.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Main application state.
pub struct App {
    /// Currently active tab.
    pub active_tab: Tab,
    /// Whether the app should exit.
    pub should_quit: bool,
    /// Whether the help overlay is shown.
    pub show_help: bool,
    pub dialogs: DialogStack,
    /// Entities created this session.
    pub entities: SelectableList<String>,
    /// Confirmed loads, entities and flows, oldest first.
    pub history: SelectableList<HistoryEntry>,
    pub api_docs: ApiDocView,
    pub console: ConsoleState,
    pub base_url: String,
    /// Frame area from the last draw, for mouse hit testing.
    pub last_area: Rect,
    default_extension: String,
    launcher: DialogLauncher,
    gateway: Arc<dyn DataGateway>,
    runtime: Handle,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(config: &Config, gateway: Arc<dyn DataGateway>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            active_tab: Tab::default(),
            should_quit: false,
            show_help: false,
            dialogs: DialogStack::default(),
            entities: SelectableList::new(),
            history: SelectableList::new(),
            api_docs: ApiDocView::new(),
            console: ConsoleState::new(),
            base_url: config.base_url.clone(),
            last_area: Rect::default(),
            default_extension: config.default_extension.clone(),
            launcher: DialogLauncher::new(config.base_path.clone()),
            gateway,
            runtime,
            tx,
            rx,
        }
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
            self.drain_app_events();
        }
        Ok(())
    }

    /// Handle keyboard and mouse events.
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply every result that spawned tasks have reported so far.
    fn drain_app_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.handle_app_event(event);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // The alert blocks everything until acknowledged
        if self.api_docs.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.api_docs.acknowledge_alert();
            }
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        if !self.dialogs.is_empty() {
            self.handle_dialog_key(key);
            self.dialogs.prune_closed();
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.switch_tab(self.active_tab.next()),
            KeyCode::BackTab => self.switch_tab(self.active_tab.prev()),
            _ => match self.active_tab {
                Tab::Home => self.handle_home_key(key),
                Tab::ApiDocs => self.handle_api_docs_key(key),
                Tab::Console => self.handle_console_key(key),
            },
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        match tab {
            Tab::Console => self.console.mark_read(),
            Tab::ApiDocs if self.api_docs.needs_load() => self.load_api_docs(),
            _ => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('l') => self.open_load_data(),
            KeyCode::Char('e') => self.open_entity(),
            KeyCode::Char('i') => self.open_flow("input"),
            KeyCode::Char('h') => self.open_flow("harmonize"),
            KeyCode::Up | KeyCode::Char('k') => self.entities.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.entities.select_next(),
            _ => {}
        }
    }

    fn handle_api_docs_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => self.load_api_docs(),
            KeyCode::Char('i') => self.api_docs.toggle_infos(),
            KeyCode::Up | KeyCode::Char('k') => self.api_docs.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.api_docs.scroll_down(),
            _ => {}
        }
    }

    fn handle_console_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.console.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.console.select_next(),
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(top) = self.dialogs.top_mut() else {
            return;
        };

        if key.code == KeyCode::Esc {
            if top.config.keyboard {
                top.dialog.cancel();
            }
            return;
        }

        let id = top.dialog.id();
        match &mut top.dialog {
            ActiveDialog::LoadData(ctl) => {
                let fetch = handle_load_data_key(ctl, key);
                if let Some((node, path)) = fetch {
                    self.spawn_search(id, Some(node), path);
                }
            }
            ActiveDialog::Form(ctl) => match key.code {
                KeyCode::Enter => {
                    if let Some(payload) = ctl.begin_save() {
                        let target = ctl.target();
                        self.spawn_save(id, target, payload);
                    }
                }
                KeyCode::Tab | KeyCode::Down => ctl.focus_next(),
                KeyCode::BackTab | KeyCode::Up => ctl.focus_prev(),
                KeyCode::Left => ctl.cycle_choice(false),
                KeyCode::Right => ctl.cycle_choice(true),
                KeyCode::Backspace => ctl.backspace(),
                KeyCode::Char(c) => ctl.type_char(c),
                _ => {}
            },
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Down(_)) {
            return;
        }
        let area = self.last_area;
        let Some(top) = self.dialogs.top_mut() else {
            return;
        };
        let dialog_area = ui::dialog_area(area, top.config.size);
        if dialog_area.contains(Position::new(mouse.column, mouse.row)) {
            return;
        }
        if top.config.dismisses_on_backdrop() {
            top.dialog.cancel();
            self.dialogs.prune_closed();
        } else {
            tracing::trace!("ignoring click on static backdrop");
        }
    }

    pub fn open_load_data(&mut self) {
        let pending = self.launcher.open_load_data_modal(&mut self.dialogs);
        let id = pending.id();
        self.forward_outcome(pending, AppEvent::LoadDataClosed);

        if let Some(ActiveDialog::LoadData(ctl)) = self.dialogs.find_mut(id) {
            if let Some(path) = ctl.begin_initialize() {
                self.spawn_search(id, None, path);
            }
        }
    }

    pub fn open_entity(&mut self) {
        let pending = self.launcher.open_entity_modal(&mut self.dialogs);
        self.forward_outcome(pending, AppEvent::EntityClosed);
    }

    pub fn open_flow(&mut self, flow_type: &str) {
        let Some(entity) = self.entities.selected_item().cloned() else {
            self.console.warn("Create an entity before adding a flow");
            return;
        };
        let pending = self.launcher.open_flow_modal(
            &mut self.dialogs,
            &entity,
            flow_type,
            &self.default_extension,
        );
        self.forward_outcome(pending, AppEvent::FlowClosed);
    }

    pub fn load_api_docs(&mut self) {
        if let Some(url) = self.api_docs.begin_load() {
            let gateway = Arc::clone(&self.gateway);
            let tx = self.tx.clone();
            self.runtime.spawn(async move {
                let result = guarded(async move { gateway.api_docs(&url).await }).await;
                let _ = tx.send(AppEvent::ApiDocsLoaded(result));
            });
        }
    }

    /// Relay a dialog's outcome back into the event loop once it resolves.
    fn forward_outcome<T: Send + 'static>(
        &self,
        pending: PendingOutcome<T>,
        wrap: fn(DialogOutcome<T>) -> AppEvent,
    ) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = pending.wait().await;
            let _ = tx.send(wrap(outcome));
        });
    }

    fn spawn_search(&self, dialog: DialogId, node: Option<NodeId>, path: String) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = guarded(async move { gateway.search_path(&path).await }).await;
            let event = match node {
                Some(node) => AppEvent::ChildrenListed {
                    dialog,
                    node,
                    result,
                },
                None => AppEvent::RootsListed { dialog, result },
            };
            let _ = tx.send(event);
        });
    }

    fn spawn_save(&self, dialog: DialogId, target: SaveTarget, payload: FormFields) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result =
                guarded(async move { target.save(gateway.as_ref(), &payload).await }).await;
            let _ = tx.send(AppEvent::SaveFinished { dialog, result });
        });
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::RootsListed { dialog, result } => {
                let Some(ActiveDialog::LoadData(ctl)) = self.dialogs.find_mut(dialog) else {
                    tracing::debug!(%dialog, "discarding root listing for closed dialog");
                    return;
                };
                ctl.complete_initialize(result);
                let failure = ctl
                    .tree()
                    .root_error()
                    .map(|e| format!("Could not list input paths: {}", e));
                if let Some(message) = failure {
                    self.console.warn(message);
                }
            }
            AppEvent::ChildrenListed {
                dialog,
                node,
                result,
            } => {
                let Some(ActiveDialog::LoadData(ctl)) = self.dialogs.find_mut(dialog) else {
                    tracing::debug!(%dialog, %node, "discarding listing for closed dialog");
                    return;
                };
                let failure = result.as_ref().err().map(|e| {
                    let path = ctl.tree().node(node).map(|n| n.path.clone()).unwrap_or_default();
                    format!("Could not list {}: {}", path, e.user_message())
                });
                ctl.complete_expand(node, result);
                if let Some(message) = failure {
                    self.console.warn(message);
                }
            }
            AppEvent::SaveFinished { dialog, result } => {
                let Some(ActiveDialog::Form(ctl)) = self.dialogs.find_mut(dialog) else {
                    tracing::debug!(%dialog, "discarding save result for closed dialog");
                    return;
                };
                let failure = result
                    .as_ref()
                    .err()
                    .map(|e| format!("Saving {} failed: {}", ctl.target().noun(), e.user_message()));
                ctl.finish_save(result);
                if let Some(message) = failure {
                    self.console.error(message);
                }
                self.dialogs.prune_closed();
            }
            AppEvent::ApiDocsLoaded(result) => {
                if let Err(e) = &result {
                    self.console.error(format!("API docs unavailable: {}", e));
                }
                self.api_docs.complete_load(result);
            }
            AppEvent::LoadDataClosed(outcome) => match outcome {
                DialogOutcome::Confirmed(selection) => {
                    let label = format!(
                        "Load {} from {}{}",
                        selection.data_format,
                        selection.input_path,
                        selection
                            .collection
                            .as_deref()
                            .map(|c| format!(" into {}", c))
                            .unwrap_or_default()
                    );
                    self.console.info(label.clone());
                    self.history.push(HistoryEntry::new(label));
                }
                DialogOutcome::Cancelled => self.console.info("Load data cancelled"),
            },
            AppEvent::EntityClosed(outcome) => match outcome {
                DialogOutcome::Confirmed(draft) => {
                    let name = draft.get("entityName").unwrap_or("(unnamed)").to_string();
                    self.console.info(format!("Created entity {}", name));
                    self.history.push(HistoryEntry::new(format!("Entity {}", name)));
                    self.entities.push(name);
                }
                DialogOutcome::Cancelled => self.console.info("New entity cancelled"),
            },
            AppEvent::FlowClosed(outcome) => match outcome {
                DialogOutcome::Confirmed(draft) => {
                    let label = format!(
                        "Flow {} ({}) on {}",
                        draft.get("flowName").unwrap_or("(unnamed)"),
                        draft.get("flowType").unwrap_or_default(),
                        draft.get("entityName").unwrap_or_default(),
                    );
                    self.console.info(format!("Created {}", label));
                    self.history.push(HistoryEntry::new(label));
                }
                DialogOutcome::Cancelled => self.console.info("New flow cancelled"),
            },
        }
    }
}

/// Run a gateway call on its own task. A panic there still yields a result,
/// so every request started by the event loop reports back.
async fn guarded<T, F>(call: F) -> Result<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    tokio::spawn(call)
        .await
        .unwrap_or_else(|e| Err(HubError::Other(format!("request task failed: {}", e))))
}

/// Apply a key to the load-data dialog. Returns a node fetch to start, if any.
fn handle_load_data_key(
    ctl: &mut LoadDataController,
    key: KeyEvent,
) -> Option<(NodeId, String)> {
    match key.code {
        KeyCode::Enter => ctl.ok(),
        KeyCode::Tab => ctl.focus = ctl.focus.next(),
        KeyCode::BackTab => ctl.focus = ctl.focus.prev(),
        code => match ctl.focus {
            LoadDataFocus::Tree => return handle_tree_key(ctl, code),
            LoadDataFocus::DataFormat => match code {
                KeyCode::Left => ctl.cycle_data_format(false),
                KeyCode::Right | KeyCode::Char(' ') => ctl.cycle_data_format(true),
                _ => {}
            },
            LoadDataFocus::Collection => match code {
                KeyCode::Backspace => ctl.backspace(),
                KeyCode::Char(c) => ctl.type_char(c),
                _ => {}
            },
        },
    }
    None
}

fn handle_tree_key(
    ctl: &mut LoadDataController,
    code: KeyCode,
) -> Option<(NodeId, String)> {
    let cursor = ctl.tree().cursor_node();
    match code {
        KeyCode::Up | KeyCode::Char('k') => ctl.tree_mut().cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => ctl.tree_mut().cursor_down(),
        KeyCode::Right | KeyCode::Char('l') => {
            let node = cursor?;
            return ctl.on_node_toggle(node, true).map(|path| (node, path));
        }
        KeyCode::Left | KeyCode::Char('h') => {
            let node = cursor?;
            let expanded = ctl.tree().node(node).is_some_and(|n| n.expanded);
            if expanded {
                ctl.on_node_toggle(node, false);
            } else {
                ctl.tree_mut().cursor_to_parent();
            }
        }
        KeyCode::Char(' ') => {
            if let Some(node) = cursor {
                ctl.on_selection(node);
            }
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::gateway::testing::FakeGateway;

    fn app_with(gateway: FakeGateway) -> App {
        App::new(&Config::default(), Arc::new(gateway), Handle::current())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Feed task results into the app until `done` holds.
    async fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
        let deadline = Duration::from_secs(2);
        tokio::time::timeout(deadline, async {
            while !done(app) {
                match app.rx.recv().await {
                    Some(event) => app.handle_app_event(event),
                    None => break,
                }
            }
        })
        .await
        .expect("app did not reach expected state");
    }

    fn load_data(app: &mut App) -> &mut LoadDataController {
        match &mut app.dialogs.top_mut().unwrap().dialog {
            ActiveDialog::LoadData(ctl) => ctl,
            other => panic!("expected load data dialog, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_data_flow_end_to_end() {
        let gateway = FakeGateway::new()
            .with_children("", &["input", "archive"])
            .with_children("input", &["input/orders"]);
        let mut app = app_with(gateway);

        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.dialogs.len(), 1);
        assert_eq!(load_data(&mut app).input_path(), "input");

        pump_until(&mut app, |app| {
            app.dialogs.iter().any(|d| match &d.dialog {
                ActiveDialog::LoadData(ctl) => ctl.tree().roots().len() == 2,
                _ => false,
            })
        })
        .await;

        // Expand "input", then select its child
        app.handle_key(key(KeyCode::Right));
        pump_until(&mut app, |app| {
            app.dialogs.iter().any(|d| match &d.dialog {
                ActiveDialog::LoadData(ctl) => ctl.tree().visible_rows().len() == 3,
                _ => false,
            })
        })
        .await;
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(load_data(&mut app).input_path(), "input/orders");

        app.handle_key(key(KeyCode::Enter));
        assert!(app.dialogs.is_empty());
        pump_until(&mut app, |app| !app.history.is_empty()).await;
        assert_eq!(
            app.history.items[0].label,
            "Load documents from input/orders"
        );
    }

    #[tokio::test]
    async fn test_entity_save_failure_keeps_dialog_and_logs() {
        let gateway = FakeGateway::new().failing_saves("dup key");
        let mut app = app_with(gateway);

        app.handle_key(key(KeyCode::Char('e')));
        for c in "Customer".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        pump_until(&mut app, |app| app.console.unread > 0).await;
        assert_eq!(app.dialogs.len(), 1);
        let ActiveDialog::Form(form) = &app.dialogs.iter().next().unwrap().dialog else {
            panic!("expected form dialog");
        };
        assert!(form.status().has_error);
        assert_eq!(form.status().error_message.as_deref(), Some("dup key"));
        assert!(!form.status().loading);
        assert!(app.entities.is_empty());
    }

    #[tokio::test]
    async fn test_entity_then_flow() {
        let gateway = FakeGateway::new();
        let mut app = app_with(gateway);

        // No entity yet: flow cannot open
        app.handle_key(key(KeyCode::Char('i')));
        assert!(app.dialogs.is_empty());

        app.handle_key(key(KeyCode::Char('e')));
        for c in "orders".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        pump_until(&mut app, |app| !app.entities.is_empty()).await;
        assert!(app.dialogs.is_empty());

        app.handle_key(key(KeyCode::Char('h')));
        let ActiveDialog::Form(form) = &app.dialogs.iter().next().unwrap().dialog else {
            panic!("expected form dialog");
        };
        assert_eq!(form.draft().get("entityName"), Some("orders"));
        assert_eq!(form.draft().get("flowType"), Some("harmonize"));
        assert_eq!(form.draft().get("extension"), Some("sjs"));
    }

    #[tokio::test]
    async fn test_escape_cancels_and_late_response_is_dropped() {
        let gateway = FakeGateway::new().with_children("", &["a"]);
        let mut app = app_with(gateway);

        app.handle_key(key(KeyCode::Char('l')));
        let id = app.dialogs.iter().next().unwrap().dialog.id();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.dialogs.is_empty());

        // A response for the closed dialog changes nothing
        app.handle_app_event(AppEvent::SaveFinished {
            dialog: id,
            result: Ok(()),
        });
        app.handle_app_event(AppEvent::RootsListed {
            dialog: id,
            result: Ok(vec![PathEntry::new("a")]),
        });
        assert!(app.dialogs.is_empty());

        pump_until(&mut app, |app| {
            app.console
                .messages
                .iter()
                .any(|m| m.message == "Load data cancelled")
        })
        .await;
        assert!(app.history.is_empty());
    }

    #[tokio::test]
    async fn test_api_docs_alert_blocks_input() {
        let mut app = app_with(FakeGateway::new());

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.active_tab, Tab::ApiDocs);
        pump_until(&mut app, |app| app.api_docs.alert.is_some()).await;

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.active_tab, Tab::ApiDocs);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);

        app.handle_key(key(KeyCode::Enter));
        assert!(app.api_docs.alert.is_none());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_static_backdrop_ignores_outside_clicks() {
        let mut app = app_with(FakeGateway::new());
        app.last_area = Rect::new(0, 0, 120, 40);
        app.handle_key(key(KeyCode::Char('e')));

        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(crossterm::event::MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.dialogs.len(), 1);
    }

    /// Gateway whose calls panic inside the request task.
    struct PanickingGateway;

    #[async_trait::async_trait]
    impl DataGateway for PanickingGateway {
        async fn search_path(&self, _base_path: &str) -> Result<Vec<PathEntry>> {
            panic!("search task died")
        }

        async fn save_entity(&self, _form: &FormFields) -> Result<()> {
            panic!("save task died")
        }

        async fn save_flow(&self, _form: &FormFields) -> Result<()> {
            panic!("save task died")
        }

        async fn api_docs(&self, _url: &str) -> Result<ApiDocs> {
            panic!("docs task died")
        }
    }

    fn form(app: &App) -> &crate::state::FormController {
        match &app.dialogs.iter().next().unwrap().dialog {
            ActiveDialog::Form(form) => form,
            other => panic!("expected form dialog, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dead_save_task_still_releases_loading() {
        let mut app = App::new(&Config::default(), Arc::new(PanickingGateway), Handle::current());

        app.handle_key(key(KeyCode::Char('e')));
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Enter));
        assert!(form(&app).status().loading);

        pump_until(&mut app, |app| !form(app).status().loading).await;
        assert!(form(&app).status().has_error);
        assert_eq!(app.dialogs.len(), 1);

        // Confirm works again after the failure
        app.handle_key(key(KeyCode::Enter));
        assert!(form(&app).status().loading);
    }

    #[tokio::test]
    async fn test_dead_search_task_reports_root_error() {
        let mut app = App::new(&Config::default(), Arc::new(PanickingGateway), Handle::current());

        app.handle_key(key(KeyCode::Char('l')));
        pump_until(&mut app, |app| app.console.unread > 0).await;
        let root_error = match &app.dialogs.iter().next().unwrap().dialog {
            ActiveDialog::LoadData(ctl) => ctl.tree().root_error().map(str::to_string),
            _ => None,
        };
        assert!(root_error.unwrap().contains("request task failed"));
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Home.next(), Tab::ApiDocs);
        assert_eq!(Tab::Home.prev(), Tab::Console);
        assert_eq!(Tab::Console.next().title(), "Home");
    }
}
