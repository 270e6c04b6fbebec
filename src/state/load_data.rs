// Load-data dialog controller.
// Picks an input path from the lazy tree plus a loader format and collection.

use crate::error::Result;
use crate::hub::PathEntry;

use super::dialog::{DialogId, DialogResolver};
use super::form::cycle;
use super::tree::{NodeId, SelectableLazyTree};

pub const DEFAULT_INPUT_PATH: &str = "input";
pub const DEFAULT_DATA_FORMAT: &str = "documents";

/// Input types understood by the bulk loader.
pub const LOAD_FORMATS: &[&str] = &[
    "documents",
    "delimited_text",
    "aggregates",
    "archive",
    "sequencefile",
    "rdf",
    "delimited_json",
];

/// Payload of a confirmed load-data dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDataSelection {
    pub input_path: String,
    pub data_format: String,
    pub collection: Option<String>,
}

/// Which part of the dialog receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadDataFocus {
    #[default]
    Tree,
    DataFormat,
    Collection,
}

impl LoadDataFocus {
    pub fn next(&self) -> Self {
        match self {
            LoadDataFocus::Tree => LoadDataFocus::DataFormat,
            LoadDataFocus::DataFormat => LoadDataFocus::Collection,
            LoadDataFocus::Collection => LoadDataFocus::Tree,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoadDataFocus::Tree => LoadDataFocus::Collection,
            LoadDataFocus::DataFormat => LoadDataFocus::Tree,
            LoadDataFocus::Collection => LoadDataFocus::DataFormat,
        }
    }
}

#[derive(Debug)]
pub struct LoadDataController {
    id: DialogId,
    tree: SelectableLazyTree,
    input_path: String,
    data_format: String,
    collection: Option<String>,
    pub focus: LoadDataFocus,
    resolver: Option<DialogResolver<LoadDataSelection>>,
}

impl LoadDataController {
    pub fn new(resolver: DialogResolver<LoadDataSelection>, base_path: &str) -> Self {
        Self {
            id: resolver.id(),
            tree: SelectableLazyTree::new(base_path),
            input_path: DEFAULT_INPUT_PATH.to_string(),
            data_format: DEFAULT_DATA_FORMAT.to_string(),
            collection: None,
            focus: LoadDataFocus::default(),
            resolver: Some(resolver),
        }
    }

    pub fn id(&self) -> DialogId {
        self.id
    }

    pub fn tree(&self) -> &SelectableLazyTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut SelectableLazyTree {
        &mut self.tree
    }

    pub fn input_path(&self) -> &str {
        &self.input_path
    }

    pub fn data_format(&self) -> &str {
        &self.data_format
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.resolver.is_none()
    }

    /// Start seeding the tree. Returns the base path to search.
    pub fn begin_initialize(&mut self) -> Option<String> {
        self.tree.begin_initialize()
    }

    pub fn complete_initialize(&mut self, result: Result<Vec<PathEntry>>) {
        self.tree.complete_initialize(result);
    }

    /// Selecting a node picks it as the input path. It does not expand it.
    pub fn on_selection(&mut self, id: NodeId) {
        self.tree.select(id);
        if let Some(path) = self.tree.selected_path() {
            self.input_path = path.to_string();
        }
    }

    /// React to a node opening or closing. Returns the path to fetch when an
    /// opened node still needs its children. Closing never fetches.
    pub fn on_node_toggle(&mut self, id: NodeId, expanded: bool) -> Option<String> {
        if expanded {
            self.tree.request_expand(id)
        } else {
            self.tree.collapse(id);
            None
        }
    }

    pub fn complete_expand(&mut self, id: NodeId, result: Result<Vec<PathEntry>>) -> bool {
        self.tree.complete_expand(id, result)
    }

    pub fn cycle_data_format(&mut self, forward: bool) {
        self.data_format = cycle(LOAD_FORMATS, Some(self.data_format.as_str()), forward).to_string();
    }

    pub fn type_char(&mut self, c: char) {
        if self.focus == LoadDataFocus::Collection {
            self.collection.get_or_insert_with(String::new).push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == LoadDataFocus::Collection {
            if let Some(collection) = &mut self.collection {
                collection.pop();
                if collection.is_empty() {
                    self.collection = None;
                }
            }
        }
    }

    /// Current form values.
    pub fn selection(&self) -> LoadDataSelection {
        LoadDataSelection {
            input_path: self.input_path.clone(),
            data_format: self.data_format.clone(),
            collection: self.collection.clone(),
        }
    }

    /// Confirm immediately with the current values.
    pub fn ok(&mut self) {
        let selection = self.selection();
        if let Some(resolver) = self.resolver.take() {
            resolver.close(selection);
        }
    }

    pub fn cancel(&mut self) {
        if let Some(resolver) = self.resolver.take() {
            resolver.dismiss();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::DataGateway;
    use crate::hub::gateway::testing::FakeGateway;
    use crate::state::dialog::{DialogOutcome, PendingOutcome, outcome_channel};

    fn controller() -> (LoadDataController, PendingOutcome<LoadDataSelection>) {
        let (resolver, pending) = outcome_channel(DialogId(1));
        (LoadDataController::new(resolver, ""), pending)
    }

    async fn initialize(ctl: &mut LoadDataController, gateway: &FakeGateway) {
        if let Some(path) = ctl.begin_initialize() {
            ctl.complete_initialize(gateway.search_path(&path).await);
        }
    }

    async fn toggle(ctl: &mut LoadDataController, gateway: &FakeGateway, id: NodeId, open: bool) {
        if let Some(path) = ctl.on_node_toggle(id, open) {
            ctl.complete_expand(id, gateway.search_path(&path).await);
        }
    }

    #[test]
    fn test_defaults_before_interaction() {
        let (ctl, _pending) = controller();
        assert_eq!(ctl.input_path(), "input");
        assert_eq!(ctl.data_format(), "documents");
        assert_eq!(ctl.collection(), None);
    }

    #[tokio::test]
    async fn test_selection_sets_input_path_without_fetching() {
        let gateway = FakeGateway::new()
            .with_children("", &["a"])
            .with_children("a", &["a/x"]);
        let (mut ctl, _pending) = controller();
        initialize(&mut ctl, &gateway).await;
        let a = ctl.tree().roots()[0];
        toggle(&mut ctl, &gateway, a, true).await;
        let x = ctl.tree().node(a).unwrap().children().unwrap()[0];

        ctl.on_selection(x);
        assert_eq!(ctl.input_path(), "a/x");
        assert_eq!(gateway.search_count("a/x"), 0);
        assert_eq!(ctl.tree().node(a).unwrap().children(), Some(&[x][..]));
    }

    #[tokio::test]
    async fn test_collapse_never_fetches() {
        let gateway = FakeGateway::new().with_children("", &["a"]);
        let (mut ctl, _pending) = controller();
        initialize(&mut ctl, &gateway).await;
        let a = ctl.tree().roots()[0];

        toggle(&mut ctl, &gateway, a, false).await;
        assert_eq!(gateway.search_count("a"), 0);
        assert!(ctl.tree().node(a).unwrap().children().is_none());
    }

    #[tokio::test]
    async fn test_ok_closes_with_current_values() {
        let (mut ctl, pending) = controller();
        ctl.focus = LoadDataFocus::Collection;
        ctl.type_char('r');
        ctl.type_char('a');
        ctl.type_char('w');
        ctl.cycle_data_format(true);
        ctl.ok();

        assert!(ctl.is_closed());
        assert_eq!(
            pending.wait().await,
            DialogOutcome::Confirmed(LoadDataSelection {
                input_path: "input".to_string(),
                data_format: "delimited_text".to_string(),
                collection: Some("raw".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_cancel_rejects() {
        let (mut ctl, pending) = controller();
        ctl.cancel();
        assert_eq!(pending.wait().await, DialogOutcome::Cancelled);
    }

    #[test]
    fn test_collection_only_edited_when_focused() {
        let (mut ctl, _pending) = controller();
        ctl.type_char('x');
        assert_eq!(ctl.collection(), None);

        ctl.focus = ctl.focus.next().next();
        ctl.type_char('x');
        assert_eq!(ctl.collection(), Some("x"));
        ctl.backspace();
        assert_eq!(ctl.collection(), None);
    }
}
