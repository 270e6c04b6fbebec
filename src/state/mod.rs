// State management module.
// Dialog controllers, the lazy path tree, and per-tab state.

pub mod api_docs;
pub mod console;
pub mod dialog;
pub mod form;
pub mod launcher;
pub mod list;
pub mod load_data;
pub mod tree;

pub use api_docs::ApiDocView;
pub use console::{ConsoleLevel, ConsoleState};
pub use dialog::{DialogConfig, DialogId, DialogOutcome, PendingOutcome};
pub use form::{FieldKind, FormController, FormDraft, SaveTarget};
pub use launcher::{ActiveDialog, DialogHost, DialogLauncher};
pub use list::{LoadingState, SelectableList};
pub use load_data::{LoadDataController, LoadDataFocus, LoadDataSelection};
pub use tree::{NodeId, NodeState, SelectableLazyTree};
