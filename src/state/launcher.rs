// Dialog launcher.
// Builds a controller for the named dialog, hands it to the host, returns the pending outcome.

use super::dialog::{
    Backdrop, DialogConfig, DialogId, DialogSize, PendingOutcome, outcome_channel,
};
use super::form::{FlowInputs, FormController, FormDraft};
use super::load_data::{LoadDataController, LoadDataSelection};

pub const LOAD_DATA_DIALOG: DialogConfig = DialogConfig {
    template: "modal/load-data",
    title: " Load Data ",
    size: DialogSize::Small,
    backdrop: Backdrop::Static,
    keyboard: true,
};

pub const ENTITY_DIALOG: DialogConfig = DialogConfig {
    template: "modal/entity",
    title: " New Entity ",
    size: DialogSize::Medium,
    backdrop: Backdrop::Static,
    keyboard: true,
};

pub const FLOW_DIALOG: DialogConfig = DialogConfig {
    template: "modal/flow",
    title: " New Flow ",
    size: DialogSize::Small,
    backdrop: Backdrop::Static,
    keyboard: true,
};

/// A dialog controller of any kind.
#[derive(Debug)]
pub enum ActiveDialog {
    LoadData(LoadDataController),
    Form(FormController),
}

impl ActiveDialog {
    pub fn id(&self) -> DialogId {
        match self {
            ActiveDialog::LoadData(ctl) => ctl.id(),
            ActiveDialog::Form(ctl) => ctl.id(),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            ActiveDialog::LoadData(ctl) => ctl.is_closed(),
            ActiveDialog::Form(ctl) => ctl.is_closed(),
        }
    }

    pub fn cancel(&mut self) {
        match self {
            ActiveDialog::LoadData(ctl) => ctl.cancel(),
            ActiveDialog::Form(ctl) => ctl.cancel(),
        }
    }
}

/// Something that can show dialogs. Stacking policy is the host's.
pub trait DialogHost {
    fn present(&mut self, config: DialogConfig, dialog: ActiveDialog);
}

/// Opens the three console dialogs.
#[derive(Debug)]
pub struct DialogLauncher {
    next_id: u64,
    base_path: String,
}

impl DialogLauncher {
    /// `base_path` seeds the load-data tree.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            next_id: 1,
            base_path: base_path.into(),
        }
    }

    fn allocate_id(&mut self) -> DialogId {
        let id = DialogId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn open_load_data_modal(
        &mut self,
        host: &mut dyn DialogHost,
    ) -> PendingOutcome<LoadDataSelection> {
        let (resolver, pending) = outcome_channel(self.allocate_id());
        let ctl = LoadDataController::new(resolver, &self.base_path);
        host.present(LOAD_DATA_DIALOG, ActiveDialog::LoadData(ctl));
        pending
    }

    pub fn open_entity_modal(&mut self, host: &mut dyn DialogHost) -> PendingOutcome<FormDraft> {
        let (resolver, pending) = outcome_channel(self.allocate_id());
        host.present(ENTITY_DIALOG, ActiveDialog::Form(FormController::entity(resolver)));
        pending
    }

    pub fn open_flow_modal(
        &mut self,
        host: &mut dyn DialogHost,
        entity_name: &str,
        flow_type: &str,
        extension: &str,
    ) -> PendingOutcome<FormDraft> {
        let (resolver, pending) = outcome_channel(self.allocate_id());
        let inputs = FlowInputs {
            entity_name: entity_name.to_string(),
            flow_type: flow_type.to_string(),
            extension: extension.to_string(),
        };
        host.present(
            FLOW_DIALOG,
            ActiveDialog::Form(FormController::flow(resolver, inputs)),
        );
        pending
    }
}
