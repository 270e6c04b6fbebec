// Form dialogs for creating entities and flows.
// Owns the draft, the save status, and the closing protocol of one dialog.

use crate::error::Result;
use crate::hub::{DataGateway, FormFields};

use super::dialog::{DialogId, DialogResolver};

/// Unsaved form values, keyed by field name.
/// A field is present only once it has been seeded or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    fields: FormFields,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set a field. Clearing a field back to empty removes it.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.fields.remove(name);
        } else {
            self.fields.insert(name.to_string(), value);
        }
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Visible save state of a form dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveStatus {
    pub loading: bool,
    pub has_error: bool,
    pub error_message: Option<String>,
}

impl SaveStatus {
    /// Scope for a running save. `loading` is cleared when the scope drops.
    fn in_flight(&mut self) -> SaveScope<'_> {
        self.loading = true;
        SaveScope { status: self }
    }
}

/// An in-flight save. Dropping it, on any path, clears `loading`.
#[derive(Debug)]
pub struct SaveScope<'a> {
    status: &'a mut SaveStatus,
}

impl SaveScope<'_> {
    /// Record the save result. Returns true on success.
    pub fn finish(self, result: &Result<()>) -> bool {
        match result {
            Ok(()) => {
                self.status.has_error = false;
                self.status.error_message = None;
                true
            }
            Err(e) => {
                self.status.has_error = true;
                self.status.error_message = Some(e.user_message());
                false
            }
        }
    }
}

impl Drop for SaveScope<'_> {
    fn drop(&mut self) {
        self.status.loading = false;
    }
}

/// How a form field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice(&'static [&'static str]),
    /// Seeded by the caller, shown read-only.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind }
    }

    pub fn is_editable(&self) -> bool {
        self.kind != FieldKind::Fixed
    }
}

pub const PLUGIN_FORMATS: &[&str] = &["JAVASCRIPT", "XQUERY"];
pub const DATA_FORMATS: &[&str] = &["JSON", "XML"];

const ENTITY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("entityName", "Entity name", FieldKind::Text),
    FieldSpec::new("pluginFormat", "Plugin format", FieldKind::Choice(PLUGIN_FORMATS)),
    FieldSpec::new("dataFormat", "Data format", FieldKind::Choice(DATA_FORMATS)),
];

const FLOW_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("entityName", "Entity", FieldKind::Fixed),
    FieldSpec::new("flowType", "Flow type", FieldKind::Fixed),
    FieldSpec::new("extension", "Extension", FieldKind::Fixed),
    FieldSpec::new("flowName", "Flow name", FieldKind::Text),
    FieldSpec::new("pluginFormat", "Plugin format", FieldKind::Choice(PLUGIN_FORMATS)),
    FieldSpec::new("dataFormat", "Data format", FieldKind::Choice(DATA_FORMATS)),
];

/// Caller-supplied, immutable inputs of the flow dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowInputs {
    pub entity_name: String,
    pub flow_type: String,
    pub extension: String,
}

/// Which save call a form dialog makes on confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Entity,
    Flow,
}

impl SaveTarget {
    pub async fn save(&self, gateway: &dyn DataGateway, form: &FormFields) -> Result<()> {
        match self {
            SaveTarget::Entity => gateway.save_entity(form).await,
            SaveTarget::Flow => gateway.save_flow(form).await,
        }
    }

    pub fn noun(&self) -> &'static str {
        match self {
            SaveTarget::Entity => "entity",
            SaveTarget::Flow => "flow",
        }
    }
}

/// Controller shared by the entity and flow dialogs.
#[derive(Debug)]
pub struct FormController {
    id: DialogId,
    target: SaveTarget,
    fields: &'static [FieldSpec],
    /// Index into `fields` of the focused editable field.
    focus: usize,
    draft: FormDraft,
    status: SaveStatus,
    resolver: Option<DialogResolver<FormDraft>>,
}

impl FormController {
    /// Entity dialog: starts from an empty draft.
    pub fn entity(resolver: DialogResolver<FormDraft>) -> Self {
        Self::with_draft(resolver, SaveTarget::Entity, ENTITY_FIELDS, FormDraft::new())
    }

    /// Flow dialog: the draft is seeded with the three caller inputs.
    pub fn flow(resolver: DialogResolver<FormDraft>, inputs: FlowInputs) -> Self {
        let draft = FormDraft::seeded([
            ("entityName", inputs.entity_name),
            ("flowType", inputs.flow_type),
            ("extension", inputs.extension),
        ]);
        Self::with_draft(resolver, SaveTarget::Flow, FLOW_FIELDS, draft)
    }

    fn with_draft(
        resolver: DialogResolver<FormDraft>,
        target: SaveTarget,
        fields: &'static [FieldSpec],
        draft: FormDraft,
    ) -> Self {
        let focus = fields.iter().position(FieldSpec::is_editable).unwrap_or(0);
        Self {
            id: resolver.id(),
            target,
            fields,
            focus,
            draft,
            status: SaveStatus::default(),
            resolver: Some(resolver),
        }
    }

    pub fn id(&self) -> DialogId {
        self.id
    }

    pub fn target(&self) -> SaveTarget {
        self.target
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn is_closed(&self) -> bool {
        self.resolver.is_none()
    }

    /// Edit a field by name. Fixed fields cannot be changed.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter().find(|f| f.name == name) {
            Some(spec) if spec.is_editable() => {
                self.draft.set(name, value);
                true
            }
            _ => false,
        }
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(self.fields.len() - 1);
    }

    fn move_focus(&mut self, step: usize) {
        let len = self.fields.len();
        for i in 1..=len {
            let candidate = (self.focus + step * i) % len;
            if self.fields[candidate].is_editable() {
                self.focus = candidate;
                return;
            }
        }
    }

    fn focused(&self) -> Option<FieldSpec> {
        self.fields.get(self.focus).copied()
    }

    /// Type into the focused text field.
    pub fn type_char(&mut self, c: char) {
        if let Some(spec) = self.focused().filter(|f| f.kind == FieldKind::Text) {
            let mut value = self.draft.get(spec.name).unwrap_or_default().to_string();
            value.push(c);
            self.set_field(spec.name, value);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(spec) = self.focused().filter(|f| f.kind == FieldKind::Text) {
            let mut value = self.draft.get(spec.name).unwrap_or_default().to_string();
            value.pop();
            self.set_field(spec.name, value);
        }
    }

    /// Step the focused choice field forward or back.
    pub fn cycle_choice(&mut self, forward: bool) {
        let Some(spec) = self.focused() else {
            return;
        };
        if let FieldKind::Choice(options) = spec.kind {
            let next = cycle(options, self.draft.get(spec.name), forward);
            self.set_field(spec.name, next);
        }
    }

    /// Start a save. Returns the payload to send, or None when the dialog is
    /// closed or a save is already running.
    pub fn begin_save(&mut self) -> Option<FormFields> {
        if self.is_closed() || self.status.loading {
            return None;
        }
        self.status.loading = true;
        Some(self.draft.fields().clone())
    }

    /// Complete a save started with `begin_save`. Closes the dialog on success.
    pub fn finish_save(&mut self, result: Result<()>) -> bool {
        let saved = self.status.in_flight().finish(&result);
        if saved {
            self.close();
        } else {
            tracing::error!(dialog = %self.id, target = self.target.noun(), "save rejected");
        }
        saved
    }

    fn close(&mut self) {
        if let Some(resolver) = self.resolver.take() {
            resolver.close(self.draft.clone());
        }
    }

    /// Dismiss the dialog, discarding the draft.
    pub fn cancel(&mut self) {
        if let Some(resolver) = self.resolver.take() {
            resolver.dismiss();
        }
    }
}

/// Next (or previous) option after `current`, wrapping.
pub fn cycle(options: &[&'static str], current: Option<&str>, forward: bool) -> &'static str {
    let len = options.len();
    let pos = current.and_then(|c| options.iter().position(|o| *o == c));
    let idx = match (pos, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    };
    options[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::hub::gateway::testing::FakeGateway;
    use crate::state::dialog::{DialogOutcome, PendingOutcome, outcome_channel};

    /// Confirm the way the event loop does: begin, run the save, finish.
    async fn submit(form: &mut FormController, gateway: &FakeGateway) -> bool {
        match form.begin_save() {
            Some(payload) => {
                let result = form.target().save(gateway, &payload).await;
                form.finish_save(result)
            }
            None => false,
        }
    }

    async fn still_pending<T>(pending: PendingOutcome<T>) -> bool {
        tokio::time::timeout(Duration::from_millis(20), pending.wait())
            .await
            .is_err()
    }

    fn orders_inputs() -> FlowInputs {
        FlowInputs {
            entity_name: "orders".to_string(),
            flow_type: "import".to_string(),
            extension: "csv".to_string(),
        }
    }

    #[tokio::test]
    async fn test_entity_save_failure_keeps_dialog_open() {
        let gateway = FakeGateway::new().failing_saves("dup key");
        let (resolver, pending) = outcome_channel(DialogId(1));
        let mut form = FormController::entity(resolver);
        form.set_field("entityName", "Customer");

        assert!(!submit(&mut form, &gateway).await);
        assert!(!form.is_closed());
        assert!(form.status().has_error);
        assert_eq!(form.status().error_message.as_deref(), Some("dup key"));
        assert!(!form.status().loading);
        assert!(still_pending(pending).await);
    }

    #[tokio::test]
    async fn test_flow_save_failure_keeps_dialog_open() {
        let gateway = FakeGateway::new().failing_saves("dup key");
        let (resolver, pending) = outcome_channel(DialogId(10));
        let mut form = FormController::flow(resolver, orders_inputs());
        form.set_field("flowName", "load-orders");

        assert!(!submit(&mut form, &gateway).await);
        assert!(!form.is_closed());
        assert!(form.status().has_error);
        assert_eq!(form.status().error_message.as_deref(), Some("dup key"));
        assert!(!form.status().loading);
        assert_eq!(gateway.saved_flows.lock().unwrap().len(), 1);
        assert!(gateway.saved_entities.lock().unwrap().is_empty());
        assert!(still_pending(pending).await);
    }

    #[tokio::test]
    async fn test_entity_save_success_resolves_with_draft() {
        let gateway = FakeGateway::new();
        let (resolver, pending) = outcome_channel(DialogId(2));
        let mut form = FormController::entity(resolver);
        form.set_field("entityName", "Customer");
        form.set_field("dataFormat", "JSON");
        let submitted = form.draft().clone();

        assert!(submit(&mut form, &gateway).await);
        assert!(form.is_closed());
        assert_eq!(form.status(), &SaveStatus::default());
        assert_eq!(pending.wait().await, DialogOutcome::Confirmed(submitted.clone()));
        assert_eq!(gateway.saved_entities.lock().unwrap()[0], *submitted.fields());
    }

    #[tokio::test]
    async fn test_retry_after_failure_clears_error() {
        let (resolver, pending) = outcome_channel(DialogId(3));
        let mut form = FormController::entity(resolver);

        let failing = FakeGateway::new().failing_saves("dup key");
        submit(&mut form, &failing).await;
        assert!(form.status().has_error);

        let working = FakeGateway::new();
        assert!(submit(&mut form, &working).await);
        assert!(!form.status().has_error);
        assert!(matches!(pending.wait().await, DialogOutcome::Confirmed(_)));
    }

    #[test]
    fn test_flow_draft_is_seeded_inputs() {
        let (resolver, _pending) = outcome_channel(DialogId(4));
        let form = FormController::flow(resolver, orders_inputs());

        let expected = FormDraft::seeded([
            ("entityName", "orders"),
            ("flowType", "import"),
            ("extension", "csv"),
        ]);
        assert_eq!(form.draft(), &expected);
    }

    #[tokio::test]
    async fn test_flow_seeded_inputs_are_not_editable() {
        let gateway = FakeGateway::new();
        let (resolver, pending) = outcome_channel(DialogId(5));
        let mut form = FormController::flow(resolver, orders_inputs());

        assert!(!form.set_field("entityName", "customers"));
        assert!(form.set_field("flowName", "load-orders"));
        assert!(submit(&mut form, &gateway).await);

        let saved = gateway.saved_flows.lock().unwrap()[0].clone();
        assert_eq!(saved.get("entityName").map(String::as_str), Some("orders"));
        assert_eq!(saved.get("flowName").map(String::as_str), Some("load-orders"));
        assert!(matches!(pending.wait().await, DialogOutcome::Confirmed(_)));
    }

    #[tokio::test]
    async fn test_cancel_rejects_without_payload() {
        let (resolver, pending) = outcome_channel(DialogId(6));
        let mut form = FormController::entity(resolver);
        form.set_field("entityName", "Draft");
        form.cancel();
        assert!(form.is_closed());
        assert_eq!(pending.wait().await, DialogOutcome::Cancelled);

        let (resolver, pending) = outcome_channel(DialogId(7));
        let mut form = FormController::flow(resolver, orders_inputs());
        form.cancel();
        assert_eq!(pending.wait().await, DialogOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_split_save_ignores_double_confirm() {
        let (resolver, pending) = outcome_channel(DialogId(8));
        let mut form = FormController::entity(resolver);

        assert!(form.begin_save().is_some());
        assert!(form.status().loading);
        assert!(form.begin_save().is_none());

        let failed = form.finish_save(Err(crate::error::HubError::Service {
            status: 409,
            message: "dup key".to_string(),
        }));
        assert!(!failed);
        assert!(!form.status().loading);

        assert!(form.begin_save().is_some());
        assert!(form.finish_save(Ok(())));
        assert!(form.begin_save().is_none());
        assert!(matches!(pending.wait().await, DialogOutcome::Confirmed(_)));
    }

    #[test]
    fn test_keyboard_editing() {
        let (resolver, _pending) = outcome_channel(DialogId(9));
        let mut form = FormController::flow(resolver, orders_inputs());

        // Focus starts on the first editable field
        assert_eq!(form.fields()[form.focus()].name, "flowName");
        form.type_char('a');
        form.type_char('b');
        form.backspace();
        assert_eq!(form.draft().get("flowName"), Some("a"));

        form.focus_next();
        form.cycle_choice(true);
        assert_eq!(form.draft().get("pluginFormat"), Some("JAVASCRIPT"));
        form.cycle_choice(true);
        assert_eq!(form.draft().get("pluginFormat"), Some("XQUERY"));
        form.type_char('z');
        assert_eq!(form.draft().get("pluginFormat"), Some("XQUERY"));

        // Focus wraps past fixed fields
        form.focus_next();
        form.focus_next();
        assert_eq!(form.fields()[form.focus()].name, "flowName");
        form.focus_prev();
        assert_eq!(form.fields()[form.focus()].name, "dataFormat");
    }

    #[test]
    fn test_clearing_text_removes_field() {
        let mut draft = FormDraft::new();
        draft.set("entityName", "x");
        draft.set("entityName", "");
        assert!(draft.is_empty());
    }

    #[test]
    fn test_cycle_wraps_both_ways() {
        assert_eq!(cycle(DATA_FORMATS, None, false), "XML");
        assert_eq!(cycle(DATA_FORMATS, Some("XML"), true), "JSON");
        assert_eq!(cycle(DATA_FORMATS, Some("JSON"), false), "XML");
        assert_eq!(cycle(DATA_FORMATS, Some("bogus"), true), "JSON");
    }
}
