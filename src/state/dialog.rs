// Dialog outcome plumbing and layout policy.
// A launched dialog hands its caller a pending outcome resolved exactly once.

use std::fmt;

use tokio::sync::oneshot;

/// Identifies one opened dialog instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialogId(pub u64);

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialog#{}", self.0)
    }
}

/// Result of a modal interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome<T> {
    Confirmed(T),
    Cancelled,
}

/// Controller-side half of a dialog outcome. Consumed on use.
#[derive(Debug)]
pub struct DialogResolver<T> {
    id: DialogId,
    tx: oneshot::Sender<DialogOutcome<T>>,
}

/// Caller-side half of a dialog outcome.
#[derive(Debug)]
pub struct PendingOutcome<T> {
    id: DialogId,
    rx: oneshot::Receiver<DialogOutcome<T>>,
}

/// Create a linked resolver and pending outcome.
pub fn outcome_channel<T>(id: DialogId) -> (DialogResolver<T>, PendingOutcome<T>) {
    let (tx, rx) = oneshot::channel();
    (DialogResolver { id, tx }, PendingOutcome { id, rx })
}

impl<T> DialogResolver<T> {
    pub fn id(&self) -> DialogId {
        self.id
    }

    /// Fulfill the outcome with a payload.
    pub fn close(self, payload: T) {
        tracing::info!(dialog = %self.id, "dialog confirmed");
        // Receiver may already be gone; nobody is waiting then
        let _ = self.tx.send(DialogOutcome::Confirmed(payload));
    }

    /// Reject the outcome.
    pub fn dismiss(self) {
        tracing::info!(dialog = %self.id, "dialog dismissed");
        let _ = self.tx.send(DialogOutcome::Cancelled);
    }
}

impl<T> PendingOutcome<T> {
    pub fn id(&self) -> DialogId {
        self.id
    }

    /// Wait for the dialog to close. A dropped resolver reads as cancelled.
    pub async fn wait(self) -> DialogOutcome<T> {
        self.rx.await.unwrap_or(DialogOutcome::Cancelled)
    }
}

/// Size class of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogSize {
    Small,
    Medium,
}

impl DialogSize {
    /// Width and height in terminal cells.
    pub fn dimensions(&self) -> (u16, u16) {
        match self {
            DialogSize::Small => (56, 20),
            DialogSize::Medium => (72, 22),
        }
    }
}

/// What a click outside the dialog does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    /// Outside clicks are ignored.
    Static,
    /// Outside clicks dismiss the dialog.
    Dismiss,
}

/// How a dialog is presented by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogConfig {
    /// View template identifier.
    pub template: &'static str,
    pub title: &'static str,
    pub size: DialogSize,
    pub backdrop: Backdrop,
    /// Whether Escape dismisses the dialog.
    pub keyboard: bool,
}

impl DialogConfig {
    pub fn dismisses_on_backdrop(&self) -> bool {
        self.backdrop == Backdrop::Dismiss
    }
}
