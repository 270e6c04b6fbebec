// API documentation tab state.
// Fetches the service's swagger document and raises a blocking alert on failure.

use crate::error::{HubError, Result};
use crate::hub::{ApiDocs, ApiOperation};

use super::list::LoadingState;

pub const API_DOCS_URL: &str = "v2/api-docs";

#[derive(Debug, Clone)]
pub struct ApiDocView {
    pub loading: bool,
    pub url: String,
    /// Whether the info block is expanded.
    pub infos: bool,
    pub docs: LoadingState<ApiDocs>,
    pub operations: Vec<ApiOperation>,
    /// Blocking alert text; input is captured until it is acknowledged.
    pub alert: Option<String>,
    pub scroll: u16,
}

impl Default for ApiDocView {
    fn default() -> Self {
        Self {
            loading: false,
            url: API_DOCS_URL.to_string(),
            infos: false,
            docs: LoadingState::Idle,
            operations: Vec::new(),
            alert: None,
            scroll: 0,
        }
    }
}

impl ApiDocView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch unless one is running. Returns the URL to fetch.
    pub fn begin_load(&mut self) -> Option<String> {
        if self.loading {
            return None;
        }
        self.loading = true;
        self.docs = LoadingState::Loading;
        Some(self.url.clone())
    }

    /// Whether the tab still needs its first fetch.
    pub fn needs_load(&self) -> bool {
        matches!(self.docs, LoadingState::Idle)
    }

    pub fn complete_load(&mut self, result: Result<ApiDocs>) {
        self.loading = false;
        match result {
            Ok(docs) => {
                self.operations = docs.operations();
                self.docs = LoadingState::Loaded(docs);
                self.scroll = 0;
            }
            Err(e) => {
                self.on_error(&e);
                self.docs = LoadingState::Error(e.to_string());
            }
        }
    }

    /// Raise the load-failure alert.
    pub fn on_error(&mut self, error: &HubError) {
        let (status, payload) = error.status_and_payload();
        tracing::error!(status, %payload, "failed to load swagger");
        self.alert = Some(format!("Failed to load swagger: {}   {}", status, payload));
    }

    pub fn acknowledge_alert(&mut self) {
        self.alert = None;
    }

    pub fn toggle_infos(&mut self) {
        self.infos = !self.infos;
    }

    pub fn scroll_down(&mut self) {
        let last = u16::try_from(self.operations.len().saturating_sub(1)).unwrap_or(u16::MAX);
        if self.scroll < last {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}
