// Remote data gateway seam.
// Everything the dialogs need from the service, behind one async trait.

use async_trait::async_trait;

use crate::error::Result;

use super::client::HubClient;
use super::types::{ApiDocs, FormFields, PathEntry};

/// Remote operations consumed by the dialogs and the docs tab.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Children of `base_path`, in service order.
    async fn search_path(&self, base_path: &str) -> Result<Vec<PathEntry>>;

    async fn save_entity(&self, form: &FormFields) -> Result<()>;

    async fn save_flow(&self, form: &FormFields) -> Result<()>;

    async fn api_docs(&self, url: &str) -> Result<ApiDocs>;
}

#[async_trait]
impl DataGateway for HubClient {
    async fn search_path(&self, base_path: &str) -> Result<Vec<PathEntry>> {
        HubClient::search_path(self, base_path).await
    }

    async fn save_entity(&self, form: &FormFields) -> Result<()> {
        HubClient::save_entity(self, form).await
    }

    async fn save_flow(&self, form: &FormFields) -> Result<()> {
        HubClient::save_flow(self, form).await
    }

    async fn api_docs(&self, url: &str) -> Result<ApiDocs> {
        self.get_api_docs(url).await
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted in-memory gateway for unit tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::error::HubError;

    #[derive(Default)]
    pub struct FakeGateway {
        paths: Mutex<HashMap<String, Vec<String>>>,
        save_error: Mutex<Option<String>>,
        docs: Mutex<Option<ApiDocs>>,
        pub searches: Mutex<Vec<String>>,
        pub saved_entities: Mutex<Vec<FormFields>>,
        pub saved_flows: Mutex<Vec<FormFields>>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// Script the children returned for `path`. Unscripted paths fail with 500.
        pub fn with_children(self, path: &str, children: &[&str]) -> Self {
            self.paths.lock().unwrap().insert(
                path.to_string(),
                children.iter().map(|c| c.to_string()).collect(),
            );
            self
        }

        /// Make every save fail with a service error carrying `message`.
        pub fn failing_saves(self, message: &str) -> Self {
            *self.save_error.lock().unwrap() = Some(message.to_string());
            self
        }

        pub fn with_docs(self, docs: ApiDocs) -> Self {
            *self.docs.lock().unwrap() = Some(docs);
            self
        }

        pub fn search_count(&self, path: &str) -> usize {
            self.searches
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.as_str() == path)
                .count()
        }

        fn save_result(&self) -> Result<()> {
            match self.save_error.lock().unwrap().clone() {
                Some(message) => Err(HubError::Service {
                    status: 400,
                    message,
                }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl DataGateway for FakeGateway {
        async fn search_path(&self, base_path: &str) -> Result<Vec<PathEntry>> {
            self.searches.lock().unwrap().push(base_path.to_string());
            match self.paths.lock().unwrap().get(base_path) {
                Some(children) => Ok(children.iter().map(PathEntry::new).collect()),
                None => Err(HubError::Service {
                    status: 500,
                    message: format!("cannot list {}", base_path),
                }),
            }
        }

        async fn save_entity(&self, form: &FormFields) -> Result<()> {
            self.saved_entities.lock().unwrap().push(form.clone());
            self.save_result()
        }

        async fn save_flow(&self, form: &FormFields) -> Result<()> {
            self.saved_flows.lock().unwrap().push(form.clone());
            self.save_result()
        }

        async fn api_docs(&self, url: &str) -> Result<ApiDocs> {
            match self.docs.lock().unwrap().clone() {
                Some(docs) => Ok(docs),
                None => Err(HubError::Service {
                    status: 503,
                    message: format!("{} unavailable", url),
                }),
            }
        }
    }
}
