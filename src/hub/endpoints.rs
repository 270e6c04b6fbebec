// Data hub endpoint functions.
// Typed methods for the path search, save and API documentation calls.

use crate::error::Result;

use super::client::HubClient;
use super::types::{ApiDocs, FormFields, PathEntry, SearchPathRequest, SearchPathResponse};

const SEARCH_PATH: &str = "api/utils/searchPath";
const ENTITIES: &str = "api/entities/";
const FLOWS: &str = "api/flows";

impl HubClient {
    /// List the children of a path on the service host.
    pub async fn search_path(&self, path: &str) -> Result<Vec<PathEntry>> {
        let response = self
            .post_json(SEARCH_PATH, &SearchPathRequest { path })
            .await?;
        let wrapper: SearchPathResponse = response.json().await?;
        tracing::debug!(path, count = wrapper.paths.len(), "searched path");
        Ok(wrapper.paths)
    }

    /// Persist a new entity.
    pub async fn save_entity(&self, form: &FormFields) -> Result<()> {
        self.post_json(ENTITIES, form).await?;
        Ok(())
    }

    /// Persist a new flow.
    pub async fn save_flow(&self, form: &FormFields) -> Result<()> {
        self.post_json(FLOWS, form).await?;
        Ok(())
    }

    /// Fetch the swagger document at the given relative URL.
    pub async fn get_api_docs(&self, url: &str) -> Result<ApiDocs> {
        let response = self.get(url).await?;
        let docs: ApiDocs = response.json().await?;
        Ok(docs)
    }
}
