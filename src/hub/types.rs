// Data hub API types.
// Request and response bodies exchanged with the quick-start service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Form field values as sent to the save endpoints.
pub type FormFields = BTreeMap<String, String>;

/// One entry returned by a path search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub path: String,
}

impl PathEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Request body for a path search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPathRequest<'a> {
    pub path: &'a str,
}

/// Response body for a path search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPathResponse {
    #[serde(default)]
    pub paths: Vec<PathEntry>,
}

/// Error payload returned by the service on rejected requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Swagger document info block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    pub description: Option<String>,
}

/// Swagger 2.0 document, reduced to what the docs tab shows.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDocs {
    #[serde(default)]
    pub info: ApiInfo,
    pub base_path: Option<String>,
    #[serde(default)]
    pub paths: BTreeMap<String, serde_json::Value>,
}

/// A single documented operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOperation {
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
}

const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

impl ApiDocs {
    /// Flatten the path map into operations, ordered by path then method.
    pub fn operations(&self) -> Vec<ApiOperation> {
        let mut ops = Vec::new();
        for (path, item) in &self.paths {
            let Some(item) = item.as_object() else {
                continue;
            };
            for method in HTTP_METHODS {
                if let Some(op) = item.get(method) {
                    ops.push(ApiOperation {
                        method: method.to_uppercase(),
                        path: path.clone(),
                        summary: op
                            .get("summary")
                            .and_then(|s| s.as_str())
                            .map(str::to_string),
                    });
                }
            }
        }
        ops
    }
}
