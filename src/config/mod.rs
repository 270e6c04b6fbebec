// Configuration module.
// Loads settings from the config file, environment and command line.

pub mod paths;
pub mod store;

use std::path::{Path, PathBuf};

use clap::Parser;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

pub const ENV_URL: &str = "QUICKSTART_URL";
pub const ENV_BASE_PATH: &str = "QUICKSTART_BASE_PATH";

/// Command line arguments.
#[derive(Debug, Default, Parser)]
#[command(name = "quickstart", version, about = "Data hub quick-start console")]
pub struct CliArgs {
    /// Path to an alternate config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the data hub service.
    #[arg(long)]
    pub url: Option<String>,

    /// Base path whose children seed the load-data tree.
    #[arg(long)]
    pub base_path: Option<String>,
}

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the data hub service.
    pub base_url: String,
    /// Path searched when the load-data tree is seeded.
    pub base_path: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// tracing filter directive, e.g. "quickstart=debug".
    pub log_filter: Option<String>,
    /// Module extension passed to new flows.
    pub default_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_string(),
            base_path: String::new(),
            request_timeout_secs: 30,
            log_filter: None,
            default_extension: "sjs".to_string(),
        }
    }
}

impl Config {
    /// Resolve the effective config: file, then environment, then CLI flags.
    pub fn load(args: &CliArgs) -> Result<Self> {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => paths::config_path()
                .ok_or_else(|| HubError::Config("no home directory".to_string()))?,
        };

        let mut config = Self::load_or_init(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Read the config file, writing defaults if it does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        match store::read_json::<Config>(path)? {
            Some(config) => Ok(config),
            None => {
                let config = Config::default();
                store::write_json(path, &config)?;
                tracing::info!(path = %path.display(), "wrote default config");
                Ok(config)
            }
        }
    }

    /// Apply environment overrides through the given lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_URL) {
            self.base_url = url;
        }
        if let Some(base_path) = lookup(ENV_BASE_PATH) {
            self.base_path = base_path;
        }
    }

    pub fn apply_args(&mut self, args: &CliArgs) {
        if let Some(url) = &args.url {
            self.base_url = url.clone();
        }
        if let Some(base_path) = &args.base_path {
            self.base_path = base_path.clone();
        }
    }

    /// Check the base URL and normalize it to end with a slash.
    pub fn validate(&mut self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| HubError::Config(format!("base_url {:?}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HubError::Config(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        Ok(())
    }

    /// Parsed base URL. Only valid after `validate`.
    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| HubError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_or_init_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // Second load reads what was written
        let again = Config::load_or_init(&path).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{ "base_url": "http://hub:9000" }"#).unwrap();

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config.base_url, "http://hub:9000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.default_extension, "sjs");
    }

    #[test]
    fn test_precedence_env_then_args() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            ENV_URL => Some("http://env:1/".to_string()),
            ENV_BASE_PATH => Some("env-input".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://env:1/");
        assert_eq!(config.base_path, "env-input");

        let args = CliArgs {
            url: Some("http://cli:2".to_string()),
            ..Default::default()
        };
        config.apply_args(&args);
        assert_eq!(config.base_url, "http://cli:2");
        assert_eq!(config.base_path, "env-input");
    }

    #[test]
    fn test_validate_appends_slash() {
        let mut config = Config {
            base_url: "http://localhost:8080/hub".to_string(),
            ..Default::default()
        };
        config.validate().unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/hub/");
        assert_eq!(
            config.base().unwrap().join("v2/api-docs").unwrap().as_str(),
            "http://localhost:8080/hub/v2/api-docs"
        );
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = Config {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HubError::Config(_))));

        let mut config = Config {
            base_url: "ftp://hub/".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HubError::Config(_))));
    }
}
