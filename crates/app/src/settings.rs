//! Layered settings: optional TOML file, then `FARMDESK_*` environment
//! variables, then command-line overrides.
//!
//! ```toml
//! level = "info"
//!
//! [backend]
//! base_url = "https://records.example.com/api"
//! project_id = "..."
//! public_key = "..."
//! timeout_secs = 30
//! ```
//!
//! Nested keys use `__` in the environment, e.g. `FARMDESK_BACKEND__BASE_URL`.

use std::time::Duration;

use serde::Deserialize;
use store_client::StoreConfig;

use crate::{cli::ConnectionArgs, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/farmdesk.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub level: String,
    pub backend: Backend,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            backend: Backend::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Backend {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout_secs: u64,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            project_id: String::new(),
            public_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(
            &self.backend.base_url,
            &self.backend.project_id,
            &self.backend.public_key,
        )
        .timeout(Duration::from_secs(self.backend.timeout_secs))
    }

    /// Env filter directive for the binary and the library crates.
    pub fn log_filter(&self) -> String {
        format!(
            "farmdesk={level},engine={level},store_client={level}",
            level = self.level
        )
    }
}

pub fn load(args: &ConnectionArgs) -> Result<Settings> {
    let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    layered(config::File::with_name(path).required(false), args)
}

fn layered<F>(file: F, args: &ConnectionArgs) -> Result<Settings>
where
    F: config::Source + Send + Sync + 'static,
{
    let mut settings: Settings = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("FARMDESK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if let Some(base_url) = &args.base_url {
        settings.backend.base_url = base_url.clone();
    }
    if let Some(project_id) = &args.project_id {
        settings.backend.project_id = project_id.clone();
    }
    if let Some(public_key) = &args.public_key {
        settings.backend.public_key = public_key.clone();
    }

    Ok(settings)
}
