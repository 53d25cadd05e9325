use std::path::PathBuf;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::Deserialize;

const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const DEFAULT_USER_AGENT: &str = concat!("wiki_deaths/", env!("CARGO_PKG_VERSION"));

/// Runtime knobs, overridable through `WIKIDEATHS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub user_agent: String,
    /// Category members requested per API call.
    pub page_size: u32,
    /// Stop each year's scan after this many rows.
    pub limit: Option<usize>,
    pub output_dir: PathBuf,
    pub category_prefix: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder().add_source(Environment::with_prefix("WIKIDEATHS").try_parsing(true)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("page_size", 500_i64)?
            .set_default("output_dir", ".")?
            .set_default("category_prefix", "Category:")?
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }
}
