use clap::Parser;
use serde::Deserialize;
use snafu::{ResultExt, ensure};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::Result;
use crate::error::{ConfigFileSnafu, ConfigParseSnafu, ConfigSnafu};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub assets_dir: PathBuf,
}

/// Upstream catalog settings, handed to the query pipeline as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Batch size fetched for keyword searches before local filtering.
    #[serde(default = "default_keyword_rows")]
    pub keyword_rows: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_per_page() -> u32 {
    20
}

fn default_keyword_rows() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    10
}

impl CatalogConfig {
    #[cfg(test)]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            per_page: default_per_page(),
            keyword_rows: default_keyword_rows(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn build(filename: &PathBuf) -> Result<Self> {
        let toml_string = fs::read_to_string(filename).context(ConfigFileSnafu)?;
        Self::parse(toml_string.as_str())
    }

    pub fn parse(toml_string: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_string).context(ConfigParseSnafu)?;

        // Validate config values
        ensure!(
            config.server.port > 0,
            ConfigSnafu {
                msg: "Server port is required.".to_string()
            }
        );
        ensure!(
            config.server.assets_dir.exists(),
            ConfigSnafu {
                msg: "Assets directory does not exist.".to_string()
            }
        );
        ensure!(
            config.catalog.base_url.trim().len() > 0,
            ConfigSnafu {
                msg: "Catalog base URL is required.".to_string()
            }
        );
        ensure!(
            config.catalog.per_page > 0,
            ConfigSnafu {
                msg: "Catalog page size must be greater than zero.".to_string()
            }
        );
        ensure!(
            config.catalog.keyword_rows > 0,
            ConfigSnafu {
                msg: "Keyword batch size must be greater than zero.".to_string()
            }
        );
        ensure!(
            config.catalog.timeout_secs > 0,
            ConfigSnafu {
                msg: "Catalog request timeout must be greater than zero.".to_string()
            }
        );

        Ok(config)
    }
}

/// Open data catalog browser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, value_name = "config.toml")]
    pub config: PathBuf,
}
