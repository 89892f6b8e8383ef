//! Command-line argument parsing for dqpulse.

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{PulseError, Result};

/// Data-quality metrics runner.
#[derive(Parser, Debug)]
#[command(name = "dqpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Data gateway URL (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    pub gateway_url: Option<String>,

    /// Query store database path (overrides config)
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every stored query once and publish the results
    Run {
        /// Print the prometheus text exposition after the pass
        #[arg(long)]
        print_metrics: bool,
    },

    /// Format and execute a single query, printing the scalar result
    Exec {
        /// Raw query template with $name placeholders
        #[arg(long, value_name = "SQL", conflicts_with = "query_id")]
        template: Option<String>,

        /// Id of a stored query definition to run
        #[arg(long, value_name = "UUID")]
        query_id: Option<Uuid>,

        /// Parameters as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}")]
        params: String,
    },

    /// Store a new query definition
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Raw query template with $name placeholders
        #[arg(long, value_name = "SQL")]
        template: String,

        /// Default parameters as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}")]
        params: String,

        /// Owning product/tenant id
        #[arg(long, value_name = "UUID")]
        product_id: Uuid,
    },

    /// List stored query definitions
    List,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies CLI flag overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.gateway_url {
            config.gateway.url = url.clone();
        }
        if let Some(path) = &self.store {
            config.store.path = path.clone();
        }
    }
}

/// Parses a `--params` JSON string into a parameter map.
pub fn parse_params(raw: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| PulseError::config(format!("Invalid --params JSON: {e}")))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PulseError::config("--params must be a JSON object")),
    }
}
