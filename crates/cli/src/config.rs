//! Command line configuration.

use std::path::PathBuf;

use clap::Parser;

/// Command line configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "invq")]
#[command(about = "Compile inventory filters into an Elasticsearch search body")]
pub struct CliConfig {
    /// JSON file with an array of filter columns.
    #[arg(long, env = "INVQ_FILTERS")]
    pub filters: Option<PathBuf>,

    /// JSON file with an array of sort columns.
    #[arg(long, env = "INVQ_SORT")]
    pub sort: Option<PathBuf>,

    /// JSON file with a snapshot of parameter type records.
    #[arg(long, env = "INVQ_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Elasticsearch URL of the live type registry.
    #[arg(long, env = "INVQ_ES_URL")]
    pub es_url: Option<String>,

    /// Elasticsearch username.
    #[arg(long, env = "INVQ_ES_USERNAME")]
    pub es_username: Option<String>,

    /// Elasticsearch password.
    #[arg(long, env = "INVQ_ES_PASSWORD")]
    pub es_password: Option<String>,

    /// Index holding parameter type records.
    #[arg(long, env = "INVQ_REGISTRY_INDEX", default_value = "parameter_types")]
    pub registry_index: String,

    /// Maximum number of ids per registry lookup.
    #[arg(long, env = "INVQ_LOOKUP_BATCH_SIZE", default_value = "10000")]
    pub lookup_batch_size: usize,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "INVQ_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Pretty-print the search body.
    #[arg(long, env = "INVQ_PRETTY", default_value = "false")]
    pub pretty: bool,
}

impl CliConfig {
    /// Validates option combinations, returning every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.registry.is_some() && self.es_url.is_some() {
            errors.push("--registry and --es-url are mutually exclusive".to_string());
        }
        if self.es_username.is_some() != self.es_password.is_some() {
            errors.push("--es-username and --es-password must be given together".to_string());
        }
        if self.lookup_batch_size == 0 {
            errors.push("--lookup-batch-size must be positive".to_string());
        }
        if cfg!(not(feature = "elasticsearch")) && self.es_url.is_some() {
            errors.push("--es-url requires the 'elasticsearch' feature".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
