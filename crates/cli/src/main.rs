//! Inventory Query CLI
//!
//! Reads filter and sort JSON, resolves parameter types and prints the
//! compiled Elasticsearch search body.

mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tracing::info;

use inventory_query::types::{parse_filters, parse_sort};
use inventory_query::{
    FilterCompiler, InMemoryRegistry, ParameterTypeRecord, ResolverConfig, TypeRegistry,
};

use crate::config::CliConfig;

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("invq={0},inventory_query={0}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Reads a JSON document, or `[]` when no path is given.
fn read_json(path: Option<&Path>) -> anyhow::Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Array(Vec::new()));
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Builds the type registry selected by the configuration.
fn create_registry(config: &CliConfig) -> anyhow::Result<Arc<dyn TypeRegistry>> {
    #[cfg(feature = "elasticsearch")]
    if let Some(url) = &config.es_url {
        use inventory_query::elasticsearch::{ElasticsearchAuth, ElasticsearchConfig, EsTypeRegistry};

        let auth = match (&config.es_username, &config.es_password) {
            (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };
        let es_config = ElasticsearchConfig {
            nodes: vec![url.clone()],
            registry_index: config.registry_index.clone(),
            auth,
            lookup_batch_size: config.lookup_batch_size,
            ..Default::default()
        };
        return Ok(Arc::new(EsTypeRegistry::from_config(&es_config)?));
    }

    let records: Vec<ParameterTypeRecord> =
        serde_json::from_value(read_json(config.registry.as_deref())?)
            .context("Invalid registry snapshot")?;
    info!(records = records.len(), "Loaded registry snapshot");
    Ok(Arc::new(records.into_iter().collect::<InMemoryRegistry>()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(2);
    }

    let filters = parse_filters(read_json(config.filters.as_deref())?)?;
    let sort = parse_sort(read_json(config.sort.as_deref())?)?;

    let compiler = FilterCompiler::new(create_registry(&config)?).with_config(ResolverConfig {
        lookup_batch_size: config.lookup_batch_size,
    });

    info!(
        filters = filters.len(),
        sort = sort.len(),
        "Compiling search"
    );

    let body = compiler.compile(&filters, &sort).await?.to_body();
    let output = if config.pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{}", output);

    Ok(())
}
