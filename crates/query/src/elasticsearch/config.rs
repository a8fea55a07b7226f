//! Elasticsearch client configuration.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::resolver::ResolverConfig;

/// Authentication configuration for Elasticsearch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElasticsearchAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

#[cfg(feature = "elasticsearch")]
impl ElasticsearchAuth {
    fn credentials(&self) -> elasticsearch::auth::Credentials {
        use elasticsearch::auth::Credentials;

        match self {
            ElasticsearchAuth::Basic { username, password } => {
                Credentials::Basic(username.clone(), password.clone())
            }
            ElasticsearchAuth::Bearer { token } => Credentials::Bearer(token.clone()),
        }
    }
}

/// Configuration for the Elasticsearch-backed type registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Elasticsearch node URLs. Registry lookups go to the first one.
    pub nodes: Vec<String>,

    /// Index holding parameter type records (default: `"parameter_types"`).
    #[serde(default = "default_registry_index")]
    pub registry_index: String,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticsearchAuth>,

    /// Maximum number of ids per registry lookup (default: 10000).
    #[serde(default = "default_lookup_batch_size")]
    pub lookup_batch_size: usize,
}

fn default_registry_index() -> String {
    "parameter_types".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30000
}

fn default_lookup_batch_size() -> usize {
    10000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            registry_index: default_registry_index(),
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
            lookup_batch_size: default_lookup_batch_size(),
        }
    }
}

impl ElasticsearchConfig {
    /// Resolver settings derived from this configuration.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            lookup_batch_size: self.lookup_batch_size,
        }
    }

    /// Returns the node the registry talks to.
    pub fn registry_node(&self) -> Result<&str, RegistryError> {
        self.nodes
            .first()
            .map(|node| node.trim())
            .filter(|node| !node.is_empty())
            .ok_or_else(|| RegistryError::Unavailable {
                message: "no Elasticsearch node configured".to_string(),
            })
    }

    /// Builds a single-node client for registry lookups.
    #[cfg(feature = "elasticsearch")]
    pub fn build_client(&self) -> Result<elasticsearch::Elasticsearch, RegistryError> {
        use std::time::Duration;

        use elasticsearch::Elasticsearch;
        use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};

        let url = self
            .registry_node()?
            .parse::<elasticsearch::http::Url>()
            .map_err(|e| RegistryError::Unavailable {
                message: format!("Invalid URL: {}", e),
            })?;

        let mut builder = TransportBuilder::new(SingleNodeConnectionPool::new(url))
            .timeout(Duration::from_millis(self.request_timeout_ms));
        if let Some(credentials) = self.auth.as_ref().map(ElasticsearchAuth::credentials) {
            builder = builder.auth(credentials);
        }

        let transport = builder.build().map_err(|e| RegistryError::Unavailable {
            message: format!("Failed to build transport: {}", e),
        })?;
        Ok(Elasticsearch::new(transport))
    }
}
