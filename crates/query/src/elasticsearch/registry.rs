//! Type registry backed by an Elasticsearch index.

use async_trait::async_trait;
use elasticsearch::{Elasticsearch, SearchParts};
use serde_json::{Value, json};

use crate::error::RegistryError;
use crate::registry::{ParameterTypeRecord, TypeRegistry};

use super::config::ElasticsearchConfig;

/// Looks up parameter types with a `terms` query on the registry index.
pub struct EsTypeRegistry {
    client: Elasticsearch,
    index: String,
}

impl std::fmt::Debug for EsTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsTypeRegistry")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl EsTypeRegistry {
    /// Creates a registry over an existing client.
    pub fn new(client: Elasticsearch, index: impl Into<String>) -> Self {
        Self {
            client,
            index: index.into(),
        }
    }

    /// Builds the client from configuration.
    pub fn from_config(config: &ElasticsearchConfig) -> Result<Self, RegistryError> {
        let client = config.build_client()?;
        let node = config.registry_node()?;
        tracing::info!(
            node,
            index = %config.registry_index,
            "Elasticsearch type registry configured"
        );
        Ok(Self::new(client, config.registry_index.clone()))
    }

    /// Returns the registry index name.
    pub fn index(&self) -> &str {
        &self.index
    }
}

/// Request body for one lookup chunk.
pub(crate) fn lookup_body(ids: &[u64]) -> Value {
    json!({
        "query": { "terms": { "id": ids } },
        "size": ids.len(),
        "_source": ["id", "val_type", "multiple"]
    })
}

/// Decodes the hits of a lookup response.
pub(crate) fn parse_hits(body: &Value) -> Result<Vec<ParameterTypeRecord>, RegistryError> {
    let hits = body
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(|h| h.as_array())
        .ok_or_else(|| RegistryError::InvalidResponse {
            message: "response has no hits array".to_string(),
        })?;

    hits.iter()
        .filter_map(|hit| hit.get("_source"))
        .map(|source| {
            serde_json::from_value(source.clone()).map_err(|e| RegistryError::InvalidResponse {
                message: format!("Failed to decode registry record: {}", e),
            })
        })
        .collect()
}

#[async_trait]
impl TypeRegistry for EsTypeRegistry {
    async fn lookup(&self, ids: &[u64]) -> Result<Vec<ParameterTypeRecord>, RegistryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .search(SearchParts::Index(&[&self.index]))
            .body(lookup_body(ids))
            .send()
            .await
            .map_err(|e| RegistryError::Unavailable {
                message: format!("Registry search failed: {}", e),
            })?;

        if !response.status_code().is_success() {
            let status = response.status_code();
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Unavailable {
                message: format!("Registry search returned {}: {}", status, body),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse {
                message: format!("Failed to parse registry response: {}", e),
            })?;

        let records = parse_hits(&body)?;
        tracing::debug!(
            requested = ids.len(),
            found = records.len(),
            index = %self.index,
            "registry lookup complete"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueTypeKind;

    #[test]
    fn test_lookup_body() {
        assert_eq!(
            lookup_body(&[3, 7]),
            json!({
                "query": {"terms": {"id": [3, 7]}},
                "size": 2,
                "_source": ["id", "val_type", "multiple"]
            })
        );
    }

    #[test]
    fn test_parse_hits() {
        let body = json!({"hits": {"total": {"value": 2}, "hits": [
            {"_id": "a", "_source": {"id": 3, "val_type": "str", "multiple": true}},
            {"_id": "b", "_source": {"id": 7, "val_type": "int"}}
        ]}});
        assert_eq!(
            parse_hits(&body).unwrap(),
            vec![
                ParameterTypeRecord::new(3, ValueTypeKind::String, true),
                ParameterTypeRecord::new(7, ValueTypeKind::Integer, false),
            ]
        );
    }

    #[test]
    fn test_parse_hits_rejects_garbage() {
        assert!(matches!(
            parse_hits(&json!({"error": "boom"})),
            Err(RegistryError::InvalidResponse { .. })
        ));
        let body = json!({"hits": {"hits": [{"_source": {"id": "x", "val_type": "str"}}]}});
        assert!(parse_hits(&body).is_err());
    }
}
