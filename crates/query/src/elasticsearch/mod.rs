//! Elasticsearch compilation target.
//!
//! Conditions compile to a single `bool` query over the inventory index:
//!
//! - **Static attributes** live at the document root and use native typed
//!   clauses (`match`, `terms`, `range`, `wildcard`, `prefix`).
//! - **Dynamic parameters** live under `parameters.<id>` as keywords. Equality
//!   and membership use `term`/`terms`; ordering and text patterns parse the
//!   stored keyword inside a Painless script.
//!
//! Sorting follows the same split: native sort for attributes, `_script`
//! sort for parameters.
//!
//! # Example
//!
//! ```ignore
//! use inventory_query::elasticsearch::{ElasticsearchConfig, EsTypeRegistry};
//!
//! let config = ElasticsearchConfig {
//!     nodes: vec!["http://localhost:9200".to_string()],
//!     ..Default::default()
//! };
//! let registry = EsTypeRegistry::from_config(&config)?;
//! ```

pub mod clause;
mod config;
pub mod operators;
mod parser;
mod query_builder;
#[cfg(feature = "elasticsearch")]
mod registry;
pub mod script;
mod sort_builder;

pub use config::{ElasticsearchAuth, ElasticsearchConfig};
pub use parser::{EsBool, EsOperator, EsParser};
pub use query_builder::{BoolQuery, Bucket, EsQueryBuilder};
#[cfg(feature = "elasticsearch")]
pub use registry::EsTypeRegistry;
pub use sort_builder::EsSortBuilder;
