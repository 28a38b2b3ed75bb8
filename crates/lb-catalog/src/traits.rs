//! Catalog trait definition and request/response types

use crate::error::CatalogResult;
use async_trait::async_trait;
use lb_core::{CatalogEntity, Guid};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Comparison applied by a [`QueryFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Exact match
    Eq,
}

/// Attribute filter of a discovery query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    pub attribute_name: String,
    pub operator: FilterOperator,
    pub attribute_value: String,
}

impl QueryFilter {
    /// Exact match on an attribute
    pub fn eq(attribute_name: impl Into<String>, attribute_value: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            operator: FilterOperator::Eq,
            attribute_value: attribute_value.into(),
        }
    }

    /// Returns true if `candidate` satisfies the filter
    pub fn matches(&self, candidate: &str) -> bool {
        match self.operator {
            FilterOperator::Eq => candidate == self.attribute_value,
        }
    }
}

/// Result of a discovery query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "@search.count")]
    pub count: usize,
    #[serde(rename = "value", default)]
    pub matches: Vec<Value>,
}

/// An entity the catalog declined to store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedEntity {
    pub guid: Guid,
    pub type_name: String,
    pub qualified_name: String,
    pub reason: String,
}

impl std::fmt::Display for RejectedEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({}): {}",
            self.type_name, self.qualified_name, self.guid, self.reason
        )
    }
}

/// Outcome of a batch upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Placeholder guid to catalog-assigned guid
    #[serde(default)]
    pub guid_assignments: BTreeMap<String, String>,

    /// Qualified names stored by this upload, created or updated
    #[serde(default)]
    pub stored: Vec<String>,

    /// Qualified names referenced by catalog guid and left untouched
    #[serde(default)]
    pub unchanged: Vec<String>,

    /// Entities the catalog declined
    #[serde(default)]
    pub rejected: Vec<RejectedEntity>,
}

impl UploadResult {
    /// Returns true if every entity in the batch was accepted
    pub fn is_accepted(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Catalog guid assigned to a placeholder, if any
    pub fn assigned_guid(&self, placeholder: &Guid) -> Option<&str> {
        self.guid_assignments
            .get(&placeholder.to_string())
            .map(String::as_str)
    }
}

/// Catalog abstraction for lineagebridge
///
/// Implementations must be Send + Sync; one instance is shared by every
/// concurrent translation.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Discovery query: how many entities match the filter, and which
    async fn query(&self, filter: &QueryFilter) -> CatalogResult<SearchResult>;

    /// Fetch an entity by type and qualified name.
    ///
    /// Returns the `{"entities": [...]}` envelope, or `None` if nothing matches.
    async fn get_entity(&self, type_name: &str, qualified_name: &str)
        -> CatalogResult<Option<Value>>;

    /// Upload a batch of entities into a collection
    async fn upload(&self, batch: &[CatalogEntity], collection: &str)
        -> CatalogResult<UploadResult>;

    /// Catalog type identifier for logging
    fn catalog_type(&self) -> &'static str;
}
