//! Column-level mapping between a source and a sink table
//!
//! Which source column feeds which sink column cannot be derived from the two
//! schemas alone, so the pairing is delegated to a [`CorrespondencePolicy`]
//! chosen per application by the [`PolicyRegistry`].

use crate::error::{EngineError, EngineResult};
use lb_core::{ApplicationName, ColumnPairConfig, MappingConfig, MappingPolicyConfig, QualifiedName};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

/// One source column feeding one sink column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Sink")]
    pub sink: String,
}

impl ColumnPair {
    pub fn new(source: impl Into<String>, sink: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            sink: sink.into(),
        }
    }
}

/// Source and sink dataset of a mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMapping {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Sink")]
    pub sink: String,
}

/// Column mapping attached to a process entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(rename = "DatasetMapping")]
    pub dataset_mapping: DatasetMapping,
    #[serde(rename = "ColumnMapping")]
    pub column_mapping: Vec<ColumnPair>,
}

impl ColumnMapping {
    /// Encode as the catalog expects it: a JSON string holding a one-element list.
    pub fn to_attribute_value(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(&[self])?)
    }
}

/// One side of a mapping: the table's qualified name and its column names
#[derive(Debug, Clone, Copy)]
pub struct MappingSide<'a> {
    pub qualified_name: &'a QualifiedName,
    pub columns: &'a [String],
}

/// Decides which source columns correspond to which sink columns
pub trait CorrespondencePolicy: Send + Sync + Debug {
    /// Policy identifier for logging
    fn name(&self) -> &'static str;

    fn correspond(&self, source: &[String], sink: &[String]) -> Vec<ColumnPair>;
}

/// Pairs every sink column with the source column of the same name
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPolicy;

impl CorrespondencePolicy for IdentityPolicy {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn correspond(&self, source: &[String], sink: &[String]) -> Vec<ColumnPair> {
        let mut paired = HashSet::new();
        sink.iter()
            .filter(|column| source.contains(column) && paired.insert(column.as_str()))
            .map(|column| ColumnPair::new(column.clone(), column.clone()))
            .collect()
    }
}

/// Dataset-level mapping only
#[derive(Debug, Clone, Copy, Default)]
pub struct NoColumnsPolicy;

impl CorrespondencePolicy for NoColumnsPolicy {
    fn name(&self) -> &'static str {
        "none"
    }

    fn correspond(&self, _source: &[String], _sink: &[String]) -> Vec<ColumnPair> {
        Vec::new()
    }
}

/// Operator-declared pairs, emitted as configured
#[derive(Debug, Clone, Default)]
pub struct ExplicitPolicy {
    pairs: Vec<ColumnPair>,
}

impl ExplicitPolicy {
    pub fn new(pairs: Vec<ColumnPair>) -> Self {
        Self { pairs }
    }
}

impl CorrespondencePolicy for ExplicitPolicy {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn correspond(&self, _source: &[String], _sink: &[String]) -> Vec<ColumnPair> {
        self.pairs.clone()
    }
}

fn policy_from_config(config: &MappingPolicyConfig) -> Arc<dyn CorrespondencePolicy> {
    match config {
        MappingPolicyConfig::Identity => Arc::new(IdentityPolicy),
        MappingPolicyConfig::None => Arc::new(NoColumnsPolicy),
        MappingPolicyConfig::Explicit { columns } => Arc::new(ExplicitPolicy::new(
            columns
                .iter()
                .map(|ColumnPairConfig { source, sink }| ColumnPair::new(source.clone(), sink.clone()))
                .collect(),
        )),
    }
}

/// Correspondence policies keyed by application
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    default: Option<Arc<dyn CorrespondencePolicy>>,
    by_application: HashMap<String, Arc<dyn CorrespondencePolicy>>,
}

impl PolicyRegistry {
    /// Empty registry: every lookup fails until policies are registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the identity policy as fallback
    pub fn identity_default() -> Self {
        Self::new().with_default(Arc::new(IdentityPolicy))
    }

    pub fn from_config(config: &MappingConfig) -> Self {
        let mut registry = Self {
            default: config.default.as_ref().map(policy_from_config),
            by_application: HashMap::new(),
        };
        for (application, policy) in &config.applications {
            registry.register(application.clone(), policy_from_config(policy));
        }
        registry
    }

    pub fn with_default(mut self, policy: Arc<dyn CorrespondencePolicy>) -> Self {
        self.default = Some(policy);
        self
    }

    pub fn register(&mut self, application: impl Into<String>, policy: Arc<dyn CorrespondencePolicy>) {
        self.by_application.insert(application.into(), policy);
    }

    /// Policy for an application, falling back to the default policy.
    pub fn resolve(&self, application: &ApplicationName) -> EngineResult<Arc<dyn CorrespondencePolicy>> {
        self.by_application
            .get(application.as_str())
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| EngineError::MappingPolicyMissing {
                application: application.to_string(),
            })
    }
}

/// Compute the mapping between one input table and the output table.
pub fn generate(
    input: MappingSide<'_>,
    output: MappingSide<'_>,
    policy: &dyn CorrespondencePolicy,
) -> ColumnMapping {
    let column_mapping = policy.correspond(input.columns, output.columns);
    log::debug!(
        "{} policy mapped {} columns from {} to {}",
        policy.name(),
        column_mapping.len(),
        input.qualified_name,
        output.qualified_name
    );
    ColumnMapping {
        dataset_mapping: DatasetMapping {
            source: input.qualified_name.to_string(),
            sink: output.qualified_name.to_string(),
        },
        column_mapping,
    }
}

#[cfg(test)]
#[path = "mapping_test.rs"]
mod tests;
