//! Configuration types and parsing for lineagebridge.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file, overridden by `--config`
pub const CONFIG_ENV_VAR: &str = "LB_CONFIG";

const CONFIG_FILE_NAMES: [&str; 2] = ["lineagebridge.yml", "lineagebridge.yaml"];

/// Main configuration from lineagebridge.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Catalog backend and catalog-side type names
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Translation engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Column correspondence policies per application
    #[serde(default)]
    pub mapping: MappingConfig,

    /// HTTP ingestion endpoint and landing area
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Secrets required at startup
    #[serde(default)]
    pub secrets: SecretsConfig,
}

/// Catalog backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    /// Process-local catalog, lost on exit
    Memory,
    /// JSON file persisted after every upload (default)
    #[default]
    File,
}

impl std::fmt::Display for CatalogBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogBackend::Memory => write!(f, "memory"),
            CatalogBackend::File => write!(f, "file"),
        }
    }
}

/// Catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default)]
    pub backend: CatalogBackend,

    /// Path of the JSON catalog file (file backend only)
    #[serde(default = "default_catalog_path")]
    pub path: String,

    /// Collection uploaded batches are filed under
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Type name of newly built tables
    #[serde(default = "default_table_type")]
    pub table_type: String,

    /// Type name of newly built columns
    #[serde(default = "default_column_type")]
    pub column_type: String,

    /// Type name of process entities
    #[serde(default = "default_process_type")]
    pub process_type: String,

    /// Type name under which pre-existing datasets are fetched
    #[serde(default = "default_resolved_type")]
    pub resolved_type: String,

    /// Qualified-name prefixes the catalog can look up
    #[serde(default = "default_addressable_prefixes")]
    pub addressable_prefixes: Vec<String>,

    /// Suffix the catalog appends to partitioned dataset names
    #[serde(default = "default_partition_suffix")]
    pub partition_suffix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::default(),
            path: default_catalog_path(),
            collection: default_collection(),
            table_type: default_table_type(),
            column_type: default_column_type(),
            process_type: default_process_type(),
            resolved_type: default_resolved_type(),
            addressable_prefixes: default_addressable_prefixes(),
            partition_suffix: default_partition_suffix(),
        }
    }
}

/// Translation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// First placeholder guid handed out; must be negative
    #[serde(default = "default_guid_start")]
    pub guid_start: i64,

    /// Column `type` attribute used when the schema carries no type
    #[serde(default = "default_column_data_type")]
    pub default_column_type: String,

    /// Appended to the process name to form the process qualified name
    #[serde(default = "default_process_suffix")]
    pub process_suffix: String,

    /// Process description; `{process_name}` and `{application}` are substituted
    #[serde(default = "default_description")]
    pub description: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            guid_start: default_guid_start(),
            default_column_type: default_column_data_type(),
            process_suffix: default_process_suffix(),
            description: default_description(),
        }
    }
}

/// Column correspondence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    /// Policy for applications without an explicit entry; `null` disables the fallback
    #[serde(default = "default_mapping_policy")]
    pub default: Option<MappingPolicyConfig>,

    /// Policies keyed by application short name
    #[serde(default)]
    pub applications: HashMap<String, MappingPolicyConfig>,
}

/// How source columns correspond to sink columns for one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum MappingPolicyConfig {
    /// Pair columns that share a name
    Identity,
    /// Dataset-level mapping only
    None,
    /// Operator-declared pairs
    Explicit { columns: Vec<ColumnPairConfig> },
}

/// One declared source → sink column pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnPairConfig {
    pub source: String,
    pub sink: String,
}

/// Ingestion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Socket address the HTTP endpoint binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Root directory of the landing area
    #[serde(default = "default_landing_root")]
    pub landing_root: String,

    /// First segment of landing paths
    #[serde(default = "default_zone")]
    pub zone: String,

    /// Second segment of landing paths
    #[serde(default = "default_source")]
    pub source: String,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Translate and upload each landed event right away
    #[serde(default)]
    pub process_inline: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            landing_root: default_landing_root(),
            zone: default_zone(),
            source: default_source(),
            max_body_bytes: default_max_body_bytes(),
            process_inline: false,
        }
    }
}

/// Secrets configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretsConfig {
    /// Names that must be available before the service starts
    #[serde(default)]
    pub names: Vec<String>,

    /// Skip secret retrieval entirely (local development)
    #[serde(default)]
    pub local: bool,
}

fn default_catalog_path() -> String {
    "catalog.json".to_string()
}

fn default_collection() -> String {
    "lineage".to_string()
}

fn default_table_type() -> String {
    "spark_table".to_string()
}

fn default_column_type() -> String {
    "spark_column".to_string()
}

fn default_process_type() -> String {
    "azure_synapse_operation".to_string()
}

fn default_resolved_type() -> String {
    "azure_datalake_gen2_resource_set".to_string()
}

fn default_addressable_prefixes() -> Vec<String> {
    vec!["https://".to_string()]
}

fn default_partition_suffix() -> String {
    "/{SparkPartitions}".to_string()
}

fn default_guid_start() -> i64 {
    -1000
}

fn default_column_data_type() -> String {
    "string".to_string()
}

fn default_process_suffix() -> String {
    "_process".to_string()
}

fn default_description() -> String {
    "Spark job {process_name} reported by {application}".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:7071".to_string()
}

fn default_landing_root() -> String {
    "landing".to_string()
}

fn default_zone() -> String {
    "landingzone".to_string()
}

fn default_source() -> String {
    "spline".to_string()
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_mapping_policy() -> Option<MappingPolicyConfig> {
    Some(MappingPolicyConfig::Identity)
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            default: default_mapping_policy(),
            applications: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for lineagebridge.yml or lineagebridge.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Err(CoreError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            }),
        }
    }

    /// Load from the directory if a config file exists there, else use defaults
    pub fn load_from_dir_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!(
                    "No config file in {}, using built-in defaults",
                    dir.display()
                );
                Ok(Self::default())
            }
        }
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Resolve the config file path from a CLI flag or the LB_CONFIG env var.
    ///
    /// Returns `None` when neither is set, meaning directory discovery applies.
    pub fn resolve_path(cli_path: Option<&str>) -> Option<String> {
        cli_path
            .map(String::from)
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
            .filter(|p| !p.is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.engine.guid_start >= 0 {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "engine.guid_start must be negative, found {}",
                    self.engine.guid_start
                ),
            });
        }

        let required = [
            ("catalog.collection", &self.catalog.collection),
            ("catalog.table_type", &self.catalog.table_type),
            ("catalog.column_type", &self.catalog.column_type),
            ("catalog.process_type", &self.catalog.process_type),
            ("catalog.resolved_type", &self.catalog.resolved_type),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("{field} cannot be empty"),
                });
            }
        }

        if self.catalog.addressable_prefixes.iter().any(|p| p.is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "catalog.addressable_prefixes cannot contain an empty prefix".to_string(),
            });
        }

        if self.ingest.max_body_bytes == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "ingest.max_body_bytes must be greater than zero".to_string(),
            });
        }

        let policies = self
            .mapping
            .applications
            .iter()
            .map(|(app, policy)| (app.as_str(), policy))
            .chain(self.mapping.default.iter().map(|p| ("default", p)));
        for (app, policy) in policies {
            if let MappingPolicyConfig::Explicit { columns } = policy {
                if columns
                    .iter()
                    .any(|pair| pair.source.is_empty() || pair.sink.is_empty())
                {
                    return Err(CoreError::ConfigInvalid {
                        message: format!(
                            "mapping policy for '{app}' has a column pair with an empty name"
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Landing root as an absolute path relative to a base directory
    pub fn landing_root_absolute(&self, base: &Path) -> PathBuf {
        base.join(&self.ingest.landing_root)
    }

    /// Catalog file as an absolute path relative to a base directory
    pub fn catalog_path_absolute(&self, base: &Path) -> PathBuf {
        base.join(&self.catalog.path)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
