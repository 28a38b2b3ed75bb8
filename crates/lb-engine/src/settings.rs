//! Engine settings derived from the configuration file

use lb_core::Config;

/// Catalog type names and naming rules used while building entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub table_type: String,
    pub column_type: String,
    pub process_type: String,
    /// Type under which pre-existing datasets are fetched
    pub resolved_type: String,
    pub addressable_prefixes: Vec<String>,
    pub partition_suffix: String,
    /// Column `type` attribute when the schema has no type information
    pub default_column_type: String,
    pub process_suffix: String,
    /// Process description template
    pub description: String,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            table_type: config.catalog.table_type.clone(),
            column_type: config.catalog.column_type.clone(),
            process_type: config.catalog.process_type.clone(),
            resolved_type: config.catalog.resolved_type.clone(),
            addressable_prefixes: config.catalog.addressable_prefixes.clone(),
            partition_suffix: config.catalog.partition_suffix.clone(),
            default_column_type: config.engine.default_column_type.clone(),
            process_suffix: config.engine.process_suffix.clone(),
            description: config.engine.description.clone(),
        }
    }

    /// Render the process description for one run
    pub fn describe(&self, process_name: &str, application: &str) -> String {
        self.description
            .replace("{process_name}", process_name)
            .replace("{application}", application)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
