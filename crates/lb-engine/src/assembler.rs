//! Lineage event to catalog graph translation
//!
//! The assembler resolves every dataset of an event against the catalog,
//! builds the tables and columns that do not exist yet, computes the column
//! mapping, and wires everything to a single process entity.
//!
//! The column mapping is computed against the first input only. Multi-input
//! runs (joins) get a dataset-level link to every input through the process
//! `inputs`, but column pairs only for the primary input.
//!
//! A dataset that appears more than once in an event (a self-join, or an
//! output written in place) is resolved or built once. The process `inputs`
//! is a set keyed by qualified name, so it can hold fewer tables than the
//! event declares inputs. Columns that only a later occurrence declares are
//! not built.

use crate::builder::{build_table, BuiltTable};
use crate::error::EngineResult;
use crate::guid::GuidAllocator;
use crate::mapping::{generate, ColumnMapping, MappingSide, PolicyRegistry};
use crate::process::build_process;
use crate::resolver::EntityResolver;
use crate::settings::EngineSettings;
use chrono::{DateTime, Utc};
use lb_catalog::Catalog;
use lb_core::{CatalogEntity, Config, DatasetDescriptor, LineageEvent, QualifiedName};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Where a table of the batch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOrigin {
    /// Already in the catalog; participates by reference
    Resolved,
    /// Built during this translation
    Built,
    /// Same qualified name as an earlier dataset of the event
    Repeated,
}

/// A table of the batch together with the columns built for it
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledTable {
    pub table: CatalogEntity,
    /// Empty unless the table was built
    pub columns: Vec<CatalogEntity>,
    pub origin: TableOrigin,
}

impl AssembledTable {
    fn resolved(table: CatalogEntity) -> Self {
        Self {
            table,
            columns: Vec::new(),
            origin: TableOrigin::Resolved,
        }
    }

    fn built(built: BuiltTable) -> Self {
        Self {
            table: built.table,
            columns: built.columns,
            origin: TableOrigin::Built,
        }
    }

    /// Whether the table (and its columns) belong in the upload batch
    fn is_uploaded(&self) -> bool {
        self.origin != TableOrigin::Repeated
    }
}

/// Everything produced by translating one event
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledBatch {
    pub inputs: Vec<AssembledTable>,
    pub output: AssembledTable,
    pub mapping: ColumnMapping,
    pub process: CatalogEntity,
}

/// Entity counts of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub tables: usize,
    pub columns: usize,
    pub processes: usize,
    /// Tables that already existed in the catalog
    pub resolved: usize,
}

impl AssembledBatch {
    /// The upload batch in order: input tables, input columns, output
    /// columns, output table, process.
    pub fn entities(&self) -> Vec<&CatalogEntity> {
        let uploaded_inputs = || self.inputs.iter().filter(|t| t.is_uploaded());
        let mut entities: Vec<&CatalogEntity> = uploaded_inputs().map(|t| &t.table).collect();
        entities.extend(uploaded_inputs().flat_map(|t| t.columns.iter()));
        if self.output.is_uploaded() {
            entities.extend(self.output.columns.iter());
            entities.push(&self.output.table);
        }
        entities.push(&self.process);
        entities
    }

    /// Owned version of [`entities`](Self::entities)
    pub fn into_entities(self) -> Vec<CatalogEntity> {
        self.entities().into_iter().cloned().collect()
    }

    pub fn summary(&self) -> BatchSummary {
        let tables: Vec<&AssembledTable> = self
            .inputs
            .iter()
            .chain(std::iter::once(&self.output))
            .filter(|t| t.is_uploaded())
            .collect();
        BatchSummary {
            tables: tables.len(),
            columns: tables.iter().map(|t| t.columns.len()).sum(),
            processes: 1,
            resolved: tables
                .iter()
                .filter(|t| t.origin == TableOrigin::Resolved)
                .count(),
        }
    }
}

/// Translates lineage events into catalog entity batches.
///
/// Cheap to share: the catalog and the guid allocator are reference counted,
/// and the assembler holds no per-event state.
#[derive(Clone)]
pub struct GraphAssembler {
    catalog: Arc<dyn Catalog>,
    allocator: Arc<GuidAllocator>,
    settings: EngineSettings,
    policies: PolicyRegistry,
}

impl GraphAssembler {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        allocator: Arc<GuidAllocator>,
        settings: EngineSettings,
        policies: PolicyRegistry,
    ) -> Self {
        Self {
            catalog,
            allocator,
            settings,
            policies,
        }
    }

    /// Assembler with settings and mapping policies from the configuration
    pub fn from_config(config: &Config, catalog: Arc<dyn Catalog>, allocator: Arc<GuidAllocator>) -> Self {
        Self::new(
            catalog,
            allocator,
            EngineSettings::from_config(config),
            PolicyRegistry::from_config(&config.mapping),
        )
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Translate one event; the process end time is the moment assembly finishes.
    pub async fn assemble(&self, event: &LineageEvent) -> EngineResult<AssembledBatch> {
        self.assemble_inner(event, None).await
    }

    /// Translate one event with a fixed process end time.
    pub async fn assemble_at(
        &self,
        event: &LineageEvent,
        completed_at: DateTime<Utc>,
    ) -> EngineResult<AssembledBatch> {
        self.assemble_inner(event, Some(completed_at)).await
    }

    async fn assemble_inner(
        &self,
        event: &LineageEvent,
        completed_at: Option<DateTime<Utc>>,
    ) -> EngineResult<AssembledBatch> {
        event.validate()?;
        // Fail before any remote call if the mapping cannot be completed.
        let policy = self.policies.resolve(&event.application_short_name)?;

        log::info!(
            "Translating process '{}' from {} ({} inputs)",
            event.process_name,
            event.application_short_name,
            event.inputs.len()
        );

        let resolver = EntityResolver::new(self.catalog.as_ref(), &self.settings);
        let mut seen: HashMap<QualifiedName, SeenTable> = HashMap::new();

        let mut inputs = Vec::with_capacity(event.inputs.len());
        for dataset in &event.inputs {
            inputs.push(self.table_for(dataset, &resolver, &mut seen).await?);
        }
        let output = self.table_for(&event.output, &resolver, &mut seen).await?;

        let primary = &inputs[0];
        let primary_columns = event
            .primary_input()
            .map(DatasetDescriptor::column_names)
            .unwrap_or_default();
        let output_columns = event.output.column_names();
        let mapping = generate(
            MappingSide {
                qualified_name: &primary.table.qualified_name,
                columns: &primary_columns,
            },
            MappingSide {
                qualified_name: &output.table.qualified_name,
                columns: &output_columns,
            },
            policy.as_ref(),
        );

        // Set semantics: a dataset read twice is one input of the process.
        let mut input_tables: Vec<&CatalogEntity> = Vec::with_capacity(inputs.len());
        for input in &inputs {
            if !input_tables
                .iter()
                .any(|t| t.qualified_name == input.table.qualified_name)
            {
                input_tables.push(&input.table);
            }
        }

        let process = build_process(
            event,
            &input_tables,
            &output.table,
            &mapping,
            &self.allocator,
            &self.settings,
            completed_at.unwrap_or_else(Utc::now),
        )?;

        let batch = AssembledBatch {
            inputs,
            output,
            mapping,
            process,
        };
        let summary = batch.summary();
        log::info!(
            "Assembled {}: {} tables ({} resolved), {} columns",
            batch.process.qualified_name,
            summary.tables,
            summary.resolved,
            summary.columns
        );
        Ok(batch)
    }

    /// Resolve a dataset, building it when the catalog does not know it.
    async fn table_for(
        &self,
        dataset: &DatasetDescriptor,
        resolver: &EntityResolver<'_>,
        seen: &mut HashMap<QualifiedName, SeenTable>,
    ) -> EngineResult<AssembledTable> {
        let qualified_name = dataset.qualified_name();
        if let Some(earlier) = seen.get(&qualified_name) {
            log::debug!("{} already part of this batch", qualified_name);
            let unbuilt: Vec<&str> = dataset
                .schema
                .iter()
                .map(|c| c.column_name.as_str())
                .filter(|name| !earlier.columns.iter().any(|c| c == name))
                .collect();
            if !unbuilt.is_empty() {
                log::debug!(
                    "Columns of a later occurrence of {} are not built: {}",
                    qualified_name,
                    unbuilt.join(", ")
                );
            }
            return Ok(AssembledTable {
                table: earlier.table.clone(),
                columns: Vec::new(),
                origin: TableOrigin::Repeated,
            });
        }

        let assembled = match resolver.resolve(&qualified_name).await? {
            Some(existing) => AssembledTable::resolved(existing),
            None => AssembledTable::built(build_table(dataset, &self.allocator, &self.settings)),
        };
        seen.insert(
            qualified_name,
            SeenTable {
                table: assembled.table.clone(),
                columns: dataset.column_names(),
            },
        );
        Ok(assembled)
    }
}

/// First occurrence of a dataset within one event
struct SeenTable {
    table: CatalogEntity,
    columns: Vec<String>,
}

#[cfg(test)]
#[path = "assembler_test.rs"]
mod tests;
