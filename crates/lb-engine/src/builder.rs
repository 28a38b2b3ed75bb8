//! Table and column entity construction
//!
//! A table is always built together with its columns. The columns are
//! returned next to the table instead of being nested in it: the table only
//! holds minimal references, and the caller puts both into the upload batch.

use crate::guid::GuidAllocator;
use crate::settings::EngineSettings;
use lb_core::{CatalogEntity, ColumnDescriptor, DatasetDescriptor, EntityKind, Relationship};
use std::collections::HashSet;

/// A newly built table and the columns it owns
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTable {
    pub table: CatalogEntity,
    pub columns: Vec<CatalogEntity>,
}

/// Build a table entity and its columns from a dataset descriptor.
pub fn build_table(
    dataset: &DatasetDescriptor,
    allocator: &GuidAllocator,
    settings: &EngineSettings,
) -> BuiltTable {
    let mut table = CatalogEntity::new(
        EntityKind::Table,
        dataset.name.clone(),
        settings.table_type.clone(),
        dataset.qualified_name(),
        allocator.next(),
    );
    table.set_custom_attribute("id", dataset.id.clone());
    table.set_custom_attribute("name", dataset.name.clone());
    table.set_custom_attribute("type", dataset.dataset_type.clone());
    if let Some(linked) = &dataset.linked_transformation_id {
        table.set_custom_attribute("linked_transformation_id", linked.clone());
    }

    let columns = build_columns(&table, &dataset.schema, allocator, settings);
    table.set_relationship(
        "columns",
        Relationship::Many(columns.iter().map(CatalogEntity::reference).collect()),
    );

    log::debug!(
        "Built table {} ({}) with {} columns",
        table.qualified_name,
        table.guid,
        columns.len()
    );
    BuiltTable { table, columns }
}

/// Build one column entity per descriptor, in schema order.
///
/// Column qualified names must be unique, so a repeated column name (common
/// in join outputs) only yields an entity for its first occurrence.
pub fn build_columns(
    table: &CatalogEntity,
    columns: &[ColumnDescriptor],
    allocator: &GuidAllocator,
    settings: &EngineSettings,
) -> Vec<CatalogEntity> {
    let owner = Relationship::One(table.reference());
    let mut seen = HashSet::new();
    columns
        .iter()
        .filter(|descriptor| {
            let first = seen.insert(descriptor.column_name.as_str());
            if !first {
                log::warn!(
                    "Skipping repeated column '{}' (columnId '{}') of {}",
                    descriptor.column_name,
                    descriptor.column_id,
                    table.qualified_name
                );
            }
            first
        })
        .map(|descriptor| {
            let mut column = CatalogEntity::new(
                EntityKind::Column,
                descriptor.column_name.clone(),
                settings.column_type.clone(),
                table.qualified_name.column(&descriptor.column_name),
                allocator.next(),
            );
            column.set_attribute("type", settings.default_column_type.clone());
            column.set_attribute("columnId", descriptor.column_id.clone());
            column.set_relationship("table", owner.clone());
            column
        })
        .collect()
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
