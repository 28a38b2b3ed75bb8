//! Existence checks against the catalog
//!
//! Before building a table the engine asks the catalog whether the dataset is
//! already registered. Only names the catalog can address are looked up;
//! everything else is treated as unknown without a remote call.

use crate::error::EngineResult;
use crate::settings::EngineSettings;
use lb_catalog::{Catalog, QueryFilter};
use lb_core::{CatalogEntity, EntityKind, QualifiedName};

/// How a qualified name can be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetAddress {
    /// Storage path the catalog indexes; worth a lookup
    Addressable,
    /// Anything else; never looked up
    Opaque,
}

/// Classify a qualified name by its shape.
pub fn classify(qualified_name: &str, addressable_prefixes: &[String]) -> DatasetAddress {
    if addressable_prefixes
        .iter()
        .any(|prefix| qualified_name.starts_with(prefix.as_str()))
    {
        DatasetAddress::Addressable
    } else {
        DatasetAddress::Opaque
    }
}

/// Looks up existing datasets in the catalog.
///
/// Issues at most two reads per call (query, then fetch) and never writes.
pub struct EntityResolver<'a> {
    catalog: &'a dyn Catalog,
    settings: &'a EngineSettings,
}

impl<'a> EntityResolver<'a> {
    pub fn new(catalog: &'a dyn Catalog, settings: &'a EngineSettings) -> Self {
        Self { catalog, settings }
    }

    /// Resolve a dataset by qualified name.
    ///
    /// Returns `Ok(None)` when the dataset is unknown, including when the
    /// catalog reports a match but the fetch comes back empty.
    pub async fn resolve(&self, qualified_name: &QualifiedName) -> EngineResult<Option<CatalogEntity>> {
        if classify(qualified_name, &self.settings.addressable_prefixes) == DatasetAddress::Opaque {
            log::debug!("{} is not addressable, skipping lookup", qualified_name);
            return Ok(None);
        }

        let lookup_name = qualified_name.with_suffix(&self.settings.partition_suffix);
        let search = self
            .catalog
            .query(&QueryFilter::eq("qualifiedName", lookup_name.as_str()))
            .await?;
        log::debug!("{} matches for {}", search.count, lookup_name);
        if search.count == 0 {
            return Ok(None);
        }

        let fetched = self
            .catalog
            .get_entity(&self.settings.resolved_type, &lookup_name)
            .await?;
        let Some(first) = fetched
            .as_ref()
            .and_then(|envelope| envelope.get("entities"))
            .and_then(|entities| entities.as_array())
            .and_then(|entities| entities.first())
        else {
            log::warn!(
                "Catalog reported {} matches for {} but returned no entity; treating as new",
                search.count,
                lookup_name
            );
            return Ok(None);
        };

        match CatalogEntity::from_catalog_json(first, EntityKind::Table) {
            Ok(entity) => {
                log::info!("Resolved {} to catalog entity {}", qualified_name, entity.guid);
                Ok(Some(entity))
            }
            Err(e) => {
                log::warn!("Could not materialize catalog entity for {}: {}; treating as new", lookup_name, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
