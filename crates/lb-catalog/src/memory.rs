//! In-memory catalog backend

use crate::error::{CatalogError, CatalogResult};
use crate::traits::{Catalog, QueryFilter, RejectedEntity, SearchResult, UploadResult};
use async_trait::async_trait;
use lb_core::{CatalogEntity, Guid};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// An entity as held by the catalog, in catalog JSON form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    /// Collection the entity was uploaded into; `None` for seeded entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    pub entity: Value,
}

impl StoredEntity {
    pub fn qualified_name(&self) -> Option<&str> {
        qualified_name_of(&self.entity)
    }

    pub fn type_name(&self) -> Option<&str> {
        self.entity.get("typeName").and_then(Value::as_str)
    }

    pub fn guid(&self) -> Option<&str> {
        self.entity.get("guid").and_then(Value::as_str)
    }
}

/// Number of calls served, per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub queries: usize,
    pub fetches: usize,
    pub uploads: usize,
}

impl CallStats {
    /// Remote reads (queries and fetches)
    pub fn reads(&self) -> usize {
        self.queries + self.fetches
    }
}

/// Process-local catalog keyed by qualified name
///
/// Uploads are all-or-nothing: if any entity is rejected nothing is stored.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entities: Mutex<BTreeMap<String, StoredEntity>>,
    queries: AtomicUsize,
    fetches: AtomicUsize,
    uploads: AtomicUsize,
}

fn qualified_name_of(entity: &Value) -> Option<&str> {
    entity
        .get("attributes")
        .and_then(|a| a.get("qualifiedName"))
        .and_then(Value::as_str)
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding previously stored entities
    pub fn from_entries(entries: Vec<StoredEntity>) -> CatalogResult<Self> {
        let mut map = BTreeMap::new();
        for entry in entries {
            let qualified_name = entry
                .qualified_name()
                .ok_or_else(|| {
                    CatalogError::InvalidEntity(format!(
                        "stored entity has no qualifiedName: {}",
                        entry.entity
                    ))
                })?
                .to_string();
            map.insert(qualified_name, entry);
        }
        Ok(Self {
            entities: Mutex::new(map),
            ..Self::default()
        })
    }

    /// Insert an existing entity, bypassing upload validation.
    ///
    /// A missing or placeholder guid is replaced with a fresh catalog guid.
    /// Returns the guid the entity is stored under.
    pub fn seed(&self, mut entity: Value) -> CatalogResult<String> {
        let qualified_name = qualified_name_of(&entity)
            .ok_or_else(|| CatalogError::InvalidEntity("missing attributes.qualifiedName".into()))?
            .to_string();
        if entity.get("typeName").and_then(Value::as_str).is_none() {
            return Err(CatalogError::InvalidEntity(format!(
                "{qualified_name}: missing typeName"
            )));
        }

        let guid = match entity.get("guid").and_then(Value::as_str).map(Guid::parse) {
            Some(Guid::Assigned(guid)) => guid,
            _ => Uuid::new_v4().to_string(),
        };
        entity["guid"] = Value::String(guid.clone());

        log::debug!("Seeding catalog entity {} ({})", qualified_name, guid);
        self.entities.lock()?.insert(
            qualified_name,
            StoredEntity {
                collection: None,
                entity,
            },
        );
        Ok(guid)
    }

    /// Copy of every stored entity, ordered by qualified name
    pub fn snapshot(&self) -> CatalogResult<Vec<StoredEntity>> {
        Ok(self.entities.lock()?.values().cloned().collect())
    }

    /// Stored entity by qualified name
    pub fn stored(&self, qualified_name: &str) -> CatalogResult<Option<StoredEntity>> {
        Ok(self.entities.lock()?.get(qualified_name).cloned())
    }

    pub fn len(&self) -> CatalogResult<usize> {
        Ok(self.entities.lock()?.len())
    }

    pub fn is_empty(&self) -> CatalogResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Calls served so far
    pub fn stats(&self) -> CallStats {
        CallStats {
            queries: self.queries.load(Ordering::SeqCst),
            fetches: self.fetches.load(Ordering::SeqCst),
            uploads: self.uploads.load(Ordering::SeqCst),
        }
    }

    fn query_sync(&self, filter: &QueryFilter) -> CatalogResult<SearchResult> {
        let entities = self.entities.lock()?;
        let matches: Vec<Value> = entities
            .values()
            .filter(|stored| {
                stored
                    .entity
                    .get("attributes")
                    .and_then(|a| a.get(&filter.attribute_name))
                    .and_then(Value::as_str)
                    .is_some_and(|candidate| filter.matches(candidate))
            })
            .map(|stored| stored.entity.clone())
            .collect();
        Ok(SearchResult {
            count: matches.len(),
            matches,
        })
    }

    fn get_entity_sync(&self, type_name: &str, qualified_name: &str) -> CatalogResult<Option<Value>> {
        let entities = self.entities.lock()?;
        Ok(entities
            .get(qualified_name)
            .filter(|stored| stored.type_name() == Some(type_name))
            .map(|stored| json!({ "entities": [stored.entity.clone()] })))
    }

    /// Reason an entity cannot be stored, if any
    fn check_entity(
        entity: &CatalogEntity,
        existing: Option<&StoredEntity>,
        batch_placeholders: &HashSet<&Guid>,
    ) -> Option<String> {
        if let Some(existing) = existing {
            let existing_type = existing.type_name().unwrap_or_default();
            if existing_type != entity.type_name {
                return Some(format!(
                    "type mismatch: catalog holds this qualifiedName as '{existing_type}'"
                ));
            }
        } else if !entity.is_new() {
            return Some(format!(
                "guid {} does not exist in the catalog",
                entity.guid
            ));
        }

        entity
            .relationships
            .iter()
            .flat_map(|(role, target)| target.refs().iter().map(move |r| (role, r)))
            .find(|(_, r)| r.guid.is_placeholder() && !batch_placeholders.contains(&r.guid))
            .map(|(role, r)| {
                format!(
                    "relationship '{role}' references {} ({}) which is not part of the batch",
                    r.qualified_name, r.guid
                )
            })
    }

    fn upload_sync(&self, batch: &[CatalogEntity], collection: &str) -> CatalogResult<UploadResult> {
        let mut entities = self.entities.lock()?;

        let batch_placeholders: HashSet<&Guid> = batch
            .iter()
            .filter(|e| e.is_new())
            .map(|e| &e.guid)
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut rejected = Vec::new();
        for entity in batch {
            let reason = if !seen.insert(entity.qualified_name.as_str()) {
                Some("qualifiedName appears more than once in the batch".to_string())
            } else {
                Self::check_entity(
                    entity,
                    entities.get(entity.qualified_name.as_str()),
                    &batch_placeholders,
                )
            };
            if let Some(reason) = reason {
                rejected.push(RejectedEntity {
                    guid: entity.guid.clone(),
                    type_name: entity.type_name.clone(),
                    qualified_name: entity.qualified_name.to_string(),
                    reason,
                });
            }
        }

        if !rejected.is_empty() {
            log::warn!(
                "Catalog rejected {} of {} entities; nothing stored",
                rejected.len(),
                batch.len()
            );
            return Ok(UploadResult {
                rejected,
                ..UploadResult::default()
            });
        }

        // Placeholders whose qualified name already exists take over the
        // existing guid (update); the rest get a fresh one.
        let assignments: HashMap<&Guid, String> = batch
            .iter()
            .filter(|e| e.is_new())
            .map(|e| {
                let assigned = entities
                    .get(e.qualified_name.as_str())
                    .and_then(|stored| stored.guid().map(String::from))
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                (&e.guid, assigned)
            })
            .collect();

        let mut result = UploadResult::default();
        for entity in batch {
            let qualified_name = entity.qualified_name.to_string();
            let Some(assigned) = assignments.get(&entity.guid) else {
                result.unchanged.push(qualified_name);
                continue;
            };

            let mut stored = entity.clone();
            stored.guid = Guid::Assigned(assigned.clone());
            for target in stored.relationships.values_mut() {
                for reference in target.refs_mut() {
                    if let Some(guid) = assignments.get(&reference.guid) {
                        reference.guid = Guid::Assigned(guid.clone());
                    }
                }
            }

            result
                .guid_assignments
                .insert(entity.guid.to_string(), assigned.clone());
            entities.insert(
                qualified_name.clone(),
                StoredEntity {
                    collection: Some(collection.to_string()),
                    entity: stored.to_json(),
                },
            );
            result.stored.push(qualified_name);
        }

        log::info!(
            "Uploaded {} entities into collection '{}' ({} unchanged)",
            result.stored.len(),
            collection,
            result.unchanged.len()
        );
        Ok(result)
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn query(&self, filter: &QueryFilter) -> CatalogResult<SearchResult> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.query_sync(filter)
    }

    async fn get_entity(
        &self,
        type_name: &str,
        qualified_name: &str,
    ) -> CatalogResult<Option<Value>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.get_entity_sync(type_name, qualified_name)
    }

    async fn upload(
        &self,
        batch: &[CatalogEntity],
        collection: &str,
    ) -> CatalogResult<UploadResult> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.upload_sync(batch, collection)
    }

    fn catalog_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
