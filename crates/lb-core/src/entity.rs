//! Catalog entities: tables, columns, and processes.
//!
//! Entities are built in memory with typed fields and converted to the
//! catalog's JSON shape only at the upload boundary (`to_json`), or from it
//! when the catalog returns an existing entity (`from_catalog_json`).

use crate::error::{CoreError, CoreResult};
use crate::names::QualifiedName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of an entity.
///
/// Entities built during a translation carry a strictly negative placeholder
/// until the catalog assigns the real identifier on upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Guid {
    /// Engine-allocated, pending upload
    Placeholder(i64),
    /// Issued by the catalog
    Assigned(String),
}

impl Guid {
    /// Create a placeholder identifier.
    pub fn placeholder(value: i64) -> Self {
        debug_assert!(value < 0, "placeholder guids must be negative");
        Guid::Placeholder(value)
    }

    /// Parse the catalog's textual representation.
    ///
    /// Negative integers are placeholders; anything else is catalog-assigned.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(value) if value < 0 => Guid::Placeholder(value),
            _ => Guid::Assigned(raw.to_string()),
        }
    }

    /// Returns true if the identifier was allocated by the engine.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Guid::Placeholder(_))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guid::Placeholder(value) => write!(f, "{value}"),
            Guid::Assigned(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Guid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawGuid {
            Int(i64),
            Str(String),
        }

        match RawGuid::deserialize(deserializer)? {
            RawGuid::Int(value) => Ok(Guid::parse(&value.to_string())),
            RawGuid::Str(raw) if raw.is_empty() => {
                Err(serde::de::Error::custom("guid must not be empty"))
            }
            RawGuid::Str(raw) => Ok(Guid::parse(&raw)),
        }
    }
}

/// Variant of a catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Table,
    Column,
    Process,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Table => write!(f, "table"),
            EntityKind::Column => write!(f, "column"),
            EntityKind::Process => write!(f, "process"),
        }
    }
}

/// Minimal reference to another entity, as embedded in relationships.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub guid: Guid,
    pub type_name: String,
    pub qualified_name: QualifiedName,
}

/// Target of a relationship role: a single entity or a set of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relationship {
    One(EntityRef),
    Many(Vec<EntityRef>),
}

impl Relationship {
    /// All references held by this relationship.
    pub fn refs(&self) -> &[EntityRef] {
        match self {
            Relationship::One(r) => std::slice::from_ref(r),
            Relationship::Many(refs) => refs,
        }
    }

    /// Mutable access to every reference, used when the catalog rewrites guids.
    pub fn refs_mut(&mut self) -> &mut [EntityRef] {
        match self {
            Relationship::One(r) => std::slice::from_mut(r),
            Relationship::Many(refs) => refs,
        }
    }

    pub fn len(&self) -> usize {
        self.refs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs().is_empty()
    }
}

/// A node of the catalog graph.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntity {
    pub kind: EntityKind,
    pub name: String,
    pub type_name: String,
    pub qualified_name: QualifiedName,
    pub guid: Guid,
    /// Typed attributes of the catalog type (`type`, `columnId`, `owner`, ...)
    pub attributes: BTreeMap<String, Value>,
    /// Free-form string attributes outside the catalog type definition
    pub custom_attributes: BTreeMap<String, String>,
    /// Relationship role name to referenced entities
    pub relationships: BTreeMap<String, Relationship>,
}

/// Catalog wire shape of an entity.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityWire {
    type_name: String,
    guid: Guid,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    custom_attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    relationship_attributes: Map<String, Value>,
}

impl CatalogEntity {
    /// Create an entity with no attributes or relationships.
    pub fn new(
        kind: EntityKind,
        name: impl Into<String>,
        type_name: impl Into<String>,
        qualified_name: QualifiedName,
        guid: Guid,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            type_name: type_name.into(),
            qualified_name,
            guid,
            attributes: BTreeMap::new(),
            custom_attributes: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }

    /// Set a typed attribute, replacing any previous value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Set a custom (string) attribute.
    pub fn set_custom_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom_attributes.insert(key.into(), value.into());
    }

    /// Attach a relationship under `role`, replacing any previous target.
    pub fn set_relationship(&mut self, role: impl Into<String>, target: Relationship) {
        self.relationships.insert(role.into(), target);
    }

    pub fn relationship(&self, role: &str) -> Option<&Relationship> {
        self.relationships.get(role)
    }

    /// The minimal reference form of this entity.
    pub fn reference(&self) -> EntityRef {
        EntityRef {
            guid: self.guid.clone(),
            type_name: self.type_name.clone(),
            qualified_name: self.qualified_name.clone(),
        }
    }

    /// Returns true if the entity was built by the engine and is not yet persisted.
    pub fn is_new(&self) -> bool {
        self.guid.is_placeholder()
    }

    /// Render the entity in the catalog's JSON shape.
    pub fn to_json(&self) -> Value {
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), Value::String(self.name.clone()));
        attributes.insert(
            "qualifiedName".to_string(),
            Value::String(self.qualified_name.to_string()),
        );
        for (key, value) in &self.attributes {
            attributes.insert(key.clone(), value.clone());
        }

        let relationship_attributes = self
            .relationships
            .iter()
            .filter_map(|(role, target)| {
                serde_json::to_value(target)
                    .ok()
                    .map(|value| (role.clone(), value))
            })
            .collect();

        let wire = EntityWire {
            type_name: self.type_name.clone(),
            guid: self.guid.clone(),
            attributes,
            custom_attributes: self.custom_attributes.clone(),
            relationship_attributes,
        };
        // EntityWire only holds strings, maps and JSON values.
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    /// Materialize an entity returned by the catalog.
    ///
    /// Relationship attributes that are not in minimal reference form (the
    /// catalog may return nulls or expanded objects) are dropped; a resolved
    /// entity only ever participates by reference.
    pub fn from_catalog_json(value: &Value, kind: EntityKind) -> CoreResult<Self> {
        let wire: EntityWire =
            serde_json::from_value(value.clone()).map_err(|e| CoreError::InvalidEntity {
                message: e.to_string(),
            })?;

        let mut attributes: BTreeMap<String, Value> = wire.attributes.into_iter().collect();
        let qualified_name = attributes
            .remove("qualifiedName")
            .and_then(|v| v.as_str().and_then(QualifiedName::try_new))
            .ok_or_else(|| CoreError::InvalidEntity {
                message: format!("entity {} has no qualifiedName attribute", wire.guid),
            })?;
        let name = match attributes.remove("name") {
            Some(Value::String(name)) => name,
            _ => qualified_name.to_string(),
        };

        let mut relationships = BTreeMap::new();
        for (role, target) in wire.relationship_attributes {
            match serde_json::from_value::<Relationship>(target) {
                Ok(rel) => {
                    relationships.insert(role, rel);
                }
                Err(_) => log::debug!(
                    "Ignoring non-reference relationship '{}' on {}",
                    role,
                    qualified_name
                ),
            }
        }

        Ok(Self {
            kind,
            name,
            type_name: wire.type_name,
            qualified_name,
            guid: wire.guid,
            attributes,
            custom_attributes: wire.custom_attributes,
            relationships,
        })
    }
}

impl Serialize for CatalogEntity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
#[path = "entity_test.rs"]
mod tests;
