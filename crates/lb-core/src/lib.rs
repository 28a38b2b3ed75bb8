//! lb-core - Core library for lineagebridge
//!
//! This crate provides the lineage event model, the catalog entity model,
//! strongly-typed names, configuration parsing, and landing-path handling
//! shared by all lineagebridge components.

pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod landing_path;
pub mod names;
mod newtype_string;

pub use config::{
    CatalogBackend, CatalogConfig, ColumnPairConfig, Config, EngineConfig, IngestConfig,
    MappingConfig, MappingPolicyConfig, SecretsConfig,
};
pub use entity::{CatalogEntity, EntityKind, EntityRef, Guid, Relationship};
pub use error::{CoreError, CoreResult};
pub use event::{ColumnDescriptor, DatasetDescriptor, LineageEvent};
pub use landing_path::LandingPath;
pub use names::{ApplicationName, QualifiedName};
