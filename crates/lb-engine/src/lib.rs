//! lb-engine - Translation engine for lineagebridge
//!
//! This crate turns a lineage event into an ordered batch of catalog
//! entities (tables, columns, and one process), resolving datasets that
//! already exist in the catalog, and drives landed files through
//! translation and upload.

pub mod assembler;
pub mod builder;
pub mod error;
pub mod guid;
pub mod mapping;
pub mod pipeline;
pub mod process;
pub mod resolver;
pub mod settings;

pub use assembler::{AssembledBatch, AssembledTable, BatchSummary, GraphAssembler, TableOrigin};
pub use builder::{build_columns, build_table, BuiltTable};
pub use error::{EngineError, EngineResult};
pub use guid::{GuidAllocator, DEFAULT_GUID_START};
pub use mapping::{
    generate, ColumnMapping, ColumnPair, CorrespondencePolicy, DatasetMapping, ExplicitPolicy,
    IdentityPolicy, MappingSide, NoColumnsPolicy, PolicyRegistry,
};
pub use pipeline::{LandingProcessor, ProcessOutcome};
pub use process::build_process;
pub use resolver::{classify, DatasetAddress, EntityResolver};
pub use settings::EngineSettings;
