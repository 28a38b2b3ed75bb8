//! lb-ingest - Ingestion endpoint for lineagebridge
//!
//! This crate receives gzip-compressed lineage payloads over HTTP, lands
//! them in the landing area, and optionally hands each landed file to the
//! translation engine. It also provides startup secret retrieval.

pub mod decompress;
pub mod error;
pub mod http;
pub mod landing;
pub mod secrets;

pub use decompress::{gunzip, is_gzip};
pub use error::{IngestError, IngestResult};
pub use http::{router, serve, IngestState};
pub use landing::{landing_path_for, FsLandingStore, LandingStore};
pub use secrets::{is_local, load_secrets, EnvSecretProvider, SecretProvider, LOCAL_ENV_VAR};
