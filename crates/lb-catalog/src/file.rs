//! JSON file catalog backend
//!
//! Wraps [`InMemoryCatalog`] and writes the whole catalog back to disk after
//! every accepted upload or seed.

use crate::error::{CatalogError, CatalogResult};
use crate::memory::{CallStats, InMemoryCatalog, StoredEntity};
use crate::traits::{Catalog, QueryFilter, SearchResult, UploadResult};
use async_trait::async_trait;
use lb_core::CatalogEntity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// On-disk layout of the catalog file
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    entities: Vec<StoredEntity>,
}

/// Catalog persisted to a single JSON file
#[derive(Debug)]
pub struct JsonFileCatalog {
    path: PathBuf,
    inner: InMemoryCatalog,
    /// Serializes writers so concurrent uploads never interleave file writes
    write_lock: Mutex<()>,
}

impl JsonFileCatalog {
    /// Open the catalog at `path`, starting empty if the file does not exist
    pub fn open(path: &Path) -> CatalogResult<Self> {
        let inner = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            let file: CatalogFile = serde_json::from_str(&content)?;
            log::debug!(
                "Loaded {} catalog entities from {}",
                file.entities.len(),
                path.display()
            );
            InMemoryCatalog::from_entries(file.entities)?
        } else {
            log::debug!("Catalog file {} not found, starting empty", path.display());
            InMemoryCatalog::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert an existing entity and persist; see [`InMemoryCatalog::seed`]
    pub fn seed(&self, entity: Value) -> CatalogResult<String> {
        let guid = self.inner.seed(entity)?;
        self.persist()?;
        Ok(guid)
    }

    /// Copy of every stored entity
    pub fn snapshot(&self) -> CatalogResult<Vec<StoredEntity>> {
        self.inner.snapshot()
    }

    pub fn stats(&self) -> CallStats {
        self.inner.stats()
    }

    /// Write the current state to disk via a temporary file and rename
    fn persist(&self) -> CatalogResult<()> {
        let _guard = self.write_lock.lock()?;
        let file = CatalogFile {
            entities: self.inner.snapshot()?,
        };
        let json = serde_json::to_string_pretty(&file)?;

        let io_err = |e: std::io::Error| CatalogError::Io {
            path: self.path.display().to_string(),
            source: e,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl Catalog for JsonFileCatalog {
    async fn query(&self, filter: &QueryFilter) -> CatalogResult<SearchResult> {
        self.inner.query(filter).await
    }

    async fn get_entity(
        &self,
        type_name: &str,
        qualified_name: &str,
    ) -> CatalogResult<Option<Value>> {
        self.inner.get_entity(type_name, qualified_name).await
    }

    async fn upload(
        &self,
        batch: &[CatalogEntity],
        collection: &str,
    ) -> CatalogResult<UploadResult> {
        let result = self.inner.upload(batch, collection).await?;
        if result.is_accepted() && !result.stored.is_empty() {
            self.persist()?;
        }
        Ok(result)
    }

    fn catalog_type(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lb_core::{EntityKind, Guid, QualifiedName};
    use serde_json::json;

    fn table(qualified_name: &str, guid: i64) -> CatalogEntity {
        CatalogEntity::new(
            EntityKind::Table,
            "t",
            "spark_table",
            QualifiedName::new(qualified_name),
            Guid::placeholder(guid),
        )
    }

    #[tokio::test]
    async fn test_upload_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");

        let catalog = JsonFileCatalog::open(&path).unwrap();
        let result = catalog
            .upload(&[table("https://acct/a", -1)], "finance")
            .await
            .unwrap();
        assert!(result.is_accepted());
        assert!(path.exists());

        let reopened = JsonFileCatalog::open(&path).unwrap();
        let found = reopened
            .get_entity("spark_table", "https://acct/a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            found["entities"][0]["guid"],
            result.assigned_guid(&Guid::Placeholder(-1)).unwrap()
        );
    }

    #[tokio::test]
    async fn test_rejected_upload_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = JsonFileCatalog::open(&path).unwrap();
        catalog
            .seed(json!({"typeName": "other", "attributes": {"qualifiedName": "https://acct/a"}}))
            .unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let result = catalog
            .upload(&[table("https://acct/a", -1)], "finance")
            .await
            .unwrap();
        assert!(!result.is_accepted());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_open_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "not json").unwrap();
        let err = JsonFileCatalog::open(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn test_seed_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = JsonFileCatalog::open(&path).unwrap();
        catalog
            .seed(json!({"typeName": "t", "attributes": {"qualifiedName": "q"}}))
            .unwrap();
        let reopened = JsonFileCatalog::open(&path).unwrap();
        assert_eq!(reopened.snapshot().unwrap().len(), 1);
    }
}
