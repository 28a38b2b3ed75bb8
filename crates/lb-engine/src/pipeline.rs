//! Landed file processing: read, translate, upload

use crate::assembler::{BatchSummary, GraphAssembler};
use crate::error::{EngineError, EngineResult};
use lb_catalog::UploadResult;
use lb_core::{LandingPath, LineageEvent};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of processing one event
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    /// Where the event was landed, when it came from a file
    pub landing: Option<LandingPath>,
    pub process_qualified_name: String,
    pub summary: BatchSummary,
    pub upload: UploadResult,
}

/// Translates landed events and uploads them into the configured collection.
#[derive(Clone)]
pub struct LandingProcessor {
    assembler: GraphAssembler,
    collection: String,
    landing_root: PathBuf,
}

impl LandingProcessor {
    pub fn new(
        assembler: GraphAssembler,
        collection: impl Into<String>,
        landing_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            assembler,
            collection: collection.into(),
            landing_root: landing_root.into(),
        }
    }

    pub fn assembler(&self) -> &GraphAssembler {
        &self.assembler
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn landing_root(&self) -> &Path {
        &self.landing_root
    }

    /// Process a landed file.
    ///
    /// Empty files are skipped and yield `Ok(None)`.
    pub async fn process_file(&self, path: &Path) -> EngineResult<Option<ProcessOutcome>> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| EngineError::ReadLanded {
                path: path.display().to_string(),
                source,
            })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            log::info!("Skipping empty landed file {}", path.display());
            return Ok(None);
        }

        let landing = self.landing_path(path)?;
        let event = LineageEvent::from_slice(&bytes)?;
        if event.application_short_name != landing.usecase {
            log::warn!(
                "{} landed under application '{}' but the event names '{}'",
                path.display(),
                landing.usecase,
                event.application_short_name
            );
        }
        log::debug!(
            "Processing {} for application {} ({})",
            landing.filename,
            landing.usecase,
            landing.date
        );

        self.process_event(&event, Some(landing)).await.map(Some)
    }

    /// Translate and upload one raw event.
    pub async fn process_bytes(&self, bytes: &[u8]) -> EngineResult<ProcessOutcome> {
        let event = LineageEvent::from_slice(bytes)?;
        self.process_event(&event, None).await
    }

    /// Translate and upload a parsed event.
    ///
    /// Any rejected entity fails the whole run with
    /// [`EngineError::UploadRejected`]; nothing is retried.
    pub async fn process_event(
        &self,
        event: &LineageEvent,
        landing: Option<LandingPath>,
    ) -> EngineResult<ProcessOutcome> {
        let batch = self.assembler.assemble(event).await?;
        let summary = batch.summary();
        let process_qualified_name = batch.process.qualified_name.to_string();

        let upload = self
            .assembler
            .catalog()
            .upload(&batch.into_entities(), &self.collection)
            .await?;
        if !upload.is_accepted() {
            return Err(EngineError::UploadRejected {
                collection: self.collection.clone(),
                rejected: upload.rejected,
            });
        }

        log::info!(
            "Uploaded {} into '{}' ({} stored, {} unchanged)",
            process_qualified_name,
            self.collection,
            upload.stored.len(),
            upload.unchanged.len()
        );
        Ok(ProcessOutcome {
            landing,
            process_qualified_name,
            summary,
            upload,
        })
    }

    /// Landing path of a file, relative to the landing root when possible.
    fn landing_path(&self, path: &Path) -> EngineResult<LandingPath> {
        let relative = path.strip_prefix(&self.landing_root).unwrap_or(path);
        let normalized = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Ok(LandingPath::parse(&normalized)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::GuidAllocator;
    use crate::mapping::PolicyRegistry;
    use crate::settings::EngineSettings;
    use lb_catalog::InMemoryCatalog;
    use lb_core::CoreError;
    use std::sync::Arc;
    use tempfile::TempDir;

    const EVENT: &str = r#"{
        "processId": "run-3",
        "processName": "daily_orders",
        "applicationShortName": "sales",
        "eventTimestamp": 1700000000000,
        "inPutTable": [{"id": "1", "name": "orders", "type": "csv",
            "qualifiedpath": "https://acct/raw/orders",
            "schema": [{"columnName": "id", "columnId": "c1"}]}],
        "outPutTable": {"id": "2", "name": "daily", "type": "delta",
            "qualifiedpath": "https://acct/curated/daily",
            "schema": [{"columnName": "id", "columnId": "c2"}]}
    }"#;

    fn processor(catalog: Arc<InMemoryCatalog>, root: &Path) -> LandingProcessor {
        let assembler = GraphAssembler::new(
            catalog,
            Arc::new(GuidAllocator::default()),
            EngineSettings::default(),
            PolicyRegistry::identity_default(),
        );
        LandingProcessor::new(assembler, "lineage", root)
    }

    fn land(root: &Path, contents: &str) -> PathBuf {
        let dir = root.join("landingzone/spline/application=sales/date=2024-03-01");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("sales-splineOutput-2024-03-01_10_00_00_000000.json");
        std::fs::write(&file, contents).unwrap();
        file
    }

    #[tokio::test]
    async fn test_process_file_uploads_batch() {
        let temp = TempDir::new().unwrap();
        let catalog = Arc::new(InMemoryCatalog::new());
        let file = land(temp.path(), EVENT);

        let outcome = processor(catalog.clone(), temp.path())
            .process_file(&file)
            .await
            .unwrap()
            .unwrap();

        let landing = outcome.landing.unwrap();
        assert_eq!(landing.usecase, "sales");
        assert_eq!(landing.date, "2024-03-01");
        assert_eq!(outcome.process_qualified_name, "daily_orders_process");
        assert_eq!(outcome.upload.stored.len(), 5);
        assert_eq!(catalog.len().unwrap(), 5);
        let stored = catalog.stored("daily_orders_process").unwrap().unwrap();
        assert_eq!(stored.collection.as_deref(), Some("lineage"));
    }

    #[tokio::test]
    async fn test_empty_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let catalog = Arc::new(InMemoryCatalog::new());
        let file = land(temp.path(), "  \n");

        let outcome = processor(catalog.clone(), temp.path())
            .process_file(&file)
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(catalog.stats().uploads, 0);
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let err = processor(Arc::new(InMemoryCatalog::new()), temp.path())
            .process_file(&temp.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ReadLanded { .. }));
        assert!(err.to_string().contains("[G001]"));
    }

    #[tokio::test]
    async fn test_malformed_event_uploads_nothing() {
        let temp = TempDir::new().unwrap();
        let catalog = Arc::new(InMemoryCatalog::new());
        let file = land(temp.path(), r#"{"processId": "x"}"#);

        let err = processor(catalog.clone(), temp.path())
            .process_file(&file)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::MalformedEvent { .. })
        ));
        assert_eq!(catalog.stats().uploads, 0);
    }

    #[tokio::test]
    async fn test_file_outside_landing_layout_is_rejected() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("event.json");
        std::fs::write(&file, EVENT).unwrap();

        let err = processor(Arc::new(InMemoryCatalog::new()), temp.path())
            .process_file(&file)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidLandingPath { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejected_upload_is_an_error() {
        let catalog = Arc::new(InMemoryCatalog::new());
        // Same qualified name as the output table, different type.
        catalog
            .seed(serde_json::json!({
                "typeName": "hive_table",
                "attributes": {"qualifiedName": "https://acct/curated/daily"}
            }))
            .unwrap();

        let temp = TempDir::new().unwrap();
        let err = processor(catalog.clone(), temp.path())
            .process_bytes(EVENT.as_bytes())
            .await
            .unwrap_err();
        match err {
            EngineError::UploadRejected {
                collection,
                rejected,
            } => {
                assert_eq!(collection, "lineage");
                assert_eq!(rejected.len(), 1);
                assert_eq!(rejected[0].qualified_name, "https://acct/curated/daily");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(catalog.len().unwrap(), 1);
    }
}
