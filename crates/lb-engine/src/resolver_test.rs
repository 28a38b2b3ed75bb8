use super::*;
use crate::error::EngineError;
use async_trait::async_trait;
use lb_catalog::{CatalogError, CatalogResult, InMemoryCatalog, SearchResult, UploadResult};
use serde_json::{json, Value};

const ORDERS: &str = "https://acct.dfs.core.windows.net/raw/orders";
const ORDERS_PARTITIONED: &str = "https://acct.dfs.core.windows.net/raw/orders/{SparkPartitions}";

fn seeded_catalog(type_name: &str) -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    catalog
        .seed(json!({
            "typeName": type_name,
            "guid": "5a7e",
            "attributes": {"qualifiedName": ORDERS_PARTITIONED, "name": "orders"}
        }))
        .unwrap();
    catalog
}

#[test]
fn test_classify() {
    let prefixes = vec!["https://".to_string(), "abfss://".to_string()];
    assert_eq!(classify(ORDERS, &prefixes), DatasetAddress::Addressable);
    assert_eq!(
        classify("abfss://raw@acct/orders", &prefixes),
        DatasetAddress::Addressable
    );
    assert_eq!(classify("dbfs:/tmp/orders", &prefixes), DatasetAddress::Opaque);
    assert_eq!(classify("orders", &[]), DatasetAddress::Opaque);
}

#[tokio::test]
async fn test_resolve_existing_dataset() {
    let catalog = seeded_catalog("azure_datalake_gen2_resource_set");
    let settings = EngineSettings::default();
    let resolver = EntityResolver::new(&catalog, &settings);

    let entity = resolver
        .resolve(&QualifiedName::new(ORDERS))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entity.guid, lb_core::Guid::Assigned("5a7e".to_string()));
    assert_eq!(entity.qualified_name, ORDERS_PARTITIONED);
    assert_eq!(entity.kind, EntityKind::Table);
    assert_eq!(catalog.stats().reads(), 2);
}

#[tokio::test]
async fn test_resolve_unknown_dataset_makes_one_call() {
    let catalog = InMemoryCatalog::new();
    let settings = EngineSettings::default();
    let resolver = EntityResolver::new(&catalog, &settings);

    let entity = resolver.resolve(&QualifiedName::new(ORDERS)).await.unwrap();
    assert!(entity.is_none());
    assert_eq!(catalog.stats().queries, 1);
    assert_eq!(catalog.stats().fetches, 0);
}

#[tokio::test]
async fn test_resolve_opaque_name_makes_no_call() {
    let catalog = seeded_catalog("azure_datalake_gen2_resource_set");
    let settings = EngineSettings::default();
    let resolver = EntityResolver::new(&catalog, &settings);

    let entity = resolver
        .resolve(&QualifiedName::new("dbfs:/mnt/raw/orders"))
        .await
        .unwrap();
    assert!(entity.is_none());
    assert_eq!(catalog.stats().reads(), 0);
}

#[tokio::test]
async fn test_resolve_inconsistent_catalog_is_absent() {
    // Query matches on qualified name, but the fetch is by type and finds nothing.
    let catalog = seeded_catalog("some_other_type");
    let settings = EngineSettings::default();
    let resolver = EntityResolver::new(&catalog, &settings);

    let entity = resolver.resolve(&QualifiedName::new(ORDERS)).await.unwrap();
    assert!(entity.is_none());
    assert_eq!(catalog.stats().queries, 1);
    assert_eq!(catalog.stats().fetches, 1);
}

#[tokio::test]
async fn test_resolve_twice_is_stable() {
    let catalog = seeded_catalog("azure_datalake_gen2_resource_set");
    let settings = EngineSettings::default();
    let resolver = EntityResolver::new(&catalog, &settings);

    let first = resolver.resolve(&QualifiedName::new(ORDERS)).await.unwrap();
    let second = resolver.resolve(&QualifiedName::new(ORDERS)).await.unwrap();
    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(catalog.stats().reads(), 4);
}

#[tokio::test]
async fn test_resolve_uses_configured_suffix() {
    let catalog = InMemoryCatalog::new();
    catalog
        .seed(json!({
            "typeName": "azure_datalake_gen2_resource_set",
            "attributes": {"qualifiedName": ORDERS}
        }))
        .unwrap();
    let settings = EngineSettings {
        partition_suffix: String::new(),
        ..EngineSettings::default()
    };
    let resolver = EntityResolver::new(&catalog, &settings);
    assert!(resolver
        .resolve(&QualifiedName::new(ORDERS))
        .await
        .unwrap()
        .is_some());
}

/// Catalog whose fetch returns a malformed envelope or fails outright
struct BrokenCatalog {
    fail: bool,
}

#[async_trait]
impl Catalog for BrokenCatalog {
    async fn query(&self, _filter: &QueryFilter) -> CatalogResult<SearchResult> {
        if self.fail {
            return Err(CatalogError::Unavailable("connection refused".to_string()));
        }
        Ok(SearchResult {
            count: 1,
            matches: vec![],
        })
    }

    async fn get_entity(&self, _type_name: &str, _qualified_name: &str) -> CatalogResult<Option<Value>> {
        Ok(Some(json!({"entities": [{"typeName": "t", "guid": "1", "attributes": {}}]})))
    }

    async fn upload(&self, _batch: &[CatalogEntity], _collection: &str) -> CatalogResult<UploadResult> {
        Ok(UploadResult::default())
    }

    fn catalog_type(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn test_resolve_unmaterializable_entity_is_absent() {
    let catalog = BrokenCatalog { fail: false };
    let settings = EngineSettings::default();
    let resolver = EntityResolver::new(&catalog, &settings);
    assert!(resolver
        .resolve(&QualifiedName::new(ORDERS))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_resolve_propagates_catalog_errors() {
    let catalog = BrokenCatalog { fail: true };
    let settings = EngineSettings::default();
    let resolver = EntityResolver::new(&catalog, &settings);
    let err = resolver
        .resolve(&QualifiedName::new(ORDERS))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Catalog(CatalogError::Unavailable(_))));
}
