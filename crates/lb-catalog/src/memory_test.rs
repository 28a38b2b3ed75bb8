use super::*;
use lb_core::{EntityKind, QualifiedName, Relationship};

fn table(qualified_name: &str, guid: i64) -> CatalogEntity {
    CatalogEntity::new(
        EntityKind::Table,
        "orders",
        "spark_table",
        QualifiedName::new(qualified_name),
        Guid::placeholder(guid),
    )
}

fn column_of(table: &CatalogEntity, name: &str, guid: i64) -> CatalogEntity {
    let mut column = CatalogEntity::new(
        EntityKind::Column,
        name,
        "spark_column",
        table.qualified_name.column(name),
        Guid::placeholder(guid),
    );
    column.set_relationship("table", Relationship::One(table.reference()));
    column
}

fn seeded_resource_set(catalog: &InMemoryCatalog, qualified_name: &str) -> String {
    catalog
        .seed(json!({
            "typeName": "azure_datalake_gen2_resource_set",
            "attributes": {"qualifiedName": qualified_name, "name": "orders"}
        }))
        .unwrap()
}

#[tokio::test]
async fn test_query_counts_matches() {
    let catalog = InMemoryCatalog::new();
    seeded_resource_set(&catalog, "https://acct/raw/orders/{SparkPartitions}");

    let hit = catalog
        .query(&QueryFilter::eq(
            "qualifiedName",
            "https://acct/raw/orders/{SparkPartitions}",
        ))
        .await
        .unwrap();
    assert_eq!(hit.count, 1);
    assert_eq!(hit.matches.len(), 1);

    let miss = catalog
        .query(&QueryFilter::eq("qualifiedName", "https://acct/raw/other"))
        .await
        .unwrap();
    assert_eq!(miss.count, 0);
    assert_eq!(catalog.stats().queries, 2);
}

#[tokio::test]
async fn test_get_entity_filters_by_type() {
    let catalog = InMemoryCatalog::new();
    let guid = seeded_resource_set(&catalog, "https://acct/raw/orders");

    let found = catalog
        .get_entity("azure_datalake_gen2_resource_set", "https://acct/raw/orders")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found["entities"][0]["guid"], guid.as_str());

    let wrong_type = catalog
        .get_entity("spark_table", "https://acct/raw/orders")
        .await
        .unwrap();
    assert!(wrong_type.is_none());
    assert_eq!(catalog.stats().fetches, 2);
}

#[tokio::test]
async fn test_upload_assigns_guids_and_rewrites_references() {
    let catalog = InMemoryCatalog::new();
    let mut orders = table("https://acct/raw/orders", -1000);
    let id = column_of(&orders, "id", -1001);
    orders.set_relationship("columns", Relationship::Many(vec![id.reference()]));

    let result = catalog
        .upload(&[orders.clone(), id.clone()], "finance")
        .await
        .unwrap();
    assert!(result.is_accepted());
    assert_eq!(result.stored.len(), 2);

    let table_guid = result.assigned_guid(&orders.guid).unwrap().to_string();
    let column_guid = result.assigned_guid(&id.guid).unwrap().to_string();
    assert_ne!(table_guid, column_guid);

    let stored_column = catalog.stored("https://acct/raw/orders#id").unwrap().unwrap();
    assert_eq!(stored_column.collection.as_deref(), Some("finance"));
    assert_eq!(stored_column.guid(), Some(column_guid.as_str()));
    assert_eq!(
        stored_column.entity["relationshipAttributes"]["table"]["guid"],
        table_guid.as_str()
    );
}

#[tokio::test]
async fn test_upload_rejects_type_mismatch_and_stores_nothing() {
    let catalog = InMemoryCatalog::new();
    seeded_resource_set(&catalog, "https://acct/raw/orders");

    let result = catalog
        .upload(
            &[
                table("https://acct/raw/orders", -1),
                table("https://acct/raw/fresh", -2),
            ],
            "finance",
        )
        .await
        .unwrap();
    assert!(!result.is_accepted());
    assert_eq!(result.rejected.len(), 1);
    assert!(result.rejected[0].reason.contains("type mismatch"));
    assert!(catalog.stored("https://acct/raw/fresh").unwrap().is_none());
    assert_eq!(catalog.len().unwrap(), 1);
}

#[tokio::test]
async fn test_upload_rejects_dangling_placeholder_reference() {
    let catalog = InMemoryCatalog::new();
    let orders = table("https://acct/raw/orders", -1);
    let id = column_of(&orders, "id", -2);

    let result = catalog.upload(&[id], "finance").await.unwrap();
    assert_eq!(result.rejected.len(), 1);
    assert!(result.rejected[0].reason.contains("not part of the batch"));
}

#[tokio::test]
async fn test_upload_rejects_duplicate_qualified_name() {
    let catalog = InMemoryCatalog::new();
    let result = catalog
        .upload(
            &[
                table("https://acct/raw/orders", -1),
                table("https://acct/raw/orders", -2),
            ],
            "finance",
        )
        .await
        .unwrap();
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].guid, Guid::Placeholder(-2));
}

#[tokio::test]
async fn test_upload_keeps_existing_entities_by_reference() {
    let catalog = InMemoryCatalog::new();
    let guid = seeded_resource_set(&catalog, "https://acct/raw/orders");
    let fetched = catalog
        .get_entity("azure_datalake_gen2_resource_set", "https://acct/raw/orders")
        .await
        .unwrap()
        .unwrap();
    let existing =
        CatalogEntity::from_catalog_json(&fetched["entities"][0], EntityKind::Table).unwrap();

    let result = catalog.upload(&[existing], "finance").await.unwrap();
    assert!(result.is_accepted());
    assert_eq!(result.unchanged, vec!["https://acct/raw/orders"]);
    assert!(result.stored.is_empty());
    let stored = catalog.stored("https://acct/raw/orders").unwrap().unwrap();
    assert_eq!(stored.guid(), Some(guid.as_str()));
    assert_eq!(stored.collection, None);
}

#[tokio::test]
async fn test_upload_rejects_unknown_assigned_guid() {
    let catalog = InMemoryCatalog::new();
    let mut ghost = table("https://acct/raw/ghost", -1);
    ghost.guid = Guid::Assigned("not-there".to_string());
    let result = catalog.upload(&[ghost], "finance").await.unwrap();
    assert!(result.rejected[0].reason.contains("does not exist"));
}

#[tokio::test]
async fn test_reupload_reuses_existing_guid() {
    let catalog = InMemoryCatalog::new();
    let first = catalog
        .upload(&[table("https://acct/raw/orders", -1)], "finance")
        .await
        .unwrap();
    let second = catalog
        .upload(&[table("https://acct/raw/orders", -5)], "finance")
        .await
        .unwrap();
    assert_eq!(
        first.assigned_guid(&Guid::Placeholder(-1)),
        second.assigned_guid(&Guid::Placeholder(-5))
    );
    assert_eq!(catalog.len().unwrap(), 1);
    assert_eq!(catalog.stats().uploads, 2);
}

#[test]
fn test_seed_requires_qualified_name_and_type() {
    let catalog = InMemoryCatalog::new();
    assert!(catalog.seed(json!({"typeName": "t", "attributes": {}})).is_err());
    assert!(catalog
        .seed(json!({"attributes": {"qualifiedName": "q"}}))
        .is_err());
}

#[test]
fn test_seed_replaces_placeholder_guid() {
    let catalog = InMemoryCatalog::new();
    let guid = catalog
        .seed(json!({"typeName": "t", "guid": "-4", "attributes": {"qualifiedName": "q"}}))
        .unwrap();
    assert_ne!(guid, "-4");
    let kept = catalog
        .seed(json!({"typeName": "t", "guid": "abc", "attributes": {"qualifiedName": "r"}}))
        .unwrap();
    assert_eq!(kept, "abc");
}

#[test]
fn test_from_entries_and_snapshot() {
    let entries = vec![StoredEntity {
        collection: Some("c".to_string()),
        entity: json!({"typeName": "t", "guid": "g", "attributes": {"qualifiedName": "q"}}),
    }];
    let catalog = InMemoryCatalog::from_entries(entries.clone()).unwrap();
    assert_eq!(catalog.snapshot().unwrap(), entries);

    let bad = vec![StoredEntity {
        collection: None,
        entity: json!({"typeName": "t"}),
    }];
    assert!(InMemoryCatalog::from_entries(bad).is_err());
}
