//! Catalog command implementation

use anyhow::{bail, Context, Result};
use lb_catalog::StoredEntity;
use serde_json::Value;

use crate::cli::{CatalogArgs, CatalogCommands, CatalogSeedArgs, CatalogShowArgs, GlobalArgs};
use crate::commands::common::{load_config, open_catalog_file};

/// Execute the catalog command
pub async fn execute(args: &CatalogArgs, global: &GlobalArgs) -> Result<()> {
    match &args.command {
        CatalogCommands::Seed(seed_args) => seed(seed_args, global),
        CatalogCommands::Show(show_args) => show(show_args, global),
    }
}

/// Entities of a seed file: a bare list or an `{"entities": [...]}` envelope
fn seed_entities(content: Value) -> Result<Vec<Value>> {
    match content {
        Value::Array(entities) => Ok(entities),
        Value::Object(mut envelope) => match envelope.remove("entities") {
            Some(Value::Array(entities)) => Ok(entities),
            _ => bail!("Expected an \"entities\" array in the seed file"),
        },
        _ => bail!("Seed file must hold a JSON array or an object with \"entities\""),
    }
}

fn seed(args: &CatalogSeedArgs, global: &GlobalArgs) -> Result<()> {
    let loaded = load_config(global)?;
    let catalog = open_catalog_file(&loaded)?;

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read seed file {}", args.file))?;
    let entities = seed_entities(serde_json::from_str(&content)?)?;

    for entity in entities {
        let guid = catalog.seed(entity).context("Failed to seed entity")?;
        println!("  seeded {}", guid);
    }
    println!("Catalog {} now holds {} entities", catalog.path().display(), catalog.snapshot()?.len());
    Ok(())
}

fn show(args: &CatalogShowArgs, global: &GlobalArgs) -> Result<()> {
    let loaded = load_config(global)?;
    let catalog = open_catalog_file(&loaded)?;

    let entities: Vec<StoredEntity> = catalog
        .snapshot()?
        .into_iter()
        .filter(|stored| {
            args.type_name
                .as_deref()
                .is_none_or(|t| stored.type_name() == Some(t))
        })
        .filter(|stored| {
            args.collection
                .as_deref()
                .is_none_or(|c| stored.collection.as_deref() == Some(c))
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entities)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_entities_accepts_list_and_envelope() {
        let entity = json!({"typeName": "t", "attributes": {"qualifiedName": "q"}});
        assert_eq!(seed_entities(json!([entity.clone()])).unwrap().len(), 1);
        assert_eq!(
            seed_entities(json!({"entities": [entity.clone(), entity]}))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_seed_entities_rejects_other_shapes() {
        assert!(seed_entities(json!({"value": []})).is_err());
        assert!(seed_entities(json!("entities")).is_err());
    }
}
