//! Process entity construction

use crate::error::EngineResult;
use crate::guid::GuidAllocator;
use crate::mapping::ColumnMapping;
use crate::settings::EngineSettings;
use chrono::{DateTime, Utc};
use lb_core::{CatalogEntity, EntityKind, LineageEvent, QualifiedName, Relationship};

/// Build the process entity linking the input tables to the output table.
///
/// `completed_at` is recorded as the process end time.
pub fn build_process(
    event: &LineageEvent,
    inputs: &[&CatalogEntity],
    output: &CatalogEntity,
    mapping: &ColumnMapping,
    allocator: &GuidAllocator,
    settings: &EngineSettings,
    completed_at: DateTime<Utc>,
) -> EngineResult<CatalogEntity> {
    let qualified_name = QualifiedName::new(format!(
        "{}{}",
        event.process_name, settings.process_suffix
    ));
    let mut process = CatalogEntity::new(
        EntityKind::Process,
        event.process_id.clone(),
        settings.process_type.clone(),
        qualified_name,
        allocator.next(),
    );

    process.set_attribute("owner", event.application_short_name.to_string());
    process.set_attribute(
        "description",
        settings.describe(&event.process_name, &event.application_short_name),
    );
    process.set_attribute("startTime", event.event_timestamp);
    process.set_attribute("endTime", completed_at.timestamp_millis());
    process.set_attribute("columnMapping", mapping.to_attribute_value()?);

    process.set_relationship(
        "inputs",
        Relationship::Many(inputs.iter().map(|t| t.reference()).collect()),
    );
    process.set_relationship("outputs", Relationship::Many(vec![output.reference()]));

    Ok(process)
}
