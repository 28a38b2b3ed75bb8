//! Lineage events as produced by the Spline agent of a transformation run.
//!
//! The JSON shape is fixed by the producer (`inPutTable`, `outPutTable`,
//! `qualifiedpath`), so the serde renames below are part of the wire contract.

use crate::error::{CoreError, CoreResult};
use crate::names::{ApplicationName, QualifiedName};
use serde::{Deserialize, Serialize};

/// One transformation run: which datasets were read and which one was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEvent {
    /// Identifier of the run
    pub process_id: String,

    /// Name of the job; the process entity's qualified name derives from it
    pub process_name: String,

    /// Application that emitted the event
    pub application_short_name: ApplicationName,

    /// Start of the run, epoch milliseconds
    pub event_timestamp: i64,

    /// Datasets read by the run, in declaration order
    #[serde(rename = "inPutTable")]
    pub inputs: Vec<DatasetDescriptor>,

    /// Dataset written by the run
    #[serde(rename = "outPutTable")]
    pub output: DatasetDescriptor,
}

/// A dataset read or written by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescriptor {
    pub id: String,

    pub name: String,

    /// Producer-side dataset kind (e.g. `parquet`, `delta`)
    #[serde(rename = "type", default)]
    pub dataset_type: String,

    #[serde(default)]
    pub linked_transformation_id: Option<String>,

    /// Storage path, used verbatim as the catalog lookup key
    #[serde(rename = "qualifiedpath")]
    pub qualified_path: String,

    /// Columns in schema order
    pub schema: Vec<ColumnDescriptor>,
}

/// A single column of a dataset schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub column_name: String,
    pub column_id: String,
}

impl LineageEvent {
    /// Parse and validate an event from raw JSON bytes.
    ///
    /// Any deserialization failure or structural problem is reported as
    /// [`CoreError::MalformedEvent`]; an event is never partially accepted.
    pub fn from_slice(bytes: &[u8]) -> CoreResult<Self> {
        let event: LineageEvent = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::malformed(format!("invalid event JSON: {e}")))?;
        event.validate()?;
        Ok(event)
    }

    /// Parse and validate an event from a JSON string.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Self::from_slice(json.as_bytes())
    }

    /// Check the structural requirements serde cannot express.
    pub fn validate(&self) -> CoreResult<()> {
        if self.process_name.trim().is_empty() {
            return Err(CoreError::malformed("processName is empty"));
        }
        if self.inputs.is_empty() {
            return Err(CoreError::malformed(format!(
                "process '{}' declares no input tables",
                self.process_name
            )));
        }
        for dataset in self.inputs.iter().chain(std::iter::once(&self.output)) {
            dataset.validate()?;
        }
        Ok(())
    }

    /// The first declared input, the one column mappings are computed against.
    pub fn primary_input(&self) -> Option<&DatasetDescriptor> {
        self.inputs.first()
    }
}

impl DatasetDescriptor {
    /// Qualified name of the dataset.
    ///
    /// Only meaningful after [`validate`](Self::validate) succeeded, which
    /// guarantees the path is non-empty.
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.qualified_path.clone())
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.schema.iter().map(|c| c.column_name.clone()).collect()
    }

    fn validate(&self) -> CoreResult<()> {
        if self.qualified_path.trim().is_empty() {
            return Err(CoreError::malformed(format!(
                "dataset '{}' has an empty qualifiedpath",
                self.name
            )));
        }
        if let Some(column) = self.schema.iter().find(|c| c.column_name.is_empty()) {
            return Err(CoreError::malformed(format!(
                "dataset '{}' has a column without a name (columnId '{}')",
                self.name, column.column_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
