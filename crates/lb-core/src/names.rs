//! Strongly-typed names used across the catalog graph.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// Globally unique key of an entity within the catalog namespace.
    ///
    /// For tables this is the dataset's storage path; for columns it is
    /// `<table qualified name>#<column name>`.
    pub struct QualifiedName;
}

define_newtype_string! {
    /// Short name of the application that emitted a lineage event.
    ///
    /// Used to pick the column correspondence policy and to key the landing area.
    pub struct ApplicationName;
}

impl QualifiedName {
    /// Qualified name of a column owned by this table.
    pub fn column(&self, column_name: &str) -> QualifiedName {
        QualifiedName(format!("{}#{}", self.0, column_name))
    }

    /// Append a suffix, e.g. the catalog's partition marker.
    pub fn with_suffix(&self, suffix: &str) -> QualifiedName {
        QualifiedName(format!("{}{}", self.0, suffix))
    }
}
