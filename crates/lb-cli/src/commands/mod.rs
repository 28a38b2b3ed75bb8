//! CLI command implementations

pub(crate) mod catalog;
pub(crate) mod common;
pub(crate) mod parse_path;
pub(crate) mod process;
pub(crate) mod serve;
pub(crate) mod translate;
