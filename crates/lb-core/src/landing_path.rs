//! Landing area paths.
//!
//! Landed events live at `<zone>/<source>/application=<app>/date=<date>/<file>`.
//! Storage triggers may report the path with a leading container segment, so
//! parsing keys off the last five segments.

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::fmt;

const SEGMENTS: usize = 5;

/// Components of a landing path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LandingPath {
    pub zone: String,
    pub source: String,
    /// Application (use case) that produced the event
    pub usecase: String,
    /// Processing date, `YYYY-MM-DD`
    pub date: String,
    pub filename: String,
}

impl LandingPath {
    /// Build the path for a newly landed file.
    pub fn new(
        zone: impl Into<String>,
        source: impl Into<String>,
        usecase: impl Into<String>,
        date: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            zone: zone.into(),
            source: source.into(),
            usecase: usecase.into(),
            date: date.into(),
            filename: filename.into(),
        }
    }

    /// Parse a slash-delimited landing path.
    pub fn parse(path: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidLandingPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if path.trim().is_empty() {
            return Err(invalid("path is empty"));
        }

        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        if parts.len() < SEGMENTS {
            return Err(invalid(&format!(
                "expected at least {SEGMENTS} segments, found {}",
                parts.len()
            )));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("path contains an empty segment"));
        }

        let tail = &parts[parts.len() - SEGMENTS..];
        Ok(Self {
            zone: tail[0].to_string(),
            source: tail[1].to_string(),
            usecase: segment_value(tail[2]).to_string(),
            date: segment_value(tail[3]).to_string(),
            filename: tail[4].to_string(),
        })
    }
}

/// `application=sales` yields `sales`; plain segments are returned as-is.
fn segment_value(segment: &str) -> &str {
    match segment.split_once('=') {
        Some((_, value)) => value,
        None => segment,
    }
}

impl fmt::Display for LandingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/application={}/date={}/{}",
            self.zone, self.source, self.usecase, self.date, self.filename
        )
    }
}

#[cfg(test)]
#[path = "landing_path_test.rs"]
mod tests;
