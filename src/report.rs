//! Validation reports
//!
//! A serializable record of one pass, printed or written on request by the
//! CLI. Nothing here is read back.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::checksum::Checksum;
use crate::error::Result;
use crate::sink::{CollectingSink, RowFaultRecord};
use crate::validator::{ValidationSummary, Violation, ViolationKind};

/// Number of violations of each kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub missing_required: usize,
    pub wrong_type: usize,
    pub too_long: usize,
}

impl KindCounts {
    fn tally(violations: &[Violation]) -> Self {
        violations.iter().fold(Self::default(), |mut counts, v| {
            match v.kind {
                ViolationKind::MissingRequired => counts.missing_required += 1,
                ViolationKind::WrongType { .. } => counts.wrong_type += 1,
                ViolationKind::TooLong { .. } => counts.too_long += 1,
            }
            counts
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    /// Fingerprint of the schema source
    pub schema_checksum: Option<Checksum>,
    pub summary: ValidationSummary,
    pub counts: KindCounts,
    pub violations: Vec<Violation>,
    pub row_faults: Vec<RowFaultRecord>,
}

impl ValidationReport {
    /// Build a report from a sink that saw a completed pass
    pub fn new(schema_checksum: Option<Checksum>, sink: CollectingSink) -> Self {
        let summary = sink.summary().copied().unwrap_or_default();
        let (violations, row_faults) = sink.into_parts();
        Self {
            generated_at: Utc::now(),
            schema_checksum,
            summary,
            counts: KindCounts::tally(&violations),
            violations,
            row_faults,
        }
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn write_to(&self, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
        std::fs::write(path, self.to_json(pretty)?)?;
        Ok(())
    }
}
