use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{NitondbError, Result};

/// Current calibration document schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Composite identity of an analysis inside a calibration document:
/// (date, reading number).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnalysisKey {
    /// Calendar date of the reading, `YYYY-MM-DD`.
    pub date: String,
    pub reading_no: String,
}

/// Filter applied when selecting standard measurements for a calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterProtocol {
    /// Only readings of this type are eligible (e.g. "ucsb mining").
    #[serde(default)]
    pub reading_type: Option<String>,
    /// Minimum reading duration in seconds, when the export carries one.
    #[serde(default)]
    pub min_duration_secs: Option<f64>,
    /// Drop measurements reported without an uncertainty.
    #[serde(default)]
    pub require_uncertainty: bool,
}

/// A calibration document as persisted to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationDoc {
    pub name: String,
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub instrument: String,
    /// Aliquot names of the standards this calibration was built from.
    pub standards: Vec<String>,
    pub filter_protocol: FilterProtocol,
    /// Other calibration settings, kept schema-free.
    #[serde(default)]
    pub settings: BTreeMap<String, serde_json::Value>,
    /// Analyses used, keyed by (date, reading number).
    #[serde(default)]
    pub analyses: Vec<AnalysisKey>,
    /// Quantities the calibration covers.
    #[serde(default)]
    pub quantities: Vec<String>,
}

impl CalibrationDoc {
    /// A blank document for `calibration init`.
    pub fn template(name: &str, instrument: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            schema_version: SCHEMA_VERSION,
            created_at: now,
            modified_at: now,
            instrument: instrument.to_string(),
            standards: Vec::new(),
            filter_protocol: FilterProtocol::default(),
            settings: BTreeMap::new(),
            analyses: Vec::new(),
            quantities: Vec::new(),
        }
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    /// Structural validation; database-backed checks live in the store.
    ///
    /// Checks: supported schema version, non-empty name and standards list,
    /// unique (date, reading number) keys.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(NitondbError::calibration_invalid(format!(
                "Unsupported schema_version {} (current is {})",
                self.schema_version, SCHEMA_VERSION
            )));
        }

        if self.name.trim().is_empty() {
            return Err(NitondbError::calibration_invalid("Empty calibration name"));
        }

        if self.standards.is_empty() {
            return Err(NitondbError::calibration_invalid(
                "Calibration lists no standards",
            ));
        }

        let mut seen: BTreeSet<&AnalysisKey> = BTreeSet::new();
        for key in &self.analyses {
            if !seen.insert(key) {
                return Err(NitondbError::calibration_invalid(format!(
                    "Duplicate analysis key ({}, {})",
                    key.date, key.reading_no
                )));
            }
        }

        Ok(())
    }
}
