use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A standard aliquot registered in the database. Sample name mirrors the
/// aliquot name for standards; all current standards are powders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliquotRecord {
    pub aliquot: String,
    pub sample: String,
    pub material: String,
}

/// One analysis (a single instrument reading) of a standard aliquot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Reading number as a string.
    pub analysis: String,
    pub aliquot: String,
    pub sample: String,
    pub date: DateTime<Utc>,
    pub instrument: String,
    pub technique: String,
}

/// One quantity measured within an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub analysis: String,
    pub quantity: String,
    pub mean: f64,
    pub measurement_unit: String,
    pub uncertainty: Option<f64>,
    pub uncertainty_unit: String,
    #[serde(default)]
    pub reference_material: String,
}

/// Everything one export sheet contributes to the database.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub aliquots: Vec<AliquotRecord>,
    pub analyses: Vec<AnalysisRecord>,
    pub measurements: Vec<MeasurementRecord>,
}

impl RecordSet {
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}
