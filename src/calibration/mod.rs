//! Calibration document management
//!
//! Calibrations are saved as JSON files. Each document records the standards
//! used, the standard-measurement filter protocol, and the remaining
//! calibration settings; the analyses it was built from are keyed by
//! (date, reading number). This module manages the documents as data only --
//! it performs no quantification.

pub mod model;
pub mod store;

pub use model::{AnalysisKey, CalibrationDoc, FilterProtocol, SCHEMA_VERSION};
pub use store::{CalibrationStore, CalibrationSummary};
