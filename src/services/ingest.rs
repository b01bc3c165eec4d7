//! Record-set assembly
//!
//! Turns validated readings plus an aliquot match outcome into the aliquot,
//! analysis, and measurement records one export contributes to the database.
//! Readings whose sample label did not match a registered aliquot are dropped
//! (standards must already exist; ingestion never creates new ones).

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::errors::{NitondbError, Result};
use crate::services::matching::MatchOutcome;
use crate::services::validation::ReadingRecord;
use crate::storage::models::{AliquotRecord, AnalysisRecord, MeasurementRecord, RecordSet};
use crate::utils::measurement_dict::MeasurementDict;

/// Build the database record set for one export sheet.
///
/// `matches` must come from matching the sheet's sample labels against the
/// aliquots already registered in the database. Errors if no reading matched
/// at all.
pub fn build_record_set(
    readings: &[ReadingRecord],
    matches: &MatchOutcome,
    dict: &MeasurementDict,
    instrument: &str,
    material: &str,
) -> Result<RecordSet> {
    if matches.matched.is_empty() {
        return Err(NitondbError::no_matching_standards(
            "No sample labels matched a registered standard aliquot",
        ));
    }

    let mut record_set = RecordSet::default();
    let mut seen_aliquots: BTreeSet<&str> = BTreeSet::new();
    let mut seen_analyses: BTreeSet<&str> = BTreeSet::new();
    let mut dropped = 0usize;

    for reading in readings {
        let Some(aliquot) = matches.matched.get(&reading.sample_label) else {
            dropped += 1;
            continue;
        };

        if seen_aliquots.insert(aliquot) {
            record_set.aliquots.push(AliquotRecord {
                aliquot: aliquot.clone(),
                // sample name mirrors the aliquot name for standards
                sample: aliquot.clone(),
                material: material.to_string(),
            });
        }

        // a reading number repeated within one export contributes a single
        // analysis row; its measurements still flow through so the last
        // row wins at the upsert
        if seen_analyses.insert(&reading.reading_no) {
            record_set.analyses.push(AnalysisRecord {
                analysis: reading.reading_no.clone(),
                aliquot: aliquot.clone(),
                sample: aliquot.clone(),
                date: reading.time,
                instrument: instrument.to_string(),
                technique: reading.reading_type.clone(),
            });
        }

        for (quantity, value) in &reading.values {
            let Some(columns) = dict.columns(quantity) else {
                continue;
            };
            record_set.measurements.push(MeasurementRecord {
                analysis: reading.reading_no.clone(),
                quantity: quantity.clone(),
                mean: value.mean,
                measurement_unit: columns.mean_unit.clone().unwrap_or_default(),
                uncertainty: value.uncertainty,
                uncertainty_unit: columns.uncertainty_unit.clone().unwrap_or_default(),
                reference_material: String::new(),
            });
        }
    }

    if dropped > 0 {
        warn!("Dropped {} readings with unmatched sample labels", dropped);
    }
    info!(
        "Record set: {} aliquots, {} analyses, {} measurements",
        record_set.aliquots.len(),
        record_set.analyses.len(),
        record_set.measurements.len()
    );

    Ok(record_set)
}
