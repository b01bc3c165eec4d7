//! Conversions between domain records and SeaORM entity models.

use sea_orm::Set;

use crate::storage::models::{AliquotRecord, AnalysisRecord, MeasurementRecord};
use migration::entities::{aliquot, analysis, measurement};

pub fn aliquot_to_active_model(record: &AliquotRecord) -> aliquot::ActiveModel {
    aliquot::ActiveModel {
        aliquot: Set(record.aliquot.clone()),
        sample: Set(record.sample.clone()),
        material: Set(record.material.clone()),
    }
}

pub fn model_to_aliquot(model: aliquot::Model) -> AliquotRecord {
    AliquotRecord {
        aliquot: model.aliquot,
        sample: model.sample,
        material: model.material,
    }
}

pub fn analysis_to_active_model(record: &AnalysisRecord) -> analysis::ActiveModel {
    analysis::ActiveModel {
        analysis: Set(record.analysis.clone()),
        aliquot: Set(record.aliquot.clone()),
        sample: Set(record.sample.clone()),
        date: Set(record.date),
        instrument: Set(record.instrument.clone()),
        technique: Set(record.technique.clone()),
    }
}

pub fn model_to_analysis(model: analysis::Model) -> AnalysisRecord {
    AnalysisRecord {
        analysis: model.analysis,
        aliquot: model.aliquot,
        sample: model.sample,
        date: model.date,
        instrument: model.instrument,
        technique: model.technique,
    }
}

pub fn measurement_to_active_model(record: &MeasurementRecord) -> measurement::ActiveModel {
    measurement::ActiveModel {
        analysis: Set(record.analysis.clone()),
        quantity: Set(record.quantity.clone()),
        mean: Set(record.mean),
        measurement_unit: Set(record.measurement_unit.clone()),
        uncertainty: Set(record.uncertainty),
        uncertainty_unit: Set(record.uncertainty_unit.clone()),
        reference_material: Set(record.reference_material.clone()),
    }
}

pub fn model_to_measurement(model: measurement::Model) -> MeasurementRecord {
    MeasurementRecord {
        analysis: model.analysis,
        quantity: model.quantity,
        mean: model.mean,
        measurement_unit: model.measurement_unit,
        uncertainty: model.uncertainty,
        uncertainty_unit: model.uncertainty_unit,
        reference_material: model.reference_material,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_aliquot_roundtrip() {
        let record = AliquotRecord {
            aliquot: "BHVO-2".to_string(),
            sample: "BHVO-2".to_string(),
            material: "powder".to_string(),
        };
        let model = aliquot::Model {
            aliquot: record.aliquot.clone(),
            sample: record.sample.clone(),
            material: record.material.clone(),
        };
        assert_eq!(model_to_aliquot(model), record);
    }

    #[test]
    fn test_measurement_roundtrip() {
        let record = MeasurementRecord {
            analysis: "101".to_string(),
            quantity: "Fe".to_string(),
            mean: 85000.0,
            measurement_unit: "ppm".to_string(),
            uncertainty: None,
            uncertainty_unit: "ppm".to_string(),
            reference_material: String::new(),
        };
        let model = measurement::Model {
            analysis: record.analysis.clone(),
            quantity: record.quantity.clone(),
            mean: record.mean,
            measurement_unit: record.measurement_unit.clone(),
            uncertainty: record.uncertainty,
            uncertainty_unit: record.uncertainty_unit.clone(),
            reference_material: record.reference_material.clone(),
        };
        assert_eq!(model_to_measurement(model), record);
    }

    #[test]
    fn test_analysis_to_active_model_sets_date() {
        let record = AnalysisRecord {
            analysis: "101".to_string(),
            aliquot: "BHVO-2".to_string(),
            sample: "BHVO-2".to_string(),
            date: Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap(),
            instrument: "Niton XL5 Plus".to_string(),
            technique: "ucsb mining".to_string(),
        };
        let active = analysis_to_active_model(&record);
        assert_eq!(active.analysis.unwrap(), "101");
        assert_eq!(active.date.unwrap(), record.date);
    }
}
