//! 导出表验证逻辑
//!
//! Provides the shared "raw export row → typed ReadingRecord" conversion so
//! the match/check/add/update commands all validate identically. Per-row
//! failures carry the 1-based source row number.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use tracing::warn;

use crate::errors::{NitondbError, Result};
use crate::utils::csv_handler::{RawReadingRow, ReadingSheet};
use crate::utils::measurement_dict::MeasurementDict;

/// Columns every Niton export must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Reading No", "Reading Type", "Time", "Sample Depth"];

/// Below-limit-of-detection marker used by the instrument software.
pub const BELOW_LOD: &str = "<LOD";

/// A measured value for one quantity within one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredValue {
    pub mean: f64,
    pub uncertainty: Option<f64>,
}

/// One validated reading (analysis) from an export sheet.
#[derive(Debug, Clone)]
pub struct ReadingRecord {
    /// 1-based source row number
    pub row_num: usize,
    pub reading_no: String,
    pub reading_type: String,
    pub time: DateTime<Utc>,
    /// Raw sample label from the `Sample Depth` column, matched to an
    /// aliquot later.
    pub sample_label: String,
    /// quantity → measured value; quantities below LOD are absent
    pub values: BTreeMap<String, MeasuredValue>,
}

/// 单行验证错误
#[derive(Debug, Clone)]
pub struct RowError {
    pub row_num: usize,
    pub error: NitondbError,
}

/// Validate sheet structure: required columns plus at least one dictionary
/// measurement column.
pub fn validate_reading_sheet(sheet: &ReadingSheet, dict: &MeasurementDict) -> Result<()> {
    for col in REQUIRED_COLUMNS {
        if !sheet.has_column(col) {
            return Err(NitondbError::validation(format!(
                "Missing required column: {}",
                col
            )));
        }
    }

    let has_measurement = dict
        .measurement_columns()
        .iter()
        .any(|col| sheet.has_column(col));
    if !has_measurement {
        return Err(NitondbError::validation(
            "No measurement columns found in sheet",
        ));
    }

    Ok(())
}

/// Parse the `Time` column. The instrument writes local wall-clock times
/// without a zone; they are recorded as UTC. RFC 3339 is accepted as a
/// fallback for re-imported exports.
fn parse_reading_time(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%m/%d/%Y %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    let parsed = DateTime::parse_from_rfc3339(raw)?;
    Ok(parsed.with_timezone(&Utc))
}

/// Convert a single raw row. Validation order:
/// 1. required cells non-empty
/// 2. `Time` parses
/// 3. per-quantity means: `<LOD` / empty skipped, otherwise numeric
fn convert_row(row: &RawReadingRow, dict: &MeasurementDict) -> std::result::Result<ReadingRecord, RowError> {
    let row_num = row.row_num;

    let required_cell = |column: &str| -> std::result::Result<String, RowError> {
        row.get(column)
            .map(str::to_string)
            .ok_or_else(|| RowError {
                row_num,
                error: NitondbError::validation(format!("Empty required cell: {}", column)),
            })
    };

    let reading_no = required_cell("Reading No")?;
    let reading_type = required_cell("Reading Type")?;
    let time_raw = required_cell("Time")?;
    let sample_label = required_cell("Sample Depth")?;

    let time = parse_reading_time(&time_raw).map_err(|e| RowError {
        row_num,
        error: NitondbError::date_parse(format!(
            "Reading {}: invalid time '{}': {}",
            reading_no, time_raw, e
        )),
    })?;

    let mut values = BTreeMap::new();
    for quantity in dict.quantities() {
        let columns = match dict.columns(quantity) {
            Some(c) if c.is_complete() => c,
            _ => continue,
        };
        let mean_column = columns.mean_column.as_deref().unwrap_or_default();
        let uncert_column = columns.uncertainty_column.as_deref().unwrap_or_default();

        let mean_raw = match row.get(mean_column) {
            Some(v) if v != BELOW_LOD => v,
            _ => continue,
        };
        let mean: f64 = match mean_raw.parse() {
            Ok(v) => v,
            Err(_) => {
                return Err(RowError {
                    row_num,
                    error: NitondbError::validation(format!(
                        "Reading {}: non-numeric value '{}' in column '{}'",
                        reading_no, mean_raw, mean_column
                    )),
                });
            }
        };

        let uncertainty = row
            .get(uncert_column)
            .filter(|v| *v != BELOW_LOD)
            .and_then(|v| v.parse::<f64>().ok());

        values.insert(quantity.to_string(), MeasuredValue { mean, uncertainty });
    }

    Ok(ReadingRecord {
        row_num,
        reading_no,
        reading_type,
        time,
        sample_label,
        values,
    })
}

/// 批量转换导出行，返回 (成功项, 失败项)
pub fn convert_rows(
    sheet: &ReadingSheet,
    dict: &MeasurementDict,
) -> (Vec<ReadingRecord>, Vec<RowError>) {
    let mut valid = Vec::with_capacity(sheet.rows.len());
    let mut errors = Vec::new();

    for row in &sheet.rows {
        match convert_row(row, dict) {
            Ok(record) => valid.push(record),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        warn!(
            "Export conversion: {} of {} rows rejected",
            errors.len(),
            sheet.rows.len()
        );
    }

    (valid, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn dict() -> MeasurementDict {
        MeasurementDict::embedded().unwrap()
    }

    fn make_row(row_num: usize, cells: &[(&str, &str)]) -> RawReadingRow {
        let cells: BTreeMap<String, String> = cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RawReadingRow { row_num, cells }
    }

    fn base_cells<'a>() -> Vec<(&'a str, &'a str)> {
        vec![
            ("Reading No", "101"),
            ("Reading Type", "ucsb mining"),
            ("Time", "2025-03-01 10:15:00"),
            ("Sample Depth", "BHVO-2"),
            ("Fe Concentration", "85000"),
            ("Fe Error", "450"),
        ]
    }

    #[test]
    fn test_validate_sheet_ok() {
        let sheet = ReadingSheet {
            headers: vec![
                "Reading No".into(),
                "Reading Type".into(),
                "Time".into(),
                "Sample Depth".into(),
                "Fe Concentration".into(),
            ],
            rows: vec![],
        };
        assert!(validate_reading_sheet(&sheet, &dict()).is_ok());
    }

    #[test]
    fn test_validate_sheet_missing_required() {
        let sheet = ReadingSheet {
            headers: vec!["Reading No".into(), "Time".into(), "Sample Depth".into()],
            rows: vec![],
        };
        let err = validate_reading_sheet(&sheet, &dict()).unwrap_err();
        assert!(err.message().contains("Reading Type"));
    }

    #[test]
    fn test_validate_sheet_no_measurement_columns() {
        let sheet = ReadingSheet {
            headers: REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            rows: vec![],
        };
        let err = validate_reading_sheet(&sheet, &dict()).unwrap_err();
        assert!(err.message().contains("No measurement columns"));
    }

    #[test]
    fn test_convert_valid_row() {
        let row = make_row(2, &base_cells());
        let record = convert_row(&row, &dict()).unwrap();
        assert_eq!(record.reading_no, "101");
        assert_eq!(record.sample_label, "BHVO-2");
        let fe = record.values.get("Fe").unwrap();
        assert_eq!(fe.mean, 85000.0);
        assert_eq!(fe.uncertainty, Some(450.0));
    }

    #[test]
    fn test_lod_skipped() {
        let mut cells = base_cells();
        cells.push(("Cu Concentration", "<LOD"));
        cells.push(("Cu Error", "12"));
        let record = convert_row(&make_row(2, &cells), &dict()).unwrap();
        assert!(!record.values.contains_key("Cu"));
        assert!(record.values.contains_key("Fe"));
    }

    #[test]
    fn test_missing_uncertainty_kept_as_none() {
        let mut cells = base_cells();
        cells.retain(|(k, _)| *k != "Fe Error");
        let record = convert_row(&make_row(2, &cells), &dict()).unwrap();
        assert_eq!(record.values.get("Fe").unwrap().uncertainty, None);
    }

    #[test]
    fn test_bad_time_rejected_with_row_num() {
        let mut cells = base_cells();
        cells.iter_mut().find(|(k, _)| *k == "Time").unwrap().1 = "not-a-date";
        let err = convert_row(&make_row(7, &cells), &dict()).unwrap_err();
        assert_eq!(err.row_num, 7);
        assert_eq!(err.error.code(), "E008");
    }

    #[test]
    fn test_non_numeric_mean_rejected() {
        let mut cells = base_cells();
        cells
            .iter_mut()
            .find(|(k, _)| *k == "Fe Concentration")
            .unwrap()
            .1 = "oops";
        let err = convert_row(&make_row(3, &cells), &dict()).unwrap_err();
        assert_eq!(err.row_num, 3);
        assert!(err.error.message().contains("non-numeric"));
    }

    #[test]
    fn test_empty_required_cell_rejected() {
        let mut cells = base_cells();
        cells.iter_mut().find(|(k, _)| *k == "Sample Depth").unwrap().1 = "";
        let err = convert_row(&make_row(4, &cells), &dict()).unwrap_err();
        assert!(err.error.message().contains("Sample Depth"));
    }

    #[test]
    fn test_rfc3339_time_fallback() {
        let mut cells = base_cells();
        cells.iter_mut().find(|(k, _)| *k == "Time").unwrap().1 = "2025-03-01T10:15:00Z";
        let record = convert_row(&make_row(2, &cells), &dict()).unwrap();
        assert_eq!(record.time.to_rfc3339(), "2025-03-01T10:15:00+00:00");
    }

    #[test]
    fn test_convert_rows_partitions() {
        let good = make_row(2, &base_cells());
        let mut bad_cells = base_cells();
        bad_cells.iter_mut().find(|(k, _)| *k == "Time").unwrap().1 = "garbage";
        let bad = make_row(3, &bad_cells);

        let sheet = ReadingSheet {
            headers: base_cells().iter().map(|(k, _)| k.to_string()).collect(),
            rows: vec![good, bad],
        };
        let (valid, errors) = convert_rows(&sheet, &dict());
        assert_eq!(valid.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row_num, 3);
    }
}
