//! CSV 读写共享逻辑
//!
//! Reads one exported Niton sheet per CSV file and writes measurement
//! exports. Shared by the CLI commands.

use chrono::Utc;
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::errors::{NitondbError, Result};

/// One raw export row, keyed by header name. `row_num` is the 1-based line in
/// the source file (header is line 1).
#[derive(Debug, Clone)]
pub struct RawReadingRow {
    pub row_num: usize,
    pub cells: BTreeMap<String, String>,
}

impl RawReadingRow {
    /// Cell lookup; empty cells come back as None.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// A parsed export sheet: headers plus raw rows.
#[derive(Debug, Clone)]
pub struct ReadingSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawReadingRow>,
}

impl ReadingSheet {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

/// 从 CSV 文件读取一个 Niton 导出表
pub fn read_reading_sheet<P: AsRef<Path>>(path: P) -> Result<ReadingSheet> {
    let file = File::open(path.as_ref())
        .map_err(|e| NitondbError::file_operation(format!("Failed to open file: {}", e)))?;
    let reader = BufReader::new(file);
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| NitondbError::csv_parse(format!("Failed to read headers: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let row_num = row_idx + 2; // 1-based，跳过 header
        let record = result
            .map_err(|e| NitondbError::csv_parse(format!("Row {}: {}", row_num, e)))?;

        let mut cells = BTreeMap::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            cells.insert(header.clone(), value.trim().to_string());
        }
        rows.push(RawReadingRow { row_num, cells });
    }

    Ok(ReadingSheet { headers, rows })
}

/// 测量导出行（仅用于序列化）
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementCsvRow {
    pub analysis: String,
    pub quantity: String,
    pub mean: f64,
    pub measurement_unit: String,
    pub uncertainty: Option<f64>,
    pub uncertainty_unit: String,
    pub reference_material: String,
}

/// 导出测量到 CSV 文件
pub fn export_measurements_to_csv<P: AsRef<Path>>(
    rows: &[MeasurementCsvRow],
    path: P,
) -> Result<()> {
    let file = File::create(path.as_ref())
        .map_err(|e| NitondbError::file_operation(format!("Failed to create file: {}", e)))?;
    let writer = BufWriter::new(file);
    let mut csv_writer = WriterBuilder::new().from_writer(writer);

    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| NitondbError::serialization(format!("Failed to write CSV row: {}", e)))?;
    }

    csv_writer
        .flush()
        .map_err(|e| NitondbError::file_operation(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}

/// 生成默认导出文件名（带时间戳）
pub fn generate_export_filename() -> String {
    format!(
        "standard_measurements_export_{}.csv",
        Utc::now().format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_reading_sheet() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            "Reading No,Reading Type,Time,Sample Depth,Fe Concentration,Fe Error"
        )
        .unwrap();
        writeln!(temp_file, "101,ucsb mining,2025-03-01 10:15:00,BHVO-2,85000,450").unwrap();
        writeln!(temp_file, "102,ucsb mining,2025-03-01 10:20:00,AGV-2,<LOD,").unwrap();

        let sheet = read_reading_sheet(temp_file.path()).unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert!(sheet.has_column("Reading No"));
        assert_eq!(sheet.rows[0].row_num, 2);
        assert_eq!(sheet.rows[0].get("Reading No"), Some("101"));
        assert_eq!(sheet.rows[1].get("Fe Concentration"), Some("<LOD"));
        // empty cell reads back as None
        assert_eq!(sheet.rows[1].get("Fe Error"), None);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_reading_sheet("/nonexistent/file.csv");
        assert!(result.is_err());
    }

    #[test]
    fn test_export_measurements() {
        let rows = vec![MeasurementCsvRow {
            analysis: "101".to_string(),
            quantity: "Fe".to_string(),
            mean: 85000.0,
            measurement_unit: "ppm".to_string(),
            uncertainty: Some(450.0),
            uncertainty_unit: "ppm".to_string(),
            reference_material: String::new(),
        }];

        let temp_file = NamedTempFile::new().unwrap();
        export_measurements_to_csv(&rows, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("analysis,quantity,mean"));
        assert!(content.contains("101,Fe,85000.0"));
    }

    #[test]
    fn test_generate_export_filename() {
        let filename = generate_export_filename();
        assert!(filename.starts_with("standard_measurements_export_"));
        assert!(filename.ends_with(".csv"));
    }
}
