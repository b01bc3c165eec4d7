//! Niton measurement dictionary
//!
//! Maps each quantity (element) to the export columns holding its mean and
//! uncertainty, and the units they are reported in. A built-in dictionary is
//! embedded in the binary; a site-specific CSV can be supplied via config.
//!
//! Dictionary CSV columns: `quantity,type,niton column,unit` with
//! `type` being `mean` or `uncertainty`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{NitondbError, Result};

/// Built-in dictionary for Niton XL5 Plus mining-mode exports.
const EMBEDDED_DICT: &str = include_str!("../../assets/niton_measurement_dict.csv");

#[derive(Debug, Clone, Deserialize)]
struct DictRow {
    quantity: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "niton column")]
    niton_column: String,
    unit: String,
}

/// Column mapping for a single quantity.
#[derive(Debug, Clone, Default)]
pub struct QuantityColumns {
    pub mean_column: Option<String>,
    pub mean_unit: Option<String>,
    pub uncertainty_column: Option<String>,
    pub uncertainty_unit: Option<String>,
}

impl QuantityColumns {
    /// A quantity is only ingested when both columns are mapped.
    pub fn is_complete(&self) -> bool {
        self.mean_column.is_some() && self.uncertainty_column.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct MeasurementDict {
    /// Quantities in dictionary order (deduplicated).
    order: Vec<String>,
    columns: BTreeMap<String, QuantityColumns>,
}

impl MeasurementDict {
    /// Parse the dictionary embedded in the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_reader(EMBEDDED_DICT.as_bytes())
    }

    /// Load a dictionary from an external CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            NitondbError::file_operation(format!("Failed to open dictionary: {}", e))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut order: Vec<String> = Vec::new();
        let mut columns: BTreeMap<String, QuantityColumns> = BTreeMap::new();

        for (row_idx, result) in csv_reader.deserialize::<DictRow>().enumerate() {
            let row_num = row_idx + 2;
            let row = result.map_err(|e| {
                NitondbError::dictionary_error(format!("Row {}: {}", row_num, e))
            })?;

            if row.quantity.is_empty() || row.niton_column.is_empty() {
                return Err(NitondbError::dictionary_error(format!(
                    "Row {}: empty quantity or column name",
                    row_num
                )));
            }

            if !columns.contains_key(&row.quantity) {
                order.push(row.quantity.clone());
            }
            let entry = columns.entry(row.quantity.clone()).or_default();
            match row.kind.as_str() {
                "mean" => {
                    entry.mean_column = Some(row.niton_column);
                    entry.mean_unit = Some(row.unit);
                }
                "uncertainty" => {
                    entry.uncertainty_column = Some(row.niton_column);
                    entry.uncertainty_unit = Some(row.unit);
                }
                other => {
                    return Err(NitondbError::dictionary_error(format!(
                        "Row {}: unknown type '{}' (expected mean or uncertainty)",
                        row_num, other
                    )));
                }
            }
        }

        if order.is_empty() {
            return Err(NitondbError::dictionary_error(
                "Dictionary contains no quantities",
            ));
        }

        Ok(Self { order, columns })
    }

    /// Quantities in dictionary order.
    pub fn quantities(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn columns(&self, quantity: &str) -> Option<&QuantityColumns> {
        self.columns.get(quantity)
    }

    /// Every mapped export column, used to check that an export carries at
    /// least one measurement column.
    pub fn measurement_columns(&self) -> Vec<&str> {
        let mut cols = Vec::new();
        for entry in self.columns.values() {
            if let Some(c) = &entry.mean_column {
                cols.push(c.as_str());
            }
            if let Some(c) = &entry.uncertainty_column {
                cols.push(c.as_str());
            }
        }
        cols
    }
}
