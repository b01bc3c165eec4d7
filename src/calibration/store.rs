//! Calibration file store
//!
//! Loads and saves calibration JSON documents in the configured directory.
//! Saves are atomic (temp file + rename) so a crash never leaves a
//! half-written calibration on disk.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::calibration::model::CalibrationDoc;
use crate::errors::{NitondbError, Result};
use crate::storage::SeaOrmStorage;

/// One entry from `CalibrationStore::list`.
#[derive(Debug, Clone)]
pub struct CalibrationSummary {
    pub name: String,
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
}

pub struct CalibrationStore {
    dir: PathBuf,
}

impl CalibrationStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path for a named calibration inside the store directory.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Resolve an argument that may be a file path or a bare calibration name.
    pub fn resolve(&self, name_or_path: &str) -> PathBuf {
        let as_path = Path::new(name_or_path);
        if as_path.exists() || name_or_path.ends_with(".json") {
            as_path.to_path_buf()
        } else {
            self.path_for(name_or_path)
        }
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<CalibrationDoc> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            NitondbError::file_operation(format!(
                "Failed to read calibration {}: {}",
                path.display(),
                e
            ))
        })?;
        let doc: CalibrationDoc = serde_json::from_str(&content).map_err(|e| {
            NitondbError::calibration_invalid(format!(
                "Failed to parse calibration {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(doc)
    }

    /// Save atomically: write to a temp file in the same directory, then
    /// rename over the target.
    pub fn save(&self, doc: &CalibrationDoc) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            NitondbError::file_operation(format!(
                "Failed to create calibrations directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let path = self.path_for(&doc.name);
        let tmp_path = self.dir.join(format!(".{}.json.tmp", doc.name));
        let content = serde_json::to_string_pretty(doc)?;

        fs::write(&tmp_path, content).map_err(|e| {
            NitondbError::file_operation(format!("Failed to write calibration: {}", e))
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            NitondbError::file_operation(format!("Failed to finalize calibration: {}", e))
        })?;

        info!("Saved calibration: {}", path.display());
        Ok(path)
    }

    /// Enumerate calibration JSON files in the store directory, sorted by
    /// name. A missing directory is an empty store.
    pub fn list(&self) -> Result<Vec<CalibrationSummary>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(NitondbError::file_operation(format!(
                    "Failed to read calibrations directory {}: {}",
                    self.dir.display(),
                    e
                )));
            }
        };

        let mut summaries = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if !is_json || hidden {
                continue;
            }

            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Utc>::from);

            summaries.push(CalibrationSummary {
                name,
                path,
                modified,
            });
        }

        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    /// Full validation: structural checks plus every listed standard must be
    /// registered in the database.
    pub async fn validate_against_db(
        &self,
        doc: &CalibrationDoc,
        storage: &SeaOrmStorage,
    ) -> Result<()> {
        doc.validate()?;

        let missing = storage.missing_aliquots(&doc.standards).await?;
        if !missing.is_empty() {
            return Err(NitondbError::calibration_invalid(format!(
                "Standards not registered in database: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc(name: &str) -> CalibrationDoc {
        let mut doc = CalibrationDoc::template(name, "Niton XL5 Plus");
        doc.standards = vec!["BHVO-2".to_string()];
        doc
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = CalibrationStore::new(dir.path());

        let saved_path = store.save(&doc("majors-2025")).unwrap();
        assert!(saved_path.ends_with("majors-2025.json"));

        let loaded = store.load(&saved_path).unwrap();
        assert_eq!(loaded.name, "majors-2025");
        assert_eq!(loaded.standards, vec!["BHVO-2".to_string()]);
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = TempDir::new().unwrap();
        let store = CalibrationStore::new(dir.path().join("nested/calibrations"));
        store.save(&doc("x")).unwrap();
        assert!(store.path_for("x").exists());
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let store = CalibrationStore::new(dir.path());
        store.save(&doc("zeta")).unwrap();
        store.save(&doc("alpha")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a calibration").unwrap();

        let listed = store.list().unwrap();
        let names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(listed[0].modified.is_some());
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let store = CalibrationStore::new("/nonexistent/calibrations-dir");
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = CalibrationStore::new(dir.path());
        let err = store.load(&path).unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[test]
    fn test_resolve_name_vs_path() {
        let dir = TempDir::new().unwrap();
        let store = CalibrationStore::new(dir.path());
        assert_eq!(store.resolve("majors"), store.path_for("majors"));
        assert_eq!(
            store.resolve("somewhere/else.json"),
            PathBuf::from("somewhere/else.json")
        );
    }
}
