//! End-to-end ingestion pipeline tests
//!
//! Drive the whole path an export takes: CSV file → sheet validation → row
//! conversion → label matching → record set → database, using a file-backed
//! SQLite database in a temp directory.

use std::io::Write;

use tempfile::TempDir;

use nitondb::services::{build_record_set, convert_rows, match_labels, validate_reading_sheet};
use nitondb::storage::{AliquotRecord, SeaOrmStorage};
use nitondb::utils::csv_handler::read_reading_sheet;
use nitondb::utils::measurement_dict::MeasurementDict;

const INSTRUMENT: &str = "Niton XL5 Plus";

async fn test_storage(dir: &TempDir) -> SeaOrmStorage {
    let db_path = dir.path().join("standards.db");
    SeaOrmStorage::new(db_path.to_str().unwrap()).await.unwrap()
}

async fn register(storage: &SeaOrmStorage, name: &str) {
    storage
        .register_aliquot(&AliquotRecord {
            aliquot: name.to_string(),
            sample: name.to_string(),
            material: "powder".to_string(),
        })
        .await
        .unwrap();
}

fn write_export(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "Reading No,Reading Type,Time,Sample Depth,Fe Concentration,Fe Error,Cu Concentration,Cu Error"
    )
    .unwrap();
    write!(file, "{}", body).unwrap();
    path
}

#[tokio::test]
async fn test_export_add_roundtrip() {
    let dir = TempDir::new().unwrap();
    let storage = test_storage(&dir).await;
    register(&storage, "BHVO-2").await;
    register(&storage, "AGV-2").await;

    let path = write_export(
        &dir,
        "run1.csv",
        "101,ucsb mining,2025-03-01 10:15:00,bhvo-2,85000,450,130,9\n\
         102,ucsb mining,2025-03-01 10:20:00,bhvo-2,84800,460,<LOD,\n\
         103,ucsb mining,2025-03-01 10:25:00,agv-2,47000,300,52,6\n",
    );

    let dict = MeasurementDict::embedded().unwrap();
    let sheet = read_reading_sheet(&path).unwrap();
    validate_reading_sheet(&sheet, &dict).unwrap();

    let (readings, errors) = convert_rows(&sheet, &dict);
    assert!(errors.is_empty());
    assert_eq!(readings.len(), 3);
    // <LOD drops the Cu value for reading 102
    assert!(!readings[1].values.contains_key("Cu"));

    let labels: Vec<String> = vec!["bhvo-2".to_string(), "agv-2".to_string()];
    let candidates = storage.aliquot_names().await.unwrap();
    let outcome = match_labels(&labels, &candidates, 95.0);
    assert!(outcome.all_matched());

    let record_set = build_record_set(&readings, &outcome, &dict, INSTRUMENT, "powder").unwrap();
    assert_eq!(record_set.analyses.len(), 3);
    assert_eq!(record_set.measurements.len(), 5);

    let report = storage.measurements_add(&record_set).await.unwrap();
    assert_eq!(report.analyses_added, 3);
    assert_eq!(report.measurements_upserted, 5);

    let analyses = storage.analyses_for_aliquot("BHVO-2").await.unwrap();
    assert_eq!(analyses.len(), 2);
    assert_eq!(analyses[0].instrument, INSTRUMENT);
    assert_eq!(analyses[0].technique, "ucsb mining");

    let measurements = storage.list_measurements().await.unwrap();
    let fe_101 = measurements
        .iter()
        .find(|m| m.analysis == "101" && m.quantity == "Fe")
        .unwrap();
    assert_eq!(fe_101.mean, 85000.0);
    assert_eq!(fe_101.uncertainty, Some(450.0));
    assert_eq!(fe_101.measurement_unit, "ppm");
}

#[tokio::test]
async fn test_unmatched_labels_are_dropped_not_fatal() {
    let dir = TempDir::new().unwrap();
    let storage = test_storage(&dir).await;
    register(&storage, "BHVO-2").await;

    let path = write_export(
        &dir,
        "run2.csv",
        "201,ucsb mining,2025-03-02 09:00:00,bhvo-2,85100,440,128,8\n\
         202,ucsb mining,2025-03-02 09:05:00,unknown sample,1000,10,5,1\n",
    );

    let dict = MeasurementDict::embedded().unwrap();
    let sheet = read_reading_sheet(&path).unwrap();
    let (readings, _) = convert_rows(&sheet, &dict);

    let labels: Vec<String> = readings.iter().map(|r| r.sample_label.clone()).collect();
    let candidates = storage.aliquot_names().await.unwrap();
    let outcome = match_labels(&labels, &candidates, 95.0);
    assert_eq!(outcome.unmatched, vec!["unknown sample".to_string()]);

    let record_set = build_record_set(&readings, &outcome, &dict, INSTRUMENT, "powder").unwrap();
    assert_eq!(record_set.analyses.len(), 1);

    storage.measurements_add(&record_set).await.unwrap();
    assert!(storage
        .existing_analyses(&["202".to_string()])
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_bad_rows_reported_with_row_numbers() {
    let dir = TempDir::new().unwrap();

    let path = write_export(
        &dir,
        "run3.csv",
        "301,ucsb mining,2025-03-03 11:00:00,bhvo-2,85000,450,130,9\n\
         302,ucsb mining,not a time,bhvo-2,84900,455,129,9\n\
         ,ucsb mining,2025-03-03 11:10:00,bhvo-2,84800,460,128,9\n",
    );

    let dict = MeasurementDict::embedded().unwrap();
    let sheet = read_reading_sheet(&path).unwrap();
    let (readings, errors) = convert_rows(&sheet, &dict);

    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].reading_no, "301");

    let mut rows: Vec<usize> = errors.iter().map(|e| e.row_num).collect();
    rows.sort_unstable();
    assert_eq!(rows, vec![3, 4]);
}

#[tokio::test]
async fn test_update_pipeline() {
    let dir = TempDir::new().unwrap();
    let storage = test_storage(&dir).await;
    register(&storage, "BHVO-2").await;

    let dict = MeasurementDict::embedded().unwrap();
    let candidates = storage.aliquot_names().await.unwrap();

    let first = write_export(
        &dir,
        "first.csv",
        "401,ucsb mining,2025-03-04 08:00:00,bhvo-2,85000,450,130,9\n",
    );
    let sheet = read_reading_sheet(&first).unwrap();
    let (readings, _) = convert_rows(&sheet, &dict);
    let outcome = match_labels(&["bhvo-2".to_string()], &candidates, 95.0);
    let rs = build_record_set(&readings, &outcome, &dict, INSTRUMENT, "powder").unwrap();
    storage.measurements_add(&rs).await.unwrap();

    // re-export of the same reading with corrected values
    let second = write_export(
        &dir,
        "second.csv",
        "401,ucsb mining,2025-03-04 08:00:00,bhvo-2,85750,430,131,8\n",
    );
    let sheet = read_reading_sheet(&second).unwrap();
    let (readings, _) = convert_rows(&sheet, &dict);
    let rs = build_record_set(&readings, &outcome, &dict, INSTRUMENT, "powder").unwrap();

    let report = storage.measurements_update(&rs).await.unwrap();
    assert_eq!(report.measurements_updated, 2);
    assert_eq!(report.measurements_missing, 0);

    let fe = storage
        .list_measurements()
        .await
        .unwrap()
        .into_iter()
        .find(|m| m.analysis == "401" && m.quantity == "Fe")
        .unwrap();
    assert_eq!(fe.mean, 85750.0);
    assert_eq!(fe.uncertainty, Some(430.0));
}

#[tokio::test]
async fn test_missing_required_column_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(
        &path,
        "Reading No,Time,Sample Depth,Fe Concentration,Fe Error\n\
         501,2025-03-05 10:00:00,bhvo-2,85000,450\n",
    )
    .unwrap();

    let dict = MeasurementDict::embedded().unwrap();
    let sheet = read_reading_sheet(&path).unwrap();
    let err = validate_reading_sheet(&sheet, &dict).unwrap_err();
    assert_eq!(err.code(), "E005");
    assert!(err.message().contains("Reading Type"));
}
