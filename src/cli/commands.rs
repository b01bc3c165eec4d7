//! Command execution
//!
//! Each subcommand maps onto the ingestion pipeline or the calibration
//! store. Output goes to stdout; diagnostics go through tracing.

use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use crate::calibration::{CalibrationDoc, CalibrationStore};
use crate::cli::{CalibrationCommands, Commands, ConfigCommands};
use crate::config::{Config, get_config};
use crate::errors::{NitondbError, Result};
use crate::services::matching::{MatchOutcome, match_labels};
use crate::services::validation::{ReadingRecord, convert_rows, validate_reading_sheet};
use crate::services::build_record_set;
use crate::storage::{SeaOrmStorage, StorageFactory};
use crate::utils::csv_handler::{
    MeasurementCsvRow, export_measurements_to_csv, generate_export_filename, read_reading_sheet,
};
use crate::utils::measurement_dict::MeasurementDict;

pub async fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Init => init().await,
        Commands::Standards { aliquot } => standards(aliquot).await,
        Commands::Register {
            aliquot,
            sample,
            material,
        } => register(aliquot, sample, material).await,
        Commands::Match { file, threshold } => match_export(&file, threshold).await,
        Commands::Check { file } => check_export(&file).await,
        Commands::Add {
            file,
            threshold,
            dry_run,
        } => add_export(&file, threshold, dry_run).await,
        Commands::Update {
            file,
            threshold,
            dry_run,
        } => update_export(&file, threshold, dry_run).await,
        Commands::Export { file_path } => export_measurements(file_path).await,
        Commands::Calibration { action } => calibration(action).await,
        Commands::Config { action } => config_command(action),
    }
}

/// Load the measurement dictionary, honoring a configured override.
fn load_dict() -> Result<MeasurementDict> {
    match &get_config().ingest.dictionary_path {
        Some(path) if !path.is_empty() => MeasurementDict::from_path(path),
        _ => MeasurementDict::embedded(),
    }
}

fn effective_threshold(threshold: Option<f64>) -> f64 {
    threshold.unwrap_or(get_config().matching.score_threshold)
}

/// Shared front half of every export command: read, validate, convert.
fn load_readings(file: &str, dict: &MeasurementDict) -> Result<Vec<ReadingRecord>> {
    let sheet = read_reading_sheet(file)?;
    validate_reading_sheet(&sheet, dict)?;

    let (readings, errors) = convert_rows(&sheet, dict);
    for e in &errors {
        println!(
            "{} row {}: {}",
            "warning:".yellow(),
            e.row_num,
            e.error.format_simple()
        );
    }
    if readings.is_empty() {
        return Err(NitondbError::validation(format!(
            "No valid readings in {}",
            file
        )));
    }
    Ok(readings)
}

fn distinct_labels(readings: &[ReadingRecord]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for r in readings {
        if !labels.contains(&r.sample_label) {
            labels.push(r.sample_label.clone());
        }
    }
    labels
}

async fn match_against_db(
    storage: &Arc<SeaOrmStorage>,
    readings: &[ReadingRecord],
    threshold: f64,
) -> Result<MatchOutcome> {
    let candidates = storage.aliquot_names().await?;
    Ok(match_labels(&distinct_labels(readings), &candidates, threshold))
}

async fn init() -> Result<()> {
    let storage = StorageFactory::create().await?;
    // migrations ran inside the factory; a quick count proves the schema
    let aliquots = storage.list_aliquots().await?;
    println!(
        "{} database ready ({} standard aliquots registered)",
        "ok:".green(),
        aliquots.len()
    );
    Ok(())
}

async fn standards(aliquot: Option<String>) -> Result<()> {
    let storage = StorageFactory::create().await?;

    if let Some(name) = aliquot {
        let analyses = storage.analyses_for_aliquot(&name).await?;
        if analyses.is_empty() {
            println!("No analyses recorded for {}.", name);
            return Ok(());
        }

        println!(
            "{:<12} {:<20} {:<20} {}",
            "ANALYSIS".bold(),
            "DATE".bold(),
            "INSTRUMENT".bold(),
            "TECHNIQUE".bold()
        );
        for a in &analyses {
            println!(
                "{:<12} {:<20} {:<20} {}",
                a.analysis,
                a.date.format("%Y-%m-%d %H:%M:%S"),
                a.instrument,
                a.technique
            );
        }
        println!("\n{} analyses for {}", analyses.len(), name);
        return Ok(());
    }

    let aliquots = storage.list_aliquots().await?;
    if aliquots.is_empty() {
        println!("No standard aliquots registered.");
        return Ok(());
    }

    println!("{:<24} {:<24} {:<12}", "ALIQUOT".bold(), "SAMPLE".bold(), "MATERIAL".bold());
    for a in &aliquots {
        println!("{:<24} {:<24} {:<12}", a.aliquot, a.sample, a.material);
    }
    println!("\n{} standard aliquots", aliquots.len());
    Ok(())
}

async fn register(aliquot: String, sample: Option<String>, material: Option<String>) -> Result<()> {
    let record = crate::storage::AliquotRecord {
        sample: sample.unwrap_or_else(|| aliquot.clone()),
        material: material.unwrap_or_else(|| get_config().ingest.material.clone()),
        aliquot,
    };

    let storage = StorageFactory::create().await?;
    storage.register_aliquot(&record).await?;
    println!("{} registered standard aliquot {}", "ok:".green(), record.aliquot);
    Ok(())
}

async fn match_export(file: &str, threshold: Option<f64>) -> Result<()> {
    let dict = load_dict()?;
    let readings = load_readings(file, &dict)?;
    let threshold = effective_threshold(threshold);

    let storage = StorageFactory::create().await?;
    let outcome = match_against_db(&storage, &readings, threshold).await?;

    if outcome.matched.is_empty() {
        return Err(NitondbError::no_matching_standards(format!(
            "No sample labels matched at threshold {}",
            threshold
        )));
    }

    println!("Aliquot matches (threshold {}):", threshold);
    for (label, aliquot) in &outcome.matched {
        println!("  {} -> {}", label, aliquot.green());
    }
    if !outcome.unmatched.is_empty() {
        println!("\nUnmatched labels:");
        for label in &outcome.unmatched {
            println!("  {}", label.red());
        }
    } else {
        println!("\n{}", "All sample labels matched successfully.".green());
    }
    Ok(())
}

async fn check_export(file: &str) -> Result<()> {
    let dict = load_dict()?;
    let readings = load_readings(file, &dict)?;

    let mut ids: Vec<String> = Vec::new();
    for r in &readings {
        if !ids.contains(&r.reading_no) {
            ids.push(r.reading_no.clone());
        }
    }

    let storage = StorageFactory::create().await?;
    let present = storage.existing_analyses(&ids).await?;

    if present.is_empty() {
        println!(
            "{}",
            "No analyses from this export are present in the database. All analyses can be added."
                .green()
        );
        return Ok(());
    }

    println!("Analyses present in database:");
    for id in &present {
        println!("  {}", id);
    }

    let absent: Vec<&String> = ids.iter().filter(|id| !present.contains(id)).collect();
    if absent.is_empty() {
        println!("\n{}", "All analyses are already present in the database.".yellow());
    } else {
        println!("\nAnalyses not present (can be added):");
        for id in absent {
            println!("  {}", id);
        }
    }
    Ok(())
}

async fn add_export(file: &str, threshold: Option<f64>, dry_run: bool) -> Result<()> {
    let config = get_config();
    let dict = load_dict()?;
    let readings = load_readings(file, &dict)?;
    let threshold = effective_threshold(threshold);

    let storage = StorageFactory::create().await?;
    let outcome = match_against_db(&storage, &readings, threshold).await?;
    let record_set = build_record_set(
        &readings,
        &outcome,
        &dict,
        &config.ingest.instrument,
        &config.ingest.material,
    )?;

    if record_set.is_empty() {
        println!(
            "{} export contributes no measurements (all values below LOD)",
            "warning:".yellow()
        );
    }

    if dry_run {
        println!(
            "dry run: would write {} aliquots, {} analyses, {} measurements",
            record_set.aliquots.len(),
            record_set.analyses.len(),
            record_set.measurements.len()
        );
        return Ok(());
    }

    let report = storage.measurements_add(&record_set).await?;
    println!(
        "{} {} analyses added ({} already present), {} measurements written",
        "ok:".green(),
        report.analyses_added,
        report.analyses_skipped,
        report.measurements_upserted
    );
    Ok(())
}

async fn update_export(file: &str, threshold: Option<f64>, dry_run: bool) -> Result<()> {
    let config = get_config();
    let dict = load_dict()?;
    let readings = load_readings(file, &dict)?;
    let threshold = effective_threshold(threshold);

    let storage = StorageFactory::create().await?;
    let outcome = match_against_db(&storage, &readings, threshold).await?;
    let record_set = build_record_set(
        &readings,
        &outcome,
        &dict,
        &config.ingest.instrument,
        &config.ingest.material,
    )?;

    if dry_run {
        println!(
            "dry run: would update up to {} measurements",
            record_set.measurements.len()
        );
        return Ok(());
    }

    let report = storage.measurements_update(&record_set).await?;
    println!(
        "{} {} measurements updated, {} not found in database",
        "ok:".green(),
        report.measurements_updated,
        report.measurements_missing
    );
    Ok(())
}

async fn export_measurements(file_path: Option<String>) -> Result<()> {
    let storage = StorageFactory::create().await?;
    let measurements = storage.list_measurements().await?;

    let rows: Vec<MeasurementCsvRow> = measurements
        .into_iter()
        .map(|m| MeasurementCsvRow {
            analysis: m.analysis,
            quantity: m.quantity,
            mean: m.mean,
            measurement_unit: m.measurement_unit,
            uncertainty: m.uncertainty,
            uncertainty_unit: m.uncertainty_unit,
            reference_material: m.reference_material,
        })
        .collect();

    let path = file_path.unwrap_or_else(generate_export_filename);
    export_measurements_to_csv(&rows, &path)?;
    println!("{} exported {} measurements to {}", "ok:".green(), rows.len(), path);
    Ok(())
}

async fn calibration(action: CalibrationCommands) -> Result<()> {
    let store = CalibrationStore::new(&get_config().calibration.directory);

    match action {
        CalibrationCommands::List => {
            let summaries = store.list()?;
            if summaries.is_empty() {
                println!("No calibration documents found.");
                return Ok(());
            }
            println!("{:<24} {:<24} {}", "NAME".bold(), "MODIFIED".bold(), "PATH".bold());
            for s in &summaries {
                let modified = s
                    .modified
                    .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<24} {:<24} {}", s.name, modified, s.path.display());
            }
            Ok(())
        }
        CalibrationCommands::Show { name } => {
            let doc = store.load(store.resolve(&name))?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
        CalibrationCommands::Validate { name } => {
            let doc = store.load(store.resolve(&name))?;
            let storage = StorageFactory::create().await?;
            store.validate_against_db(&doc, &storage).await?;
            println!(
                "{} calibration '{}' is valid ({} standards, {} analyses)",
                "ok:".green(),
                doc.name,
                doc.standards.len(),
                doc.analyses.len()
            );
            Ok(())
        }
        CalibrationCommands::Init { name, force } => {
            let path = store.path_for(&name);
            if path.exists() && !force {
                return Err(NitondbError::file_operation(format!(
                    "Calibration {} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            let doc = CalibrationDoc::template(&name, &get_config().ingest.instrument);
            let saved = store.save(&doc)?;
            println!("{} created {}", "ok:".green(), saved.display());
            Ok(())
        }
    }
}

fn config_command(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Generate { output_path, force } => {
            let path = output_path.unwrap_or_else(|| "nitondb.example.toml".to_string());
            if Path::new(&path).exists() && !force {
                return Err(NitondbError::file_operation(format!(
                    "{} already exists (use --force to overwrite)",
                    path
                )));
            }
            std::fs::write(&path, Config::generate_sample_config())?;
            println!("{} wrote {}", "ok:".green(), path);
            Ok(())
        }
    }
}
