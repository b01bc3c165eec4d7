//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for nitondb using clap's derive
//! macros, plus the top-level runner that maps command failures to a
//! colored error line and exit code 1.

pub mod commands;

use clap::{Parser, Subcommand};
use std::process;

/// nitondb - standards database and calibration manager for Niton XRF exports
#[derive(Parser)]
#[command(name = "nitondb")]
#[command(version)]
#[command(about = "Standards database and calibration file manager for Niton XL5 Plus exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create the standards database (runs pending migrations)
    Init,

    /// List standard aliquots, or the analyses recorded for one aliquot
    Standards {
        /// Show the analyses recorded for this aliquot
        aliquot: Option<String>,
    },

    /// Register a standard aliquot in the database
    Register {
        /// Aliquot name (canonical standard name, e.g. BHVO-2)
        aliquot: String,

        /// Sample name (defaults to the aliquot name)
        #[arg(long)]
        sample: Option<String>,

        /// Material (defaults to configured material, normally "powder")
        #[arg(long)]
        material: Option<String>,
    },

    /// Match an export's sample labels against registered standards
    Match {
        /// Path to an exported sheet (CSV)
        file: String,

        /// Similarity score threshold (0-100)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Check which analyses from an export already exist in the database
    Check {
        /// Path to an exported sheet (CSV)
        file: String,
    },

    /// Add an export's measurements to the database
    Add {
        /// Path to an exported sheet (CSV)
        file: String,

        /// Similarity score threshold (0-100)
        #[arg(long)]
        threshold: Option<f64>,

        /// Build and report the record set without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Update measurements that already exist in the database
    Update {
        /// Path to an exported sheet (CSV)
        file: String,

        /// Similarity score threshold (0-100)
        #[arg(long)]
        threshold: Option<f64>,

        /// Build and report the record set without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Export all measurements to a CSV file
    Export {
        /// Output file path (default: timestamped name)
        file_path: Option<String>,
    },

    /// Manage calibration JSON documents
    Calibration {
        #[command(subcommand)]
        action: CalibrationCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Calibration document commands
#[derive(Subcommand)]
pub enum CalibrationCommands {
    /// List calibration documents in the configured directory
    List,

    /// Print a calibration document
    Show {
        /// Calibration name or JSON file path
        name: String,
    },

    /// Validate a calibration document (structure + standards in database)
    Validate {
        /// Calibration name or JSON file path
        name: String,
    },

    /// Create a blank calibration document
    Init {
        /// Calibration name
        name: String,

        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: nitondb.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

pub async fn run_cli() {
    let cli = Cli::parse();
    if let Err(e) = commands::execute(cli.command).await {
        eprintln!("{}", e.format_colored());
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from(["nitondb", "add", "run.csv", "--threshold", "90"]).unwrap();
        match cli.command {
            Commands::Add {
                file,
                threshold,
                dry_run,
            } => {
                assert_eq!(file, "run.csv");
                assert_eq!(threshold, Some(90.0));
                assert!(!dry_run);
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_cli_parses_calibration_init() {
        let cli =
            Cli::try_parse_from(["nitondb", "calibration", "init", "majors", "--force"]).unwrap();
        match cli.command {
            Commands::Calibration {
                action: CalibrationCommands::Init { name, force },
            } => {
                assert_eq!(name, "majors");
                assert!(force);
            }
            _ => panic!("expected calibration init"),
        }
    }

    #[test]
    fn test_cli_parses_standards_detail() {
        let cli = Cli::try_parse_from(["nitondb", "standards", "BHVO-2"]).unwrap();
        match cli.command {
            Commands::Standards { aliquot } => assert_eq!(aliquot.as_deref(), Some("BHVO-2")),
            _ => panic!("expected standards command"),
        }

        let cli = Cli::try_parse_from(["nitondb", "standards"]).unwrap();
        match cli.command {
            Commands::Standards { aliquot } => assert!(aliquot.is_none()),
            _ => panic!("expected standards command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["nitondb"]).is_err());
    }
}
