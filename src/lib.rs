//! nitondb - standards database and calibration manager for Niton XRF exports
//!
//! This library ingests Niton XL5 Plus measurement exports into a SQLite
//! standards database and manages calibration JSON documents.
//!
//! # Architecture
//! - `utils`: export CSV reading and the measurement dictionary
//! - `services`: validation, fuzzy standard matching, record-set assembly
//! - `storage`: SeaORM-backed standards database (aliquots, analyses,
//!   measurements)
//! - `calibration`: calibration document model and file store
//! - `cli`: command-line surface
//! - `config` / `system`: configuration and logging plumbing

pub mod calibration;
pub mod cli;
pub mod config;
pub mod errors;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
