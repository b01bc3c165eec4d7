//! System-level modules
//!
//! Startup plumbing that is not part of the ingestion or calibration logic:
//! logging initialization lives here.

pub mod logging;

pub use logging::init_logging;
