//! Ingestion services
//!
//! The pipeline from a raw export sheet to database records:
//! - `validation`: required-column checks and raw row → typed reading records
//! - `matching`: fuzzy matching of sample labels against registered aliquots
//! - `ingest`: assembling the final record set for add/update operations

pub mod ingest;
pub mod matching;
pub mod validation;

pub use ingest::build_record_set;
pub use matching::{MatchOutcome, match_labels, similarity_score};
pub use validation::{ReadingRecord, RowError, convert_rows, validate_reading_sheet};
