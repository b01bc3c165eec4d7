pub mod csv_handler;
pub mod measurement_dict;

pub use csv_handler::{ReadingSheet, read_reading_sheet};
pub use measurement_dict::MeasurementDict;
