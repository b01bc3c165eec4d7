pub mod aliquot;
pub mod analysis;
pub mod measurement;
