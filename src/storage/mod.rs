use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{AddReport, SeaOrmStorage, UpdateReport};
pub use models::{AliquotRecord, AnalysisRecord, MeasurementRecord, RecordSet};

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let database_url = &config.storage.database_url;

        let storage = backend::SeaOrmStorage::new(database_url).await?;
        Ok(Arc::new(storage))
    }
}
