//! Query operations for SeaOrmStorage
//!
//! Read-only access used by the match/check/standards/export commands.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::SeaOrmStorage;
use super::converters::{model_to_aliquot, model_to_analysis, model_to_measurement};
use crate::errors::{NitondbError, Result};
use crate::storage::models::{AliquotRecord, AnalysisRecord, MeasurementRecord};

use migration::entities::{aliquot, analysis, measurement};

impl SeaOrmStorage {
    /// 所有已注册的标准样品，按名称排序
    pub async fn list_aliquots(&self) -> Result<Vec<AliquotRecord>> {
        let models = aliquot::Entity::find()
            .order_by_asc(aliquot::Column::Aliquot)
            .all(&self.db)
            .await
            .map_err(|e| NitondbError::database_operation(format!("查询标准样品失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_aliquot).collect())
    }

    /// Canonical aliquot names, used as fuzzy-match candidates.
    pub async fn aliquot_names(&self) -> Result<Vec<String>> {
        Ok(self
            .list_aliquots()
            .await?
            .into_iter()
            .map(|a| a.aliquot)
            .collect())
    }

    /// Which of `names` are not registered as aliquots.
    pub async fn missing_aliquots(&self, names: &[String]) -> Result<Vec<String>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let existing: Vec<String> = aliquot::Entity::find()
            .filter(aliquot::Column::Aliquot.is_in(names.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(|e| NitondbError::database_operation(format!("查询标准样品失败: {}", e)))?
            .into_iter()
            .map(|m| m.aliquot)
            .collect();

        Ok(names
            .iter()
            .filter(|n| !existing.contains(n))
            .cloned()
            .collect())
    }

    /// Which of the given reading numbers already exist as analyses.
    /// Exact match only (score 100 in the matching model).
    pub async fn existing_analyses(&self, ids: &[String]) -> Result<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = analysis::Entity::find()
            .filter(analysis::Column::Analysis.is_in(ids.iter().cloned()))
            .order_by_asc(analysis::Column::Analysis)
            .all(&self.db)
            .await
            .map_err(|e| NitondbError::database_operation(format!("查询分析失败: {}", e)))?;

        Ok(models.into_iter().map(|m| m.analysis).collect())
    }

    /// All analyses for one aliquot, ordered by date.
    pub async fn analyses_for_aliquot(&self, aliquot_name: &str) -> Result<Vec<AnalysisRecord>> {
        let models = analysis::Entity::find()
            .filter(analysis::Column::Aliquot.eq(aliquot_name))
            .order_by_asc(analysis::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| NitondbError::database_operation(format!("查询分析失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_analysis).collect())
    }

    /// Full measurement dump for CSV export, ordered (analysis, quantity).
    pub async fn list_measurements(&self) -> Result<Vec<MeasurementRecord>> {
        let models = measurement::Entity::find()
            .order_by_asc(measurement::Column::Analysis)
            .order_by_asc(measurement::Column::Quantity)
            .all(&self.db)
            .await
            .map_err(|e| NitondbError::database_operation(format!("查询测量失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_measurement).collect())
    }
}
