//! Mutation operations for SeaOrmStorage
//!
//! Transactional add/update of one export's record set.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use std::collections::BTreeSet;
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{
    aliquot_to_active_model, analysis_to_active_model, measurement_to_active_model,
};
use crate::errors::{NitondbError, Result};
use crate::storage::models::RecordSet;

use migration::entities::{aliquot, analysis, measurement};

/// Outcome of `measurements_add`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    pub aliquots_upserted: usize,
    pub analyses_added: usize,
    /// Analyses already present; their rows were left untouched and their
    /// measurements upserted.
    pub analyses_skipped: usize,
    pub measurements_upserted: usize,
}

/// Outcome of `measurements_update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub measurements_updated: usize,
    /// (analysis, quantity) pairs that matched nothing in the database.
    pub measurements_missing: usize,
}

impl SeaOrmStorage {
    /// Add one export's records: upsert aliquots, insert new analyses, and
    /// upsert measurements on (analysis, quantity). Runs in one transaction.
    pub async fn measurements_add(&self, record_set: &RecordSet) -> Result<AddReport> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NitondbError::database_operation(format!("开始事务失败: {}", e)))?;

        let mut report = AddReport::default();

        if !record_set.aliquots.is_empty() {
            let active_models: Vec<aliquot::ActiveModel> = record_set
                .aliquots
                .iter()
                .map(aliquot_to_active_model)
                .collect();

            aliquot::Entity::insert_many(active_models)
                .on_conflict(
                    OnConflict::column(aliquot::Column::Aliquot)
                        .update_columns([aliquot::Column::Sample, aliquot::Column::Material])
                        .to_owned(),
                )
                .exec(&txn)
                .await
                .map_err(|e| {
                    NitondbError::database_operation(format!("写入标准样品失败: {}", e))
                })?;
            report.aliquots_upserted = record_set.aliquots.len();
        }

        // 已存在的分析保留原记录，只补测量
        let ids: Vec<String> = record_set
            .analyses
            .iter()
            .map(|a| a.analysis.clone())
            .collect();
        let existing: Vec<String> = analysis::Entity::find()
            .filter(analysis::Column::Analysis.is_in(ids.iter().cloned()))
            .all(&txn)
            .await
            .map_err(|e| NitondbError::database_operation(format!("查询分析失败: {}", e)))?
            .into_iter()
            .map(|m| m.analysis)
            .collect();

        // 批内重复的分析只插入一次，避免主键冲突中断事务
        let mut batch_seen: BTreeSet<&str> = BTreeSet::new();
        let new_analyses: Vec<analysis::ActiveModel> = record_set
            .analyses
            .iter()
            .filter(|a| !existing.contains(&a.analysis) && batch_seen.insert(&a.analysis))
            .map(analysis_to_active_model)
            .collect();
        report.analyses_skipped = record_set.analyses.len() - new_analyses.len();
        report.analyses_added = new_analyses.len();

        if !new_analyses.is_empty() {
            analysis::Entity::insert_many(new_analyses)
                .exec(&txn)
                .await
                .map_err(|e| NitondbError::database_operation(format!("写入分析失败: {}", e)))?;
        }

        if !record_set.measurements.is_empty() {
            let active_models: Vec<measurement::ActiveModel> = record_set
                .measurements
                .iter()
                .map(measurement_to_active_model)
                .collect();

            measurement::Entity::insert_many(active_models)
                .on_conflict(
                    OnConflict::columns([
                        measurement::Column::Analysis,
                        measurement::Column::Quantity,
                    ])
                    .update_columns([
                        measurement::Column::Mean,
                        measurement::Column::MeasurementUnit,
                        measurement::Column::Uncertainty,
                        measurement::Column::UncertaintyUnit,
                        measurement::Column::ReferenceMaterial,
                    ])
                    .to_owned(),
                )
                .exec(&txn)
                .await
                .map_err(|e| NitondbError::database_operation(format!("写入测量失败: {}", e)))?;
            report.measurements_upserted = record_set.measurements.len();
        }

        txn.commit()
            .await
            .map_err(|e| NitondbError::database_operation(format!("提交事务失败: {}", e)))?;

        info!(
            "Added measurements: {} analyses new, {} skipped, {} measurements",
            report.analyses_added, report.analyses_skipped, report.measurements_upserted
        );
        Ok(report)
    }

    /// Register (or refresh) a single standard aliquot. Ingestion never
    /// creates standards on its own; this is the explicit path.
    pub async fn register_aliquot(&self, record: &crate::storage::models::AliquotRecord) -> Result<()> {
        aliquot::Entity::insert(aliquot_to_active_model(record))
            .on_conflict(
                OnConflict::column(aliquot::Column::Aliquot)
                    .update_columns([aliquot::Column::Sample, aliquot::Column::Material])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| NitondbError::database_operation(format!("写入标准样品失败: {}", e)))?;

        info!("Registered standard aliquot: {}", record.aliquot);
        Ok(())
    }

    /// Update mean/uncertainty of measurements that already exist. Pairs not
    /// in the database are counted, not created.
    pub async fn measurements_update(&self, record_set: &RecordSet) -> Result<UpdateReport> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NitondbError::database_operation(format!("开始事务失败: {}", e)))?;

        let mut report = UpdateReport::default();

        for m in &record_set.measurements {
            let result = measurement::Entity::update_many()
                .col_expr(measurement::Column::Mean, Expr::value(m.mean))
                .col_expr(measurement::Column::Uncertainty, Expr::value(m.uncertainty))
                .filter(measurement::Column::Analysis.eq(&m.analysis))
                .filter(measurement::Column::Quantity.eq(&m.quantity))
                .exec(&txn)
                .await
                .map_err(|e| NitondbError::database_operation(format!("更新测量失败: {}", e)))?;

            if result.rows_affected == 0 {
                report.measurements_missing += 1;
            } else {
                report.measurements_updated += result.rows_affected as usize;
            }
        }

        txn.commit()
            .await
            .map_err(|e| NitondbError::database_operation(format!("提交事务失败: {}", e)))?;

        info!(
            "Updated measurements: {} updated, {} missing",
            report.measurements_updated, report.measurements_missing
        );
        Ok(report)
    }
}
