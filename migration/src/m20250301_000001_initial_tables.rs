use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Aliquot::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Aliquot::Aliquot)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Aliquot::Sample).string().not_null())
                    .col(
                        ColumnDef::new(Aliquot::Material)
                            .string()
                            .not_null()
                            .default("powder"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Analysis::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Analysis::Analysis)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Analysis::Aliquot).string().not_null())
                    .col(ColumnDef::new(Analysis::Sample).string().not_null())
                    .col(
                        ColumnDef::new(Analysis::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Analysis::Instrument).string().not_null())
                    .col(ColumnDef::new(Analysis::Technique).string().not_null())
                    .to_owned(),
            )
            .await?;

        // 按标准样品列出分析时需要 (aliquot, date) 排序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analyses_aliquot_date")
                    .table(Analysis::Table)
                    .col(Analysis::Aliquot)
                    .col(Analysis::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Measurement::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Measurement::Analysis).string().not_null())
                    .col(ColumnDef::new(Measurement::Quantity).string().not_null())
                    .col(ColumnDef::new(Measurement::Mean).double().not_null())
                    .col(
                        ColumnDef::new(Measurement::MeasurementUnit)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Measurement::Uncertainty).double().null())
                    .col(
                        ColumnDef::new(Measurement::UncertaintyUnit)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Measurement::ReferenceMaterial)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .primary_key(
                        Index::create()
                            .col(Measurement::Analysis)
                            .col(Measurement::Quantity),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_measurements_quantity")
                    .table(Measurement::Table)
                    .col(Measurement::Quantity)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_measurements_quantity").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_analyses_aliquot_date").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Measurement::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Analysis::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Aliquot::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Aliquot {
    #[sea_orm(iden = "aliquots")]
    Table,
    Aliquot,
    Sample,
    Material,
}

#[derive(DeriveIden)]
enum Analysis {
    #[sea_orm(iden = "analyses")]
    Table,
    Analysis,
    Aliquot,
    Sample,
    Date,
    Instrument,
    Technique,
}

#[derive(DeriveIden)]
enum Measurement {
    #[sea_orm(iden = "measurements")]
    Table,
    Analysis,
    Quantity,
    Mean,
    MeasurementUnit,
    Uncertainty,
    UncertaintyUnit,
    ReferenceMaterial,
}
