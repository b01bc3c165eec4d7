use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "measurements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub analysis: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub quantity: String,
    pub mean: f64,
    pub measurement_unit: String,
    pub uncertainty: Option<f64>,
    pub uncertainty_unit: String,
    pub reference_material: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
