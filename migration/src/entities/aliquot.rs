use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "aliquots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub aliquot: String,
    pub sample: String,
    pub material: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
