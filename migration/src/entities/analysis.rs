use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "analyses")]
pub struct Model {
    /// Reading number rendered as a string (GeochemDB analysis id).
    #[sea_orm(primary_key, auto_increment = false)]
    pub analysis: String,
    pub aliquot: String,
    pub sample: String,
    pub date: DateTimeUtc,
    pub instrument: String,
    pub technique: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
