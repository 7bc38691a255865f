use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A file that has been modified through the API.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "tracked_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Normalized path relative to the files root, `/`-separated
    pub filename: String,

    pub last_modified: String,

    pub modified_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
