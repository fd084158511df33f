//! SeaORM Entity for categories table
//!
//! `place_count` is deliberately not a column: it is a live projection over
//! approved places, computed by `crate::categories` at query time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of tag this category is
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum CategoryKind {
    #[sea_orm(string_value = "service")]
    #[default]
    Service,
    #[sea_orm(string_value = "style")]
    Style,
    #[sea_orm(string_value = "purpose")]
    Purpose,
    #[sea_orm(string_value = "region")]
    Region,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub kind: CategoryKind,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::place_categories::Entity")]
    PlaceCategories,
}

impl Related<super::place_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlaceCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
