//! SeaORM Entity for places table
//!
//! A place is a venue listing. The rating summary (`average_rating`,
//! `total_ratings`) and ranking fields (`hot_score`, `weekly_hot_score`)
//! are denormalized caches; the ratings table and the view counters are
//! the source of truth. Only `crate::ratings` and `crate::ranking` may
//! write them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a place listing
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum PlaceStatus {
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Moderation lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ApprovalStatus {
    /// Returns true if the place may appear in public listings
    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "places")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub address: Option<String>,
    pub status: PlaceStatus,
    pub approval_status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<i32>,
    pub average_rating: f64,
    pub total_ratings: i32,
    pub view_count: i32,
    pub hot_score: f64,
    pub weekly_views: i32,
    pub weekly_hot_score: f64,
    pub created_by: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::place_categories::Entity")]
    PlaceCategories,
    #[sea_orm(has_many = "super::ratings::Entity")]
    Ratings,
}

impl Related<super::place_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlaceCategories.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
