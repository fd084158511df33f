//! SeaORM Entity for ratings table
//!
//! One user's scored review of a place. Every criterion is optional; an
//! absent criterion is excluded from aggregation, never treated as zero.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "ratings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub place_id: i32,
    pub user_id: i32,
    pub drink_quality: Option<i16>,
    pub location: Option<i16>,
    pub price: Option<i16>,
    pub service: Option<i16>,
    pub staff_attitude: Option<i16>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    /// All criterion values present on this rating, in declaration order
    pub fn present_scores(&self) -> impl Iterator<Item = i16> + '_ {
        [
            self.drink_quality,
            self.location,
            self.price,
            self.service,
            self.staff_attitude,
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::places::Entity",
        from = "Column::PlaceId",
        to = "super::places::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Place,
}

impl Related<super::places::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Place.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
