//! SeaORM Entity for restricted_words table
//!
//! The moderation dictionary. `normalized` is derived from `word` at write
//! time and is the sole key consulted during scanning. Severity classes:
//!
//! - `ban`: reject the submission entirely
//! - `warn`: allow, but rewrite the word before storage
//! - `hide`: allow, but rewrite the word before storage

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Severity class of a restricted word
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Severity {
    #[sea_orm(string_value = "ban")]
    Ban,
    #[sea_orm(string_value = "warn")]
    #[default]
    Warn,
    #[sea_orm(string_value = "hide")]
    Hide,
}

impl Severity {
    /// A `ban` match is fatal to the write; the other classes only rewrite
    pub fn is_fatal(&self) -> bool {
        matches!(self, Severity::Ban)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "restricted_words")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique by literal form, not normalized form
    #[sea_orm(unique)]
    pub word: String,
    pub normalized: String,
    pub severity: Severity,
    pub replacement: String,
    pub created_by: Option<i32>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
