//! SeaORM entity modules

pub mod categories;
pub mod place_categories;
pub mod places;
pub mod ratings;
pub mod restricted_words;
