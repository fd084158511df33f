//! Phin: coffee-shop discovery and review platform backend
//!
//! The core of the service is the place discovery and ranking engine:
//! category-aware filtered listings, popularity ("hot score") tracking,
//! multi-criteria rating aggregation, and a restricted-word moderation
//! gate in front of every user-submitted write.

pub mod app_config;
pub mod categories;
pub mod db;
pub mod error;
pub mod middleware;
pub mod orm;
pub mod places;
pub mod ranking;
pub mod ratings;
pub mod text;
pub mod web;
pub mod word_filter;
