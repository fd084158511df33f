//! View tracking and popularity ("hot score") ranking
//!
//! Every place carries an all-time and a weekly hot score, derived from its
//! view counters and current rating summary. This module is the only writer
//! of `view_count`/`weekly_views`/`hot_score`/`weekly_hot_score`. Counter
//! increments happen at the store level in a single UPDATE so concurrent
//! views against the same place do not read-then-write stale counts.

use crate::db::get_db_pool;
use crate::error::ServiceError;
use crate::orm::places;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait};

/// Popularity score for a place.
///
/// `log10(views + 1) * 10` gives diminishing returns per additional view so
/// raw traffic cannot dominate indefinitely; the rating term is damped by a
/// ratings-volume confidence factor (`min(total_ratings / 10, 1)`) so a
/// single five-star rating cannot move the score as much as an established
/// average. Rounded to two decimals.
pub fn hot_score(views: i32, average_rating: f64, total_ratings: i32) -> f64 {
    let view_term = (f64::from(views) + 1.0).log10() * 10.0;
    let confidence = (f64::from(total_ratings) / 10.0).min(1.0);
    let rating_term = average_rating * confidence * 20.0;
    ((view_term + rating_term) * 100.0).round() / 100.0
}

/// Record one view of a place: bump both counters atomically, then refresh
/// the two hot-score variants from the fresh counters and the place's
/// current rating summary.
pub async fn record_view<C: ConnectionTrait>(db: &C, place_id: i32) -> Result<(), ServiceError> {
    let result = places::Entity::update_many()
        .col_expr(
            places::Column::ViewCount,
            Expr::col(places::Column::ViewCount).add(1),
        )
        .col_expr(
            places::Column::WeeklyViews,
            Expr::col(places::Column::WeeklyViews).add(1),
        )
        .filter(places::Column::Id.eq(place_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "Place {} not found",
            place_id
        )));
    }

    let place = places::Entity::find_by_id(place_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Place {} not found", place_id)))?;

    store_hot_scores(db, &place).await
}

/// Recompute and store both hot-score variants for one place
async fn store_hot_scores<C: ConnectionTrait>(
    db: &C,
    place: &places::Model,
) -> Result<(), ServiceError> {
    let score = hot_score(place.view_count, place.average_rating, place.total_ratings);
    let weekly = hot_score(place.weekly_views, place.average_rating, place.total_ratings);

    places::Entity::update_many()
        .col_expr(places::Column::HotScore, Expr::value(score))
        .col_expr(places::Column::WeeklyHotScore, Expr::value(weekly))
        .filter(places::Column::Id.eq(place.id))
        .exec(db)
        .await?;
    Ok(())
}

/// Record a view without blocking the caller. Tracking failures are logged,
/// never surfaced: a read of a place must not fail over its view counter.
pub fn record_view_detached(place_id: i32) {
    actix_web::rt::spawn(async move {
        if let Err(err) = record_view(get_db_pool(), place_id).await {
            log::warn!("failed to record view for place {}: {}", place_id, err);
        }
    });
}

/// Zero the weekly counters and weekly hot scores for every place. Intended
/// to run on the weekly boundary; the scheduler is external.
pub async fn reset_weekly_stats<C: ConnectionTrait>(db: &C) -> Result<(), ServiceError> {
    places::Entity::update_many()
        .col_expr(places::Column::WeeklyViews, Expr::value(0))
        .col_expr(places::Column::WeeklyHotScore, Expr::value(0.0))
        .exec(db)
        .await?;
    Ok(())
}

/// Batch-recompute both hot-score variants for every place. Used for
/// backfill after formula or rating-data changes.
pub async fn recompute_all_hot_scores<C: ConnectionTrait>(db: &C) -> Result<(), ServiceError> {
    let all = places::Entity::find().all(db).await?;
    let count = all.len();
    for place in &all {
        store_hot_scores(db, place).await?;
    }
    log::info!("Recomputed hot scores for {} places", count);
    Ok(())
}
