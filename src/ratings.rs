//! Rating aggregation
//!
//! Each rating scores a place across independent criteria; absent criteria
//! are excluded from aggregation, never treated as zero. This module is the
//! only writer of the denormalized `average_rating`/`total_ratings` fields
//! on places, and recomputation runs synchronously with every rating
//! mutation so the cache never diverges for longer than one request.

use crate::error::ServiceError;
use crate::orm::{places, ratings};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-criterion means for one place, each over exactly the ratings that
/// scored that criterion, rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CriteriaAverages {
    pub drink_quality: f64,
    pub location: f64,
    pub price: f64,
    pub service: f64,
    pub staff_attitude: f64,
    pub total_ratings: i32,
}

/// The scalar summary written onto the place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: i32,
}

/// Criterion scores submitted with a rating, each 0-5
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RatingScores {
    #[validate(range(min = 0, max = 5))]
    pub drink_quality: Option<i16>,
    #[validate(range(min = 0, max = 5))]
    pub location: Option<i16>,
    #[validate(range(min = 0, max = 5))]
    pub price: Option<i16>,
    #[validate(range(min = 0, max = 5))]
    pub service: Option<i16>,
    #[validate(range(min = 0, max = 5))]
    pub staff_attitude: Option<i16>,
}

impl RatingScores {
    fn is_empty(&self) -> bool {
        self.drink_quality.is_none()
            && self.location.is_none()
            && self.price.is_none()
            && self.service.is_none()
            && self.staff_attitude.is_none()
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()
            .map_err(|_| ServiceError::Invalid("Rating criteria must be between 0 and 5".to_owned()))?;
        if self.is_empty() {
            return Err(ServiceError::Invalid(
                "A rating must score at least one criterion".to_owned(),
            ));
        }
        Ok(())
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean_of(ratings: &[ratings::Model], pick: fn(&ratings::Model) -> Option<i16>) -> f64 {
    let mut sum = 0i64;
    let mut count = 0i64;
    for rating in ratings {
        if let Some(score) = pick(rating) {
            sum += i64::from(score);
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        round1(sum as f64 / count as f64)
    }
}

/// Per-criterion means over a set of ratings. Criteria are independently
/// averaged: each divides by the count of ratings that scored it, not by
/// the total rating count.
pub fn aggregate(ratings: &[ratings::Model]) -> CriteriaAverages {
    CriteriaAverages {
        drink_quality: mean_of(ratings, |r| r.drink_quality),
        location: mean_of(ratings, |r| r.location),
        price: mean_of(ratings, |r| r.price),
        service: mean_of(ratings, |r| r.service),
        staff_attitude: mean_of(ratings, |r| r.staff_attitude),
        total_ratings: ratings.len() as i32,
    }
}

/// The scalar overall average: a flat mean over every individual criterion
/// value ever submitted, not a mean of per-criterion means. Rounded to two
/// decimals.
pub fn summarize(ratings: &[ratings::Model]) -> RatingSummary {
    let mut sum = 0i64;
    let mut count = 0i64;
    for rating in ratings {
        for score in rating.present_scores() {
            sum += i64::from(score);
            count += 1;
        }
    }
    let average_rating = if count == 0 {
        0.0
    } else {
        round2(sum as f64 / count as f64)
    };
    RatingSummary {
        average_rating,
        total_ratings: ratings.len() as i32,
    }
}

/// Fresh per-criterion averages for one place
pub async fn criteria_averages<C: ConnectionTrait>(
    db: &C,
    place_id: i32,
) -> Result<CriteriaAverages, ServiceError> {
    let all = ratings::Entity::find()
        .filter(ratings::Column::PlaceId.eq(place_id))
        .all(db)
        .await?;
    Ok(aggregate(&all))
}

/// Recompute the scalar summary for a place and write it onto the place's
/// denormalized fields. Idempotent; must run synchronously after every
/// rating create/update/delete.
pub async fn recompute_and_persist<C: ConnectionTrait>(
    db: &C,
    place_id: i32,
) -> Result<RatingSummary, ServiceError> {
    let all = ratings::Entity::find()
        .filter(ratings::Column::PlaceId.eq(place_id))
        .all(db)
        .await?;
    let summary = summarize(&all);

    places::Entity::update_many()
        .col_expr(places::Column::AverageRating, Expr::value(summary.average_rating))
        .col_expr(places::Column::TotalRatings, Expr::value(summary.total_ratings))
        .filter(places::Column::Id.eq(place_id))
        .exec(db)
        .await?;

    Ok(summary)
}

/// Submit a new rating for a place. One rating per user per place; the
/// place's summary is recomputed before returning.
pub async fn create_rating<C: ConnectionTrait>(
    db: &C,
    place_id: i32,
    user_id: i32,
    scores: RatingScores,
) -> Result<(ratings::Model, RatingSummary), ServiceError> {
    scores.check()?;

    places::Entity::find_by_id(place_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Place {} not found", place_id)))?;

    let existing = ratings::Entity::find()
        .filter(ratings::Column::PlaceId.eq(place_id))
        .filter(ratings::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(
            "You have already rated this place; update your rating instead".to_owned(),
        ));
    }

    let now = Utc::now().naive_utc();
    let rating = ratings::ActiveModel {
        place_id: Set(place_id),
        user_id: Set(user_id),
        drink_quality: Set(scores.drink_quality),
        location: Set(scores.location),
        price: Set(scores.price),
        service: Set(scores.service),
        staff_attitude: Set(scores.staff_attitude),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let summary = recompute_and_persist(db, place_id).await?;
    Ok((rating, summary))
}

/// Replace the scores of an existing rating. Only its author may update it.
pub async fn update_rating<C: ConnectionTrait>(
    db: &C,
    rating_id: i32,
    actor_id: i32,
    scores: RatingScores,
) -> Result<(ratings::Model, RatingSummary), ServiceError> {
    scores.check()?;

    let rating = ratings::Entity::find_by_id(rating_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Rating {} not found", rating_id)))?;
    if rating.user_id != actor_id {
        return Err(ServiceError::Forbidden(
            "You may only update your own rating".to_owned(),
        ));
    }

    let place_id = rating.place_id;
    let mut active: ratings::ActiveModel = rating.into();
    active.drink_quality = Set(scores.drink_quality);
    active.location = Set(scores.location);
    active.price = Set(scores.price);
    active.service = Set(scores.service);
    active.staff_attitude = Set(scores.staff_attitude);
    active.updated_at = Set(Utc::now().naive_utc());
    let rating = active.update(db).await?;

    let summary = recompute_and_persist(db, place_id).await?;
    Ok((rating, summary))
}

/// Delete a rating. Allowed for its author or a privileged actor.
pub async fn delete_rating<C: ConnectionTrait>(
    db: &C,
    rating_id: i32,
    actor_id: i32,
    actor_is_privileged: bool,
) -> Result<RatingSummary, ServiceError> {
    let rating = ratings::Entity::find_by_id(rating_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Rating {} not found", rating_id)))?;
    if rating.user_id != actor_id && !actor_is_privileged {
        return Err(ServiceError::Forbidden(
            "You may only delete your own rating".to_owned(),
        ));
    }

    let place_id = rating.place_id;
    ratings::Entity::delete_by_id(rating_id).exec(db).await?;
    recompute_and_persist(db, place_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn rating(
        id: i32,
        drink_quality: Option<i16>,
        location: Option<i16>,
        price: Option<i16>,
        service: Option<i16>,
        staff_attitude: Option<i16>,
    ) -> ratings::Model {
        ratings::Model {
            id,
            place_id: 1,
            user_id: id,
            drink_quality,
            location,
            price,
            service,
            staff_attitude,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_aggregate_zero_ratings() {
        let averages = aggregate(&[]);
        assert_eq!(averages, CriteriaAverages::default());
    }

    #[test]
    fn test_aggregate_independent_criteria() {
        let all = vec![
            rating(1, Some(4), Some(2), None, Some(5), None),
            rating(2, Some(5), Some(3), Some(1), None, None),
        ];
        let averages = aggregate(&all);
        assert_eq!(averages.drink_quality, 4.5);
        assert_eq!(averages.location, 2.5);
        // price scored by one rating only: divided by 1, not by 2
        assert_eq!(averages.price, 1.0);
        assert_eq!(averages.service, 5.0);
        // absent from all ratings: 0, not an error
        assert_eq!(averages.staff_attitude, 0.0);
        assert_eq!(averages.total_ratings, 2);
    }

    #[test]
    fn test_aggregate_rounds_to_one_decimal() {
        let all = vec![
            rating(1, Some(5), None, None, None, None),
            rating(2, Some(4), None, None, None, None),
            rating(3, Some(4), None, None, None, None),
        ];
        // 13 / 3 = 4.333... -> 4.3
        assert_eq!(aggregate(&all).drink_quality, 4.3);
    }

    #[test]
    fn test_summarize_is_flat_mean_not_mean_of_means() {
        let all = vec![
            rating(1, Some(5), Some(5), Some(5), None, None),
            rating(2, Some(1), None, None, None, None),
        ];
        // Flat mean: (5+5+5+1)/4 = 4.0. Mean of per-criterion means would
        // be (3+5+5)/3 ≈ 4.33.
        let summary = summarize(&all);
        assert_eq!(summary.average_rating, 4.0);
        assert_eq!(summary.total_ratings, 2);
    }

    #[test]
    fn test_summarize_zero_ratings() {
        let summary = summarize(&[]);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.total_ratings, 0);
    }

    #[test]
    fn test_summarize_rounds_to_two_decimals() {
        let all = vec![
            rating(1, Some(5), Some(4), None, None, None),
            rating(2, Some(4), None, None, None, None),
        ];
        // (5+4+4)/3 = 4.333... -> 4.33
        assert_eq!(summarize(&all).average_rating, 4.33);
    }

    #[test]
    fn test_scores_check_rejects_out_of_range() {
        let scores = RatingScores {
            drink_quality: Some(6),
            ..Default::default()
        };
        assert!(matches!(scores.check(), Err(ServiceError::Invalid(_))));
    }

    #[test]
    fn test_scores_check_rejects_empty() {
        assert!(matches!(
            RatingScores::default().check(),
            Err(ServiceError::Invalid(_))
        ));
    }

    #[test]
    fn test_scores_check_accepts_partial() {
        let scores = RatingScores {
            price: Some(3),
            ..Default::default()
        };
        assert!(scores.check().is_ok());
    }
}
