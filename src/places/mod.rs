//! Place service: creation, moderation lifecycle, and enriched listings
//!
//! Writes pass through the content moderation gate before anything is
//! persisted; reads go through the query builder and come back enriched
//! with freshly aggregated rating data.

pub mod query;

use crate::categories;
use crate::error::ServiceError;
use crate::orm::places::{self, ApprovalStatus, PlaceStatus};
use crate::orm::{place_categories, ratings};
use crate::ratings::{aggregate, CriteriaAverages};
use crate::text::slugify;
use crate::word_filter;
use chrono::Utc;
use query::{Page, Pagination, PlaceFilter, PlaceSort};
use sea_orm::{entity::*, query::*, ConnectionTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// A place plus its fresh per-criterion rating averages. Listings always
/// carry this, never the denormalized cache alone, so they are never stale
/// relative to individual rating edits.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceWithRatings {
    #[serde(flatten)]
    pub place: places::Model,
    pub criteria: CriteriaAverages,
}

/// Payload for creating a place
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPlace {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 10_000))]
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[serde(default)]
    pub category_slugs: Vec<String>,
}

/// Payload for updating a place; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePlace {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 10_000))]
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub category_slugs: Option<Vec<String>>,
    pub status: Option<PlaceStatus>,
}

/// Moderator verdict on a pending place
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase", tag = "decision")]
pub enum ReviewDecision {
    Approve,
    Reject { reason: Option<String> },
}

/// Pick the first slug not already taken: the base itself, then `base-2`,
/// `base-3`, and so on.
fn next_free_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|slug| slug == base) {
        return base.to_owned();
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken.iter().any(|slug| slug == &candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Derive a globally unique slug for a place name
pub async fn unique_slug<C: ConnectionTrait>(db: &C, name: &str) -> Result<String, ServiceError> {
    let base = slugify(name);
    if base.is_empty() {
        return Err(ServiceError::Invalid(
            "Place name must contain at least one letter or digit".to_owned(),
        ));
    }
    let taken: Vec<String> = places::Entity::find()
        .select_only()
        .column(places::Column::Slug)
        .filter(
            places::Column::Slug
                .eq(base.as_str())
                .or(places::Column::Slug.starts_with(&format!("{}-", base))),
        )
        .into_tuple()
        .all(db)
        .await?;
    Ok(next_free_slug(&base, &taken))
}

fn can_edit(place: &places::Model, actor_id: i32, actor_is_privileged: bool) -> bool {
    place.created_by == actor_id || actor_is_privileged
}

fn can_view(place: &places::Model, actor_id: Option<i32>, actor_is_privileged: bool) -> bool {
    place.approval_status.is_approved()
        || actor_is_privileged
        || actor_id.is_some_and(|id| id == place.created_by)
}

/// Create a place. The submission is gated against the restricted-word
/// index first: a ban-class match rejects the whole write, warn/hide
/// matches are rewritten before storage. The place starts `pending`.
pub async fn create_place<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    input: NewPlace,
    created_by: i32,
) -> Result<places::Model, ServiceError> {
    input
        .validate()
        .map_err(|err| ServiceError::Invalid(err.to_string()))?;

    let index = word_filter::current_index();
    index.validate_submission(&[
        input.name.as_str(),
        input.description.as_deref().unwrap_or(""),
        input.address.as_deref().unwrap_or(""),
    ])?;
    let name = index.sanitize(input.name.trim());
    let description = input.description.as_deref().map(|d| index.sanitize(d));
    let address = input.address.as_deref().map(|a| index.sanitize(a));

    let resolved = categories::resolve_slugs(db, &input.category_slugs).await?;
    let slug = unique_slug(db, &name).await?;
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;

    let place = places::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        description: Set(description),
        address: Set(address),
        status: Set(PlaceStatus::Active),
        approval_status: Set(ApprovalStatus::Pending),
        rejection_reason: Set(None),
        reviewed_by: Set(None),
        average_rating: Set(0.0),
        total_ratings: Set(0),
        view_count: Set(0),
        hot_score: Set(0.0),
        weekly_views: Set(0),
        weekly_hot_score: Set(0.0),
        created_by: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (position, category) in resolved.iter().enumerate() {
        place_categories::ActiveModel {
            place_id: Set(place.id),
            category_id: Set(category.id),
            position: Set(position as i32),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(place)
}

/// Update a place. Only the owner or a privileged actor may edit; the
/// moderation gate runs over the merged (existing + incoming) content.
pub async fn update_place<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    place_id: i32,
    input: UpdatePlace,
    actor_id: i32,
    actor_is_privileged: bool,
) -> Result<places::Model, ServiceError> {
    input
        .validate()
        .map_err(|err| ServiceError::Invalid(err.to_string()))?;

    let place = places::Entity::find_by_id(place_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Place {} not found", place_id)))?;
    if !can_edit(&place, actor_id, actor_is_privileged) {
        return Err(ServiceError::Forbidden(
            "You may only edit places you created".to_owned(),
        ));
    }

    // Merge, then gate the merged content: an update must not be able to
    // smuggle a banned word past a check of only the changed fields.
    let name = input.name.unwrap_or_else(|| place.name.clone());
    let description = input.description.or_else(|| place.description.clone());
    let address = input.address.or_else(|| place.address.clone());

    let index = word_filter::current_index();
    index.validate_submission(&[
        name.as_str(),
        description.as_deref().unwrap_or(""),
        address.as_deref().unwrap_or(""),
    ])?;
    let name = index.sanitize(name.trim());
    let description = description.as_deref().map(|d| index.sanitize(d));
    let address = address.as_deref().map(|a| index.sanitize(a));

    let resolved = match &input.category_slugs {
        Some(slugs) => Some(categories::resolve_slugs(db, slugs).await?),
        None => None,
    };
    let slug = if name == place.name {
        place.slug.clone()
    } else {
        unique_slug(db, &name).await?
    };
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;

    let mut active: places::ActiveModel = place.into();
    active.name = Set(name);
    active.slug = Set(slug);
    active.description = Set(description);
    active.address = Set(address);
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    active.updated_at = Set(now);
    let place = active.update(&txn).await?;

    if let Some(resolved) = resolved {
        place_categories::Entity::delete_many()
            .filter(place_categories::Column::PlaceId.eq(place.id))
            .exec(&txn)
            .await?;
        for (position, category) in resolved.iter().enumerate() {
            place_categories::ActiveModel {
                place_id: Set(place.id),
                category_id: Set(category.id),
                position: Set(position as i32),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    Ok(place)
}

/// Approve or reject a pending place. Transitions are one-way per review
/// cycle: only a pending place may be reviewed.
pub async fn review_place<C: ConnectionTrait>(
    db: &C,
    place_id: i32,
    decision: ReviewDecision,
    reviewer_id: i32,
) -> Result<places::Model, ServiceError> {
    let place = places::Entity::find_by_id(place_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Place {} not found", place_id)))?;
    if place.approval_status != ApprovalStatus::Pending {
        return Err(ServiceError::Invalid(
            "Only a pending place can be reviewed".to_owned(),
        ));
    }

    let mut active: places::ActiveModel = place.into();
    match decision {
        ReviewDecision::Approve => {
            active.approval_status = Set(ApprovalStatus::Approved);
            active.rejection_reason = Set(None);
        }
        ReviewDecision::Reject { reason } => {
            active.approval_status = Set(ApprovalStatus::Rejected);
            active.rejection_reason = Set(reason);
        }
    }
    active.reviewed_by = Set(Some(reviewer_id));
    active.updated_at = Set(Utc::now().naive_utc());
    Ok(active.update(db).await?)
}

/// Fetch one place by slug, enriched with fresh rating averages.
/// Non-approved places are visible only to their owner or privileged
/// actors; everyone else sees `NotFound`.
pub async fn get_place<C: ConnectionTrait>(
    db: &C,
    slug: &str,
    actor_id: Option<i32>,
    actor_is_privileged: bool,
) -> Result<PlaceWithRatings, ServiceError> {
    let place = places::Entity::find()
        .filter(places::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Place {:?} not found", slug)))?;
    if !can_view(&place, actor_id, actor_is_privileged) {
        return Err(ServiceError::NotFound(format!("Place {:?} not found", slug)));
    }

    let criteria = crate::ratings::criteria_averages(db, place.id).await?;
    Ok(PlaceWithRatings { place, criteria })
}

/// Execute a listing and enrich every returned place with fresh
/// per-criterion averages.
///
/// Enrichment is one batched ratings query for the whole page; if it fails
/// the listing call fails. A place is never silently dropped from the page
/// and never served with ad-hoc defaults.
pub async fn list_places<C: ConnectionTrait>(
    db: &C,
    filter: &PlaceFilter,
    pagination: Pagination,
    sort: PlaceSort,
) -> Result<Page<PlaceWithRatings>, ServiceError> {
    let page = query::execute(db, filter, pagination, sort).await?;

    let ids: Vec<i32> = page.items.iter().map(|p| p.id).collect();
    let mut by_place: HashMap<i32, Vec<ratings::Model>> = HashMap::new();
    if !ids.is_empty() {
        let all = ratings::Entity::find()
            .filter(ratings::Column::PlaceId.is_in(ids))
            .all(db)
            .await?;
        for rating in all {
            by_place.entry(rating.place_id).or_default().push(rating);
        }
    }

    Ok(page.map(|place| {
        let criteria = by_place
            .get(&place.id)
            .map(|list| aggregate(list))
            .unwrap_or_default();
        PlaceWithRatings { place, criteria }
    }))
}
