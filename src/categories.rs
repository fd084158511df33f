//! Category resolution and live place counts
//!
//! `place_count` is always a live projection over approved places, computed
//! at query time from the junction table. It is never cached, so it can
//! never drift from actual approved-place membership.

use crate::error::ServiceError;
use crate::orm::categories::{self, CategoryKind};
use crate::orm::{place_categories, places};
use crate::places::query::{Page, Pagination, SortDirection};
use sea_orm::{entity::*, query::*, ConnectionTrait, FromQueryResult};
use serde::Serialize;
use std::collections::HashMap;

/// A category joined with its live approved-place count
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: categories::Model,
    pub place_count: i64,
}

/// Optional constraints on the category listing
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub kind: Option<CategoryKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySortField {
    PlaceCount,
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySort {
    pub field: CategorySortField,
    pub direction: SortDirection,
}

impl Default for CategorySort {
    /// Popular categories first; ties broken by name for a stable order
    fn default() -> Self {
        Self {
            field: CategorySortField::PlaceCount,
            direction: SortDirection::Desc,
        }
    }
}

/// Resolve category slugs to their full records, all-or-nothing.
///
/// Fails `NotFound` naming every slug that does not exist. The returned
/// list preserves the input order (first occurrence wins for duplicates).
pub async fn resolve_slugs<C: ConnectionTrait>(
    db: &C,
    slugs: &[String],
) -> Result<Vec<categories::Model>, ServiceError> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }

    let found = categories::Entity::find()
        .filter(categories::Column::Slug.is_in(slugs.iter().map(String::as_str)))
        .all(db)
        .await?;
    let by_slug: HashMap<&str, &categories::Model> =
        found.iter().map(|c| (c.slug.as_str(), c)).collect();

    let missing: Vec<&str> = slugs
        .iter()
        .map(String::as_str)
        .filter(|slug| !by_slug.contains_key(slug))
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "Unknown categories: {}",
            missing.join(", ")
        )));
    }

    let mut seen: Vec<&str> = Vec::new();
    let mut ordered = Vec::with_capacity(slugs.len());
    for slug in slugs {
        if !seen.contains(&slug.as_str()) {
            seen.push(slug);
            ordered.push((*by_slug[slug.as_str()]).clone());
        }
    }
    Ok(ordered)
}

/// Resolve slugs for listing filters: unknown slugs are silently dropped
/// rather than erroring out the whole listing. Returns identifiers only.
pub async fn resolve_slugs_permissive<C: ConnectionTrait>(
    db: &C,
    slugs: &[String],
) -> Result<Vec<i32>, ServiceError> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }
    let found = categories::Entity::find()
        .filter(categories::Column::Slug.is_in(slugs.iter().map(String::as_str)))
        .all(db)
        .await?;
    Ok(found.into_iter().map(|c| c.id).collect())
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    category_id: i32,
    place_count: i64,
}

/// Count distinct approved places per category, straight off the live data
async fn approved_place_counts<C: ConnectionTrait>(
    db: &C,
) -> Result<HashMap<i32, i64>, ServiceError> {
    let rows: Vec<CountRow> = place_categories::Entity::find()
        .select_only()
        .column(place_categories::Column::CategoryId)
        .column_as(place_categories::Column::PlaceId.count(), "place_count")
        .join(JoinType::InnerJoin, place_categories::Relation::Place.def())
        .filter(places::Column::ApprovalStatus.eq(places::ApprovalStatus::Approved))
        .group_by(place_categories::Column::CategoryId)
        .into_model()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.category_id, row.place_count))
        .collect())
}

/// Sort merged rows by the requested field; name ascending always breaks
/// ties so the order is total and pagination stays stable.
fn sort_rows(rows: &mut [CategoryWithCount], sort: CategorySort) {
    rows.sort_by(|a, b| {
        let primary = match sort.field {
            CategorySortField::PlaceCount => a.place_count.cmp(&b.place_count),
            CategorySortField::Name => a.category.name.cmp(&b.category.name),
            CategorySortField::CreatedAt => a.category.created_at.cmp(&b.category.created_at),
        };
        let primary = match sort.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.category.name.cmp(&b.category.name))
    });
}

/// List categories with live `place_count`, sorted and paginated.
///
/// Categories with no approved places report 0. The count set and the
/// category set come from the same request, so a place that just left the
/// approved state is excluded immediately.
pub async fn place_counts<C: ConnectionTrait>(
    db: &C,
    filter: &CategoryFilter,
    pagination: Pagination,
    sort: CategorySort,
) -> Result<Page<CategoryWithCount>, ServiceError> {
    let mut select = categories::Entity::find();
    if let Some(kind) = &filter.kind {
        select = select.filter(categories::Column::Kind.eq(kind.clone()));
    }
    let all = select.all(db).await?;
    let counts = approved_place_counts(db).await?;

    let mut rows: Vec<CategoryWithCount> = all
        .into_iter()
        .map(|category| {
            let place_count = counts.get(&category.id).copied().unwrap_or(0);
            CategoryWithCount {
                category,
                place_count,
            }
        })
        .collect();
    sort_rows(&mut rows, sort);

    let total_results = rows.len() as u64;
    let items = rows
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit as usize)
        .collect();

    Ok(Page::new(items, pagination, total_results))
}
