//! Place listing query builder
//!
//! Translates a closed, typed filter into a SeaORM select with consistent
//! counting and pagination. Both sort paths count against the identical
//! filter predicate, so `total_results` never depends on the sort mode.

use crate::categories;
use crate::error::ServiceError;
use crate::orm::{place_categories, places};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{entity::*, query::*, ConnectionTrait};
use serde::{Deserialize, Serialize};

/// Fixed upper bound on page size; oversized requests are clamped, not
/// rejected.
pub const MAX_PAGE_SIZE: u64 = 100;

/// 1-indexed pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pagination {
    /// Clamp out-of-range values into the valid window
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// One page of results plus the derived pagination summary
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total_results: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl<T> Page<T> {
    /// Assemble a page; `total_results` must reflect the filter before
    /// pagination was applied.
    pub fn new(items: Vec<T>, pagination: Pagination, total_results: u64) -> Self {
        let total_pages = total_results.div_ceil(pagination.limit);
        Self {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total_results,
            total_pages,
            has_next_page: pagination.page < total_pages,
            has_prev_page: pagination.page > 1 && total_results > 0,
        }
    }

    /// Map the items of a page, keeping the pagination summary
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_results: self.total_results,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            has_prev_page: self.has_prev_page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn order(self) -> Order {
        match self {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// Place fields a caller may sort on explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceSortField {
    Name,
    CreatedAt,
    AverageRating,
    ViewCount,
    HotScore,
    WeeklyHotScore,
}

impl PlaceSortField {
    fn column(self) -> places::Column {
        match self {
            PlaceSortField::Name => places::Column::Name,
            PlaceSortField::CreatedAt => places::Column::CreatedAt,
            PlaceSortField::AverageRating => places::Column::AverageRating,
            PlaceSortField::ViewCount => places::Column::ViewCount,
            PlaceSortField::HotScore => places::Column::HotScore,
            PlaceSortField::WeeklyHotScore => places::Column::WeeklyHotScore,
        }
    }
}

/// How to order a place listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceSort {
    Field {
        field: PlaceSortField,
        direction: SortDirection,
    },
    /// Moderator dashboard ordering: pending first, then approved, then
    /// rejected, newest first within each band.
    ApprovalPriority,
}

impl Default for PlaceSort {
    fn default() -> Self {
        PlaceSort::Field {
            field: PlaceSortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// Closed filter over the place listing. Public paths leave
/// `include_unapproved` false, which pins `approval_status = approved`
/// regardless of the `approval_status` field.
#[derive(Debug, Clone, Default)]
pub struct PlaceFilter {
    /// Case-insensitive substring match on the display name
    pub name_contains: Option<String>,
    /// Category slugs; places must reference at least one of them. Unknown
    /// slugs are permissively dropped (they simply cannot match).
    pub category_slugs: Option<Vec<String>>,
    /// Explicit approval state, honored only for privileged callers
    pub approval_status: Option<places::ApprovalStatus>,
    /// Privileged opt-out of the implicit approved-only restriction
    pub include_unapproved: bool,
}

/// SQL rank used for the approval-priority sort band
const APPROVAL_RANK: &str =
    "CASE approval_status WHEN 'pending' THEN 0 WHEN 'approved' THEN 1 ELSE 2 END";

/// Build the filtered (unsorted, unpaginated) select for a listing.
///
/// Category slugs are resolved to identifiers here; an empty resolved set
/// still produces a valid query that matches zero rows.
pub async fn build_filter<C: ConnectionTrait>(
    db: &C,
    filter: &PlaceFilter,
) -> Result<Select<places::Entity>, ServiceError> {
    let mut select = places::Entity::find();

    if filter.include_unapproved {
        if let Some(status) = &filter.approval_status {
            select = select.filter(places::Column::ApprovalStatus.eq(status.clone()));
        }
    } else {
        select = select.filter(places::Column::ApprovalStatus.eq(places::ApprovalStatus::Approved));
    }

    if let Some(name) = filter.name_contains.as_deref() {
        let name = name.trim();
        if !name.is_empty() {
            // ILIKE: the substring match is case-insensitive
            let escaped = name.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            select = select.filter(
                Expr::col((places::Entity, places::Column::Name)).ilike(format!("%{}%", escaped)),
            );
        }
    }

    if let Some(slugs) = &filter.category_slugs {
        let ids = categories::resolve_slugs_permissive(db, slugs).await?;
        select = select.filter(
            Expr::col((places::Entity, places::Column::Id)).in_subquery(
                Query::select()
                    .column(place_categories::Column::PlaceId)
                    .from(place_categories::Entity)
                    .and_where(place_categories::Column::CategoryId.is_in(ids))
                    .to_owned(),
            ),
        );
    }

    Ok(select)
}

fn apply_sort(select: Select<places::Entity>, sort: PlaceSort) -> Select<places::Entity> {
    match sort {
        PlaceSort::Field { field, direction } => select
            .order_by(field.column(), direction.order())
            // Stable tie-break so pagination never duplicates or drops rows
            .order_by(places::Column::Id, Order::Asc),
        PlaceSort::ApprovalPriority => select
            .order_by(Expr::cust(APPROVAL_RANK), Order::Asc)
            .order_by(places::Column::CreatedAt, Order::Desc)
            .order_by(places::Column::Id, Order::Asc),
    }
}

/// Execute a listing: count the filter, then fetch one sorted page.
pub async fn execute<C: ConnectionTrait>(
    db: &C,
    filter: &PlaceFilter,
    pagination: Pagination,
    sort: PlaceSort,
) -> Result<Page<places::Model>, ServiceError> {
    let select = build_filter(db, filter).await?;

    let total_results = select.clone().count(db).await?;
    let items = apply_sort(select, sort)
        .offset(pagination.offset())
        .limit(pagination.limit)
        .all(db)
        .await?;

    Ok(Page::new(items, pagination, total_results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    fn sql(select: &Select<places::Entity>) -> String {
        select.clone().build(sea_orm::DbBackend::Postgres).to_string()
    }

    async fn mock_db() -> sea_orm::DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[actix_rt::test]
    async fn test_public_filter_pins_approved() {
        let db = mock_db().await;
        let select = build_filter(&db, &PlaceFilter::default()).await.unwrap();
        assert!(sql(&select).contains(r#""approval_status" = 'approved'"#));
    }

    #[actix_rt::test]
    async fn test_privileged_filter_can_opt_out() {
        let db = mock_db().await;
        let filter = PlaceFilter {
            include_unapproved: true,
            ..Default::default()
        };
        let select = build_filter(&db, &filter).await.unwrap();
        assert!(!sql(&select).contains("approval_status"));
    }

    #[actix_rt::test]
    async fn test_privileged_filter_honors_explicit_status() {
        let db = mock_db().await;
        let filter = PlaceFilter {
            include_unapproved: true,
            approval_status: Some(places::ApprovalStatus::Rejected),
            ..Default::default()
        };
        let select = build_filter(&db, &filter).await.unwrap();
        assert!(sql(&select).contains(r#""approval_status" = 'rejected'"#));
    }

    #[actix_rt::test]
    async fn test_name_filter_is_substring_match() {
        let db = mock_db().await;
        let filter = PlaceFilter {
            name_contains: Some("cafe".to_owned()),
            ..Default::default()
        };
        let select = build_filter(&db, &filter).await.unwrap();
        let sql = sql(&select);
        assert!(sql.contains("ILIKE") && sql.contains("%cafe%"), "got: {}", sql);
    }

    #[actix_rt::test]
    async fn test_blank_name_filter_is_ignored() {
        let db = mock_db().await;
        let filter = PlaceFilter {
            name_contains: Some("   ".to_owned()),
            ..Default::default()
        };
        let select = build_filter(&db, &filter).await.unwrap();
        assert!(!sql(&select).contains("ILIKE"));
    }

    #[test]
    fn test_field_sort_orders_by_column() {
        let select = apply_sort(
            places::Entity::find(),
            PlaceSort::Field {
                field: PlaceSortField::HotScore,
                direction: SortDirection::Desc,
            },
        );
        let sql = sql(&select);
        assert!(sql.contains(r#"ORDER BY "places"."hot_score" DESC"#), "got: {}", sql);
    }

    #[test]
    fn test_approval_priority_sort_bands_then_recency() {
        let select = apply_sort(places::Entity::find(), PlaceSort::ApprovalPriority);
        let sql = sql(&select);
        let case_pos = sql.find("CASE approval_status WHEN 'pending' THEN 0").unwrap();
        let created_pos = sql.find(r#""places"."created_at" DESC"#).unwrap();
        assert!(case_pos < created_pos, "rank must be the primary key: {}", sql);
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination::new(0, 0);
        assert_eq!(p, Pagination { page: 1, limit: 1 });
        let p = Pagination::new(3, 10_000);
        assert_eq!(p.limit, MAX_PAGE_SIZE);
        assert_eq!(p.offset(), 2 * MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_summary_derivation() {
        let page = Page::new(vec![1, 2, 3], Pagination::new(2, 3), 7);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next_page);
        assert!(page.has_prev_page);

        let last = Page::new(vec![7], Pagination::new(3, 3), 7);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);

        let empty = Page::<i32>::new(vec![], Pagination::new(1, 20), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_prev_page);
    }
}
