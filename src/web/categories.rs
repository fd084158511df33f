//! Category listing endpoint

use crate::app_config::AppConfig;
use crate::categories::{self, CategoryFilter, CategorySort, CategorySortField};
use crate::db::get_db_pool;
use crate::error::ServiceError;
use crate::orm::categories::CategoryKind;
use crate::places::query::{Pagination, SortDirection};
use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_categories);
}

#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    pub kind: Option<CategoryKind>,
    pub sort: Option<String>,
    pub order: Option<SortDirection>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

fn parse_sort(
    sort: Option<&str>,
    order: Option<SortDirection>,
) -> Result<CategorySort, ServiceError> {
    let field = match sort {
        None => return Ok(CategorySort::default()),
        Some("place_count") => CategorySortField::PlaceCount,
        Some("name") => CategorySortField::Name,
        Some("created_at") => CategorySortField::CreatedAt,
        Some(other) => {
            return Err(ServiceError::Invalid(format!(
                "Unknown sort field {:?}",
                other
            )))
        }
    };
    let direction = order.unwrap_or(match field {
        CategorySortField::Name => SortDirection::Asc,
        _ => SortDirection::Desc,
    });
    Ok(CategorySort { field, direction })
}

/// Categories with their live approved-place counts
#[get("/categories")]
async fn list_categories(
    query: web::Query<CategoryListQuery>,
) -> Result<impl Responder, ServiceError> {
    let query = query.into_inner();
    let filter = CategoryFilter { kind: query.kind };
    let pagination = Pagination::new(
        query.page.unwrap_or(1),
        query
            .limit
            .unwrap_or_else(|| AppConfig::get().listing.default_page_size),
    );
    let sort = parse_sort(query.sort.as_deref(), query.order)?;

    let page = categories::place_counts(get_db_pool(), &filter, pagination, sort).await?;
    Ok(HttpResponse::Ok().json(page))
}
