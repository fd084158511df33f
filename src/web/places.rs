//! Place listing and mutation endpoints

use crate::app_config::AppConfig;
use crate::db::get_db_pool;
use crate::error::ServiceError;
use crate::middleware::ClientCtx;
use crate::orm::places::ApprovalStatus;
use crate::places::query::{Pagination, PlaceFilter, PlaceSort, PlaceSortField, SortDirection};
use crate::places::{self, NewPlace, ReviewDecision, UpdatePlace};
use crate::ranking;
use crate::ratings;
use actix_web::{get, patch, post, web, HttpResponse, Responder};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_places)
        .service(create_place)
        .service(update_place)
        .service(review_place)
        .service(record_view)
        .service(rating_summary)
        .service(view_place);
}

#[derive(Debug, Deserialize)]
pub struct PlaceListQuery {
    /// Case-insensitive substring match on the name
    pub name: Option<String>,
    /// Comma-joined category slugs
    pub category: Option<String>,
    /// Explicit approval state; honored for privileged callers only
    pub status: Option<ApprovalStatus>,
    pub sort: Option<String>,
    pub order: Option<SortDirection>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

fn parse_sort(
    sort: Option<&str>,
    order: Option<SortDirection>,
) -> Result<PlaceSort, ServiceError> {
    let Some(sort) = sort else {
        return Ok(PlaceSort::default());
    };
    if sort == "approval_priority" {
        return Ok(PlaceSort::ApprovalPriority);
    }
    let field = match sort {
        "name" => PlaceSortField::Name,
        "created_at" => PlaceSortField::CreatedAt,
        "average_rating" => PlaceSortField::AverageRating,
        "view_count" => PlaceSortField::ViewCount,
        "hot_score" => PlaceSortField::HotScore,
        "weekly_hot_score" => PlaceSortField::WeeklyHotScore,
        other => {
            return Err(ServiceError::Invalid(format!(
                "Unknown sort field {:?}",
                other
            )))
        }
    };
    let direction = order.unwrap_or(match field {
        PlaceSortField::Name => SortDirection::Asc,
        _ => SortDirection::Desc,
    });
    Ok(PlaceSort::Field { field, direction })
}

fn split_slugs(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[get("/places")]
async fn list_places(
    client: ClientCtx,
    query: web::Query<PlaceListQuery>,
) -> Result<impl Responder, ServiceError> {
    let query = query.into_inner();
    let filter = PlaceFilter {
        name_contains: query.name,
        category_slugs: query.category.as_deref().map(split_slugs),
        approval_status: query.status,
        include_unapproved: client.is_privileged(),
    };
    let pagination = Pagination::new(
        query.page.unwrap_or(1),
        query
            .limit
            .unwrap_or_else(|| AppConfig::get().listing.default_page_size),
    );
    let sort = parse_sort(query.sort.as_deref(), query.order)?;

    let page = places::list_places(get_db_pool(), &filter, pagination, sort).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/places")]
async fn create_place(
    client: ClientCtx,
    payload: web::Json<NewPlace>,
) -> Result<impl Responder, ServiceError> {
    let user_id = client.require_user()?;
    let place = places::create_place(get_db_pool(), payload.into_inner(), user_id).await?;
    Ok(HttpResponse::Created().json(place))
}

#[get("/places/{slug}")]
async fn view_place(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<impl Responder, ServiceError> {
    let place =
        places::get_place(get_db_pool(), &path, client.user_id, client.is_privileged()).await?;
    // Fire-and-forget: the read is never slowed or failed by view tracking
    ranking::record_view_detached(place.place.id);
    Ok(HttpResponse::Ok().json(place))
}

#[patch("/places/{id}")]
async fn update_place(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<UpdatePlace>,
) -> Result<impl Responder, ServiceError> {
    let user_id = client.require_user()?;
    let place = places::update_place(
        get_db_pool(),
        *path,
        payload.into_inner(),
        user_id,
        client.is_privileged(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(place))
}

#[post("/places/{id}/review")]
async fn review_place(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<ReviewDecision>,
) -> Result<impl Responder, ServiceError> {
    let reviewer_id = client.require_privileged()?;
    let place = places::review_place(get_db_pool(), *path, payload.into_inner(), reviewer_id).await?;
    Ok(HttpResponse::Ok().json(place))
}

/// Explicit view-tracking endpoint; no meaningful body beyond success
#[post("/places/{id}/view")]
async fn record_view(path: web::Path<i32>) -> Result<impl Responder, ServiceError> {
    ranking::record_view(get_db_pool(), *path).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/places/{id}/ratings/summary")]
async fn rating_summary(path: web::Path<i32>) -> Result<impl Responder, ServiceError> {
    let averages = ratings::criteria_averages(get_db_pool(), *path).await?;
    Ok(HttpResponse::Ok().json(averages))
}
