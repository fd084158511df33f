//! Rating mutation endpoints
//!
//! Every mutation returns the rating alongside the place's freshly
//! recomputed summary, so the acting user reads their own write.

use crate::db::get_db_pool;
use crate::error::ServiceError;
use crate::middleware::ClientCtx;
use crate::orm::ratings as rating_entity;
use crate::ratings::{self, RatingScores, RatingSummary};
use actix_web::{delete, patch, post, web, HttpResponse, Responder};
use serde::Serialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_rating)
        .service(update_rating)
        .service(delete_rating);
}

#[derive(Debug, Serialize)]
struct RatingResponse {
    rating: rating_entity::Model,
    summary: RatingSummary,
}

#[post("/places/{place_id}/ratings")]
async fn create_rating(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<RatingScores>,
) -> Result<impl Responder, ServiceError> {
    let user_id = client.require_user()?;
    let (rating, summary) =
        ratings::create_rating(get_db_pool(), *path, user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(RatingResponse { rating, summary }))
}

#[patch("/ratings/{id}")]
async fn update_rating(
    client: ClientCtx,
    path: web::Path<i32>,
    payload: web::Json<RatingScores>,
) -> Result<impl Responder, ServiceError> {
    let user_id = client.require_user()?;
    let (rating, summary) =
        ratings::update_rating(get_db_pool(), *path, user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(RatingResponse { rating, summary }))
}

#[delete("/ratings/{id}")]
async fn delete_rating(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, ServiceError> {
    let user_id = client.require_user()?;
    let summary =
        ratings::delete_rating(get_db_pool(), *path, user_id, client.is_privileged()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
