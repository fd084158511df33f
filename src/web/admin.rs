//! Administrative ranking maintenance
//!
//! Single-shot operations triggered by an external scheduler or operator:
//! the weekly counter reset and the hot-score backfill.

use crate::db::get_db_pool;
use crate::error::ServiceError;
use crate::middleware::ClientCtx;
use crate::ranking;
use actix_web::{post, HttpResponse, Responder};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(reset_weekly_stats).service(recompute_hot_scores);
}

/// Zero weekly views and weekly hot scores for every place
#[post("/admin/ranking/reset-weekly")]
async fn reset_weekly_stats(client: ClientCtx) -> Result<impl Responder, ServiceError> {
    client.require_privileged()?;
    ranking::reset_weekly_stats(get_db_pool()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Batch-recompute both hot-score variants for every place
#[post("/admin/ranking/recompute")]
async fn recompute_hot_scores(client: ClientCtx) -> Result<impl Responder, ServiceError> {
    client.require_privileged()?;
    ranking::recompute_all_hot_scores(get_db_pool()).await?;
    Ok(HttpResponse::NoContent().finish())
}
