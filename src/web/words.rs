//! Administrator word-list management
//!
//! The in-memory index is rebuilt after every mutation; no other component
//! may change the word list.

use crate::db::get_db_pool;
use crate::error::ServiceError;
use crate::middleware::ClientCtx;
use crate::orm::restricted_words::{self, Severity};
use crate::word_filter;
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use sea_orm::{entity::*, query::*};
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_words)
        .service(create_word)
        .service(delete_word);
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewWord {
    #[validate(length(min = 1, max = 100))]
    pub word: String,
    pub severity: Severity,
    /// Defaults to first character + asterisks when omitted
    pub replacement: Option<String>,
}

#[get("/admin/words")]
async fn list_words(client: ClientCtx) -> Result<impl Responder, ServiceError> {
    client.require_privileged()?;
    let words = restricted_words::Entity::find()
        .order_by_asc(restricted_words::Column::Word)
        .all(get_db_pool())
        .await?;
    Ok(HttpResponse::Ok().json(words))
}

#[post("/admin/words")]
async fn create_word(
    client: ClientCtx,
    payload: web::Json<NewWord>,
) -> Result<impl Responder, ServiceError> {
    let admin_id = client.require_privileged()?;
    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|err| ServiceError::Invalid(err.to_string()))?;

    let db = get_db_pool();
    let word = word_filter::create_word(
        db,
        &payload.word,
        payload.severity,
        payload.replacement,
        Some(admin_id),
    )
    .await?;
    word_filter::reload_index(db).await?;
    Ok(HttpResponse::Created().json(word))
}

#[delete("/admin/words/{id}")]
async fn delete_word(client: ClientCtx, path: web::Path<i32>) -> Result<impl Responder, ServiceError> {
    client.require_privileged()?;
    let db = get_db_pool();
    word_filter::delete_word(db, *path).await?;
    word_filter::reload_index(db).await?;
    Ok(HttpResponse::NoContent().finish())
}
