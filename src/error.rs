//! Service error taxonomy
//!
//! All core failures are deterministic, synchronous client errors plus a
//! single database variant. Responses carry a machine-readable `error`
//! kind and a human-readable `message`; `ContentRejected` additionally
//! enumerates the offending words so the submitter can correct them.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum ServiceError {
    /// A ban-class restricted word was found in submitted text
    ContentRejected { words: Vec<String> },
    /// Referenced place/category/rating/word does not exist
    NotFound(String),
    /// Duplicate unique key (place slug, restricted word literal)
    Conflict(String),
    /// Actor lacks ownership or elevated privilege
    Forbidden(String),
    /// Malformed filter/pagination/criterion values
    Invalid(String),
    Database(DbErr),
}

impl ServiceError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::ContentRejected { .. } => "content_rejected",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Invalid(_) => "invalid",
            ServiceError::Database(_) => "database",
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::ContentRejected { words } => {
                write!(f, "Content contains restricted words: {}", words.join(", "))
            }
            ServiceError::NotFound(msg)
            | ServiceError::Conflict(msg)
            | ServiceError::Forbidden(msg)
            | ServiceError::Invalid(msg) => f.write_str(msg),
            ServiceError::Database(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        ServiceError::Database(err)
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ContentRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Invalid(_) => StatusCode::BAD_REQUEST,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ServiceError::Database(err) = self {
            log::error!("database error: {}", err);
        }
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let ServiceError::ContentRejected { words } = self {
            body["words"] = json!(words);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}
