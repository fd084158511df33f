//! Request identity extractor
//!
//! Authentication lives in an upstream collaborator; it forwards an opaque
//! actor identity and role in trusted headers. The core only uses these to
//! decide whether non-approved places are visible and whether an actor may
//! mutate content they do not own.

use crate::error::ServiceError;
use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Role forwarded by the identity collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    fn from_header(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            "moderator" => Role::Moderator,
            _ => Role::User,
        }
    }

    /// Moderators and admins may see and mutate content they do not own
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

/// Per-request actor context. A missing identity header means a guest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientCtx {
    pub user_id: Option<i32>,
    pub role: Role,
}

impl ClientCtx {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_id = headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let role = match user_id {
            // A role without an identity is meaningless
            None => Role::User,
            Some(_) => headers
                .get("x-user-role")
                .and_then(|v| v.to_str().ok())
                .map(Role::from_header)
                .unwrap_or_default(),
        };
        Self { user_id, role }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    /// The acting user's id, or `Forbidden` for guests
    pub fn require_user(&self) -> Result<i32, ServiceError> {
        self.user_id
            .ok_or_else(|| ServiceError::Forbidden("Authentication required".to_owned()))
    }

    /// The acting moderator/admin's id, or `Forbidden`
    pub fn require_privileged(&self) -> Result<i32, ServiceError> {
        let id = self.require_user()?;
        if !self.is_privileged() {
            return Err(ServiceError::Forbidden(
                "Moderator privileges required".to_owned(),
            ));
        }
        Ok(id)
    }
}

impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    /// Never fails; an unauthenticated request is a guest context.
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::from_headers(req.headers())))
    }
}
