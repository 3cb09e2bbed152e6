//! Caller identity for mutations that record who acted.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::error::ApiError;

pub const ADMIN_ID_HEADER: &str = "x-admin-id";

/// The admin performing the request, taken from the `X-Admin-Id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminIdentity(pub Uuid);

impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ADMIN_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(AdminIdentity)
            .ok_or(ApiError::Unauthorized)
    }
}
