//! Custom Axum extractors

use std::marker::PhantomData;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::error::ApiError;
use crate::models::Entity;

/// Record identifier from the item path.
///
/// Anything but a non-negative decimal integer addresses no record and is
/// answered with the entity's 404.
pub struct RecordId<E> {
    pub id: i64,
    entity: PhantomData<fn() -> E>,
}

impl<S, E> FromRequestParts<S> for RecordId<E>
where
    S: Send + Sync,
    E: Entity,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found::<E>())?;

        let id = parse_id(&raw).ok_or_else(ApiError::not_found::<E>)?;
        Ok(Self {
            id,
            entity: PhantomData,
        })
    }
}

/// Parse a path identifier: ASCII digits only, fitting in i64.
pub fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
