//! Collection and item endpoints, generic over [`Entity`]
//!
//! Every handler checks out its connection first and holds it in a local,
//! so it is released on every return path. Validation always completes
//! before a write is issued.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};

use super::Message;
use crate::http::error::ApiError;
use crate::http::extractors::RecordId;
use crate::models::{parse_body, Entity, ValidationError};
use crate::state::AppState;

/// Oversized or unreadable bodies render as a format error.
fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ApiError> {
    body.map_err(|rejection| {
        ApiError::Validation(ValidationError::MalformedBody {
            reason: rejection.body_text(),
        })
    })
}

/// GET /{collection} - every record, in storage order
async fn list<E: Entity>(State(state): State<AppState>) -> Result<Json<Vec<E>>, ApiError> {
    let mut conn = state.acquire().await?;

    let records = conn
        .fetch_all(&E::TABLE)
        .await
        .map_err(|e| state.storage_error(e))?;
    let items = records
        .iter()
        .map(E::decode)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| state.storage_error(e))?;

    Ok(Json(items))
}

/// POST /{collection} - validate and insert
async fn create<E: Entity>(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Message>), ApiError> {
    let mut conn = state.acquire().await?;
    let body = read_body(body)?;
    let fields = E::validate(&parse_body(&body)?)?;

    let id = conn
        .insert(&E::TABLE, &E::into_values(fields))
        .await
        .map_err(|e| state.storage_error(e))?;
    tracing::info!(table = E::TABLE.name, id, "record created");

    let location = format!("/{}/{}", E::TABLE.name, id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(Message::new(E::MESSAGES.created)),
    ))
}

/// GET /{collection}/{id}
async fn read<E: Entity>(
    State(state): State<AppState>,
    RecordId { id, .. }: RecordId<E>,
) -> Result<Json<E>, ApiError> {
    let mut conn = state.acquire().await?;

    let record = conn
        .fetch_one(&E::TABLE, id)
        .await
        .map_err(|e| state.storage_error(e))?
        .ok_or_else(ApiError::not_found::<E>)?;

    E::decode(&record)
        .map(Json)
        .map_err(|e| state.storage_error(e))
}

/// PUT /{collection}/{id} - replace every mutable field
///
/// An unknown id updates nothing and still answers 200.
async fn replace<E: Entity>(
    State(state): State<AppState>,
    RecordId { id, .. }: RecordId<E>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Message>, ApiError> {
    let mut conn = state.acquire().await?;
    let body = read_body(body)?;
    let fields = E::validate(&parse_body(&body)?)?;

    let affected = conn
        .update(&E::TABLE, id, &E::into_values(fields))
        .await
        .map_err(|e| state.storage_error(e))?;
    tracing::info!(table = E::TABLE.name, id, affected, "record replaced");

    Ok(Json(Message::new(E::MESSAGES.updated)))
}

/// DELETE /{collection}/{id}
///
/// No existence check; deleting an unknown id answers 200.
async fn remove<E: Entity>(
    State(state): State<AppState>,
    RecordId { id, .. }: RecordId<E>,
) -> Result<Json<Message>, ApiError> {
    let mut conn = state.acquire().await?;

    let affected = conn
        .delete(&E::TABLE, id)
        .await
        .map_err(|e| state.storage_error(e))?;
    tracing::info!(table = E::TABLE.name, id, affected, "record deleted");

    Ok(Json(Message::new(E::MESSAGES.deleted)))
}

/// Collection and item routes for one entity type
pub fn router<E: Entity>() -> Router<AppState> {
    let collection = format!("/{}", E::TABLE.name);
    let item = format!("/{}/{{id}}", E::TABLE.name);

    Router::new()
        .route(&collection, get(list::<E>).post(create::<E>))
        .route(&item, get(read::<E>).put(replace::<E>).delete(remove::<E>))
}
