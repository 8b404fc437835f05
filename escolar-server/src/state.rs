//! Application state shared across handlers

use std::sync::Arc;

use crate::db::{DbError, Provisioner, StoreConnection};
use crate::http::error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    provisioner: Box<dyn Provisioner>,
    redact_storage_errors: bool,
}

impl AppState {
    pub fn new<P>(provisioner: P, redact_storage_errors: bool) -> Self
    where
        P: Provisioner + 'static,
    {
        Self {
            inner: Arc::new(AppStateInner {
                provisioner: Box::new(provisioner),
                redact_storage_errors,
            }),
        }
    }

    /// Check out this request's connection.
    ///
    /// The handle is released when it goes out of scope, whichever way the
    /// handler returns.
    pub async fn acquire(&self) -> Result<Box<dyn StoreConnection>, ApiError> {
        self.inner.provisioner.acquire().await.map_err(|e| {
            tracing::error!(reason = %e.reason, "storage connection unavailable");
            ApiError::ConnectionUnavailable
        })
    }

    /// Convert a storage failure into a 500 response.
    pub fn storage_error(&self, e: DbError) -> ApiError {
        ApiError::storage(e, self.inner.redact_storage_errors)
    }
}
