//! Welcome endpoint

use axum::{routing::get, Json, Router};

use super::Message;

pub const WELCOME: &str = "Bienvenido a la API de Alumnos y Carreras";

/// GET /
async fn index() -> Json<Message> {
    Json(Message::new(WELCOME))
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(index))
}
