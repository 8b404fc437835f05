//! Router-level tests against the in-memory store

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use escolar_server::models::{Entity, Program, Student};
use escolar_server::{build_router, AppState, MemoryStore, ServerConfig};

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

fn app_with(store: &MemoryStore, redact: bool) -> Router {
    build_router(AppState::new(store.clone(), redact), &ServerConfig::default())
}

fn app(store: &MemoryStore) -> Router {
    app_with(store, false)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Reply {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(app, request).await
}

async fn send_request(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    Reply {
        status,
        location,
        body,
    }
}

fn isc() -> Value {
    json!({
        "carrera": "ISC",
        "descripcionCarrera": "Ing. en Sistemas",
        "semestres": 9,
        "plan": 2020
    })
}

fn ana() -> Value {
    json!({ "nombre": "Ana", "carrera": "ISC", "semestre": 3, "boleta": "2021630001" })
}

#[tokio::test]
async fn index_welcomes() {
    let store = MemoryStore::new();
    let reply = send(&app(&store), "GET", "/", None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({ "message": "Bienvenido a la API de Alumnos y Carreras" })
    );
    assert_eq!(store.total_acquired(), 0);
}

#[tokio::test]
async fn created_program_is_retrievable() {
    let store = MemoryStore::new();
    let app = app(&store);

    let reply = send(&app, "POST", "/carreras", Some(isc())).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body, json!({ "message": "Carrera creada exitosamente" }));
    let location = reply.location.expect("location header");
    assert_eq!(location, "/carreras/1");

    let reply = send(&app, "GET", &location, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({
            "idCarrera": 1,
            "carrera": "ISC",
            "descripcionCarrera": "Ing. en Sistemas",
            "semestres": 9,
            "plan": 2020
        })
    );

    let reply = send(&app, "GET", "/carreras", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn created_student_is_retrievable() {
    let store = MemoryStore::new();
    let app = app(&store);

    let reply = send(&app, "POST", "/alumnos", Some(ana())).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body, json!({ "message": "Alumno creado exitosamente" }));

    let reply = send(&app, "GET", "/alumnos/1", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({
            "idAlumno": 1,
            "nombre": "Ana",
            "carrera": "ISC",
            "semestre": 3,
            "boleta": "2021630001"
        })
    );
}

#[tokio::test]
async fn empty_collections_list_as_empty_arrays() {
    let store = MemoryStore::new();
    let app = app(&store);

    for uri in ["/carreras", "/alumnos"] {
        let reply = send(&app, "GET", uri, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, json!([]));
    }
}

#[tokio::test]
async fn missing_boleta_is_rejected_before_any_write() {
    let store = MemoryStore::new();
    let reply = send(
        &app(&store),
        "POST",
        "/alumnos",
        Some(json!({ "nombre": "Ana", "carrera": "ISC", "semestre": 3 })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({ "error": "Faltan campos requeridos" }));
    assert_eq!(store.row_count(&Student::TABLE).await, 0);
    assert_eq!(store.queries_executed(), 0);
}

#[tokio::test]
async fn every_missing_field_is_a_400() {
    let store = MemoryStore::new();
    let app = app(&store);

    for column in Program::TABLE.columns {
        let mut body = isc();
        body.as_object_mut().unwrap().remove(column.name);
        let reply = send(&app, "POST", "/carreras", Some(body)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "without {}", column.name);
    }

    for column in Student::TABLE.columns {
        let mut body = ana();
        body.as_object_mut().unwrap().remove(column.name);
        let reply = send(&app, "PUT", "/alumnos/1", Some(body)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "without {}", column.name);
    }

    assert_eq!(store.queries_executed(), 0);
}

#[tokio::test]
async fn non_numeric_fields_are_rejected() {
    let store = MemoryStore::new();
    let app = app(&store);

    let mut body = isc();
    body["plan"] = json!("dos mil");
    let reply = send(&app, "POST", "/carreras", Some(body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({ "error": "Formato de datos inválido" }));

    let mut body = ana();
    body["semestre"] = json!("tercero");
    let reply = send(&app, "POST", "/alumnos", Some(body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    assert_eq!(store.row_count(&Program::TABLE).await, 0);
    assert_eq!(store.row_count(&Student::TABLE).await, 0);
}

#[tokio::test]
async fn non_numeric_replace_leaves_record_untouched() {
    let store = MemoryStore::new();
    let app = app(&store);
    send(&app, "POST", "/carreras", Some(isc())).await;

    let reply = send(
        &app,
        "PUT",
        "/carreras/1",
        Some(json!({ "carrera": "ISC", "descripcionCarrera": "x", "semestres": "nueve", "plan": 1 })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({ "error": "Formato de datos inválido" }));

    let reply = send(&app, "GET", "/carreras/1", None).await;
    assert_eq!(reply.body["descripcionCarrera"], "Ing. en Sistemas");
    assert_eq!(reply.body["semestres"], 9);
}

#[tokio::test]
async fn numeric_strings_are_stored_as_integers() {
    let store = MemoryStore::new();
    let app = app(&store);

    let mut body = isc();
    body["semestres"] = json!("8");
    let reply = send(&app, "POST", "/carreras", Some(body)).await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let reply = send(&app, "GET", "/carreras/1", None).await;
    assert_eq!(reply.body["semestres"], 8);
}

#[tokio::test]
async fn malformed_json_is_invalid_format() {
    let store = MemoryStore::new();
    let request = Request::builder()
        .method("POST")
        .uri("/carreras")
        .header("content-type", "application/json")
        .body(Body::from("{\"carrera\": \"ISC\","))
        .unwrap();

    let reply = send_request(&app(&store), request).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({ "error": "Formato de datos inválido" }));
}

#[tokio::test]
async fn oversized_body_is_a_json_format_error() {
    let store = MemoryStore::new();
    let app = app(&store);
    let padding = "x".repeat(3 * 1024 * 1024);

    for (method, uri) in [("POST", "/carreras"), ("PUT", "/alumnos/1")] {
        let payload = json!({ "nombre": padding, "carrera": "ISC", "semestre": 3, "boleta": "1" });
        let reply = send(&app, method, uri, Some(payload)).await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(reply.body, json!({ "error": "Formato de datos inválido" }));
    }
    assert_eq!(store.row_count(&Program::TABLE).await, 0);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn empty_body_is_missing_fields() {
    let store = MemoryStore::new();
    let reply = send(&app(&store), "POST", "/alumnos", None).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({ "error": "Faltan campos requeridos" }));
}

#[tokio::test]
async fn unknown_ids_are_404() {
    let store = MemoryStore::new();
    let app = app(&store);

    let reply = send(&app, "GET", "/alumnos/99999", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, json!({ "error": "Alumno no encontrado" }));

    let reply = send(&app, "GET", "/carreras/99999", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, json!({ "error": "Carrera no encontrada" }));
}

#[tokio::test]
async fn non_integer_ids_are_404_without_a_connection() {
    let store = MemoryStore::new();
    let app = app(&store);

    for uri in ["/carreras/abc", "/carreras/-1", "/alumnos/1.5"] {
        let reply = send(&app, "GET", uri, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{uri}");
    }
    assert_eq!(store.total_acquired(), 0);
}

#[tokio::test]
async fn replace_updates_only_the_addressed_record() {
    let store = MemoryStore::new();
    let app = app(&store);
    send(&app, "POST", "/alumnos", Some(ana())).await;
    send(
        &app,
        "POST",
        "/alumnos",
        Some(json!({ "nombre": "Luis", "carrera": "IIA", "semestre": 5, "boleta": "2020630002" })),
    )
    .await;

    let reply = send(
        &app,
        "PUT",
        "/alumnos/1",
        Some(json!({ "nombre": "Ana María", "carrera": "LCD", "semestre": "4", "boleta": "2021630001" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({ "message": "Alumno actualizado exitosamente" })
    );

    let first = send(&app, "GET", "/alumnos/1", None).await.body;
    assert_eq!(first["nombre"], "Ana María");
    assert_eq!(first["carrera"], "LCD");
    assert_eq!(first["semestre"], 4);
    assert_eq!(first["idAlumno"], 1);

    let second = send(&app, "GET", "/alumnos/2", None).await.body;
    assert_eq!(second["nombre"], "Luis");
    assert_eq!(second["semestre"], 5);
}

// Replace and delete of an unknown id answer 200 and change nothing. This
// pins the observed behavior; whether it should be a 404 is undecided.
#[tokio::test]
async fn replace_of_unknown_id_succeeds_without_creating() {
    let store = MemoryStore::new();
    let reply = send(&app(&store), "PUT", "/carreras/42", Some(isc())).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({ "message": "Carrera actualizada exitosamente" })
    );
    assert_eq!(store.row_count(&Program::TABLE).await, 0);
}

#[tokio::test]
async fn delete_of_unknown_id_succeeds_without_change() {
    let store = MemoryStore::new();
    let app = app(&store);
    send(&app, "POST", "/carreras", Some(isc())).await;

    let reply = send(&app, "DELETE", "/carreras/99", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({ "message": "Carrera eliminada exitosamente" })
    );
    assert_eq!(store.row_count(&Program::TABLE).await, 1);
}

#[tokio::test]
async fn delete_removes_the_record() {
    let store = MemoryStore::new();
    let app = app(&store);
    send(&app, "POST", "/alumnos", Some(ana())).await;

    let reply = send(&app, "DELETE", "/alumnos/1", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({ "message": "Alumno eliminado exitosamente" })
    );

    let reply = send(&app, "GET", "/alumnos/1", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unavailable_storage_is_500_before_any_query() {
    let store = MemoryStore::new();
    store.set_available(false);
    let app = app(&store);

    let requests = [
        ("GET", "/carreras", None),
        ("POST", "/carreras", Some(isc())),
        ("GET", "/carreras/1", None),
        ("PUT", "/carreras/1", Some(isc())),
        ("DELETE", "/carreras/1", None),
        ("GET", "/alumnos", None),
        ("POST", "/alumnos", Some(ana())),
        ("GET", "/alumnos/1", None),
        ("PUT", "/alumnos/1", Some(ana())),
        ("DELETE", "/alumnos/1", None),
    ];

    for (method, uri, body) in requests {
        let reply = send(&app, method, uri, body).await;
        assert_eq!(
            reply.status,
            StatusCode::INTERNAL_SERVER_ERROR,
            "{method} {uri}"
        );
        assert_eq!(reply.body, json!({ "error": "Error de conexión con la BD" }));
    }

    assert_eq!(store.queries_executed(), 0);
}

#[tokio::test]
async fn unavailable_storage_wins_over_invalid_payload() {
    let store = MemoryStore::new();
    store.set_available(false);

    let reply = send(&app(&store), "POST", "/alumnos", Some(json!({}))).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn storage_failures_surface_raw_text() {
    let store = MemoryStore::new();
    store.fail_queries(Some("Table 'alumnos_escom.alumnos' doesn't exist"));
    let app = app(&store);

    for (method, uri, body) in [
        ("GET", "/alumnos", None),
        ("POST", "/alumnos", Some(ana())),
        ("GET", "/alumnos/1", None),
        ("PUT", "/alumnos/1", Some(ana())),
        ("DELETE", "/alumnos/1", None),
    ] {
        let reply = send(&app, method, uri, body).await;
        assert_eq!(
            reply.status,
            StatusCode::INTERNAL_SERVER_ERROR,
            "{method} {uri}"
        );
        assert_eq!(
            reply.body,
            json!({ "error": "Table 'alumnos_escom.alumnos' doesn't exist" })
        );
    }
}

#[tokio::test]
async fn storage_failures_can_be_redacted() {
    let store = MemoryStore::new();
    store.fail_queries(Some("Access denied for user 'root'@'localhost'"));

    let reply = send(&app_with(&store, true), "GET", "/carreras", None).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, json!({ "error": "Error interno de la BD" }));
}

#[tokio::test]
async fn every_connection_is_released() {
    let store = MemoryStore::new();
    let app = app(&store);

    send(&app, "POST", "/carreras", Some(isc())).await;
    send(&app, "GET", "/carreras", None).await;
    send(&app, "GET", "/carreras/1", None).await;
    send(&app, "GET", "/carreras/7", None).await;
    send(&app, "POST", "/carreras", Some(json!({ "carrera": "ISC" }))).await;
    send(&app, "PUT", "/carreras/1", Some(json!({ "semestres": "x" }))).await;
    send(&app, "PUT", "/carreras/1", Some(isc())).await;
    store.fail_queries(Some("Lost connection to MySQL server during query"));
    send(&app, "DELETE", "/carreras/1", None).await;
    store.fail_queries(None);
    send(&app, "DELETE", "/carreras/1", None).await;

    assert_eq!(store.total_acquired(), 9);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn health_reports_database_state() {
    let store = MemoryStore::new();
    let app = app(&store);

    let reply = send(&app, "GET", "/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "ok");
    assert_eq!(reply.body["database"], "up");

    store.set_available(false);
    let reply = send(&app, "GET", "/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["database"], "down");
}
