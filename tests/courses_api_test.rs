use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use courses_api::{api::router, db, state::AppState};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn setup_app() -> Router {
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to create database");
    router(AppState::new(pool), "/api")
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, value)
}

fn calculus() -> Value {
    json!({
        "code": "MAT101",
        "name": "Calculus I",
        "credits": 8,
        "careerId": 5,
        "semester": 1
    })
}

#[tokio::test]
async fn test_course_lifecycle() {
    let app = setup_app().await;

    let (status, created) = send(&app, Method::POST, "/api/courses", Some(calculus())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("id missing");
    assert_eq!(created["status"], "active");
    assert_eq!(created["theoreticalHours"], 0);
    assert_eq!(created["practicalHours"], 0);
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let (status, by_code) = send(&app, Method::GET, "/api/courses/code/MAT101", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_code, created);

    let (status, error) = send(&app, Method::POST, "/api/courses", Some(calculus())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "Ya existe un curso con el codigo: MAT101");

    let (status, deleted) = send(&app, Method::DELETE, &format!("/api/courses/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id);
    assert_eq!(deleted["message"], "Curso eliminado exitosamente");

    let (status, _) = send(&app, Method::GET, &format!("/api/courses/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/courses/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_career_stats() {
    let app = setup_app().await;

    let (status, stats) = send(&app, Method::GET, "/api/courses/stats/career/5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({ "careerId": 5, "activeCount": 0, "totalCredits": 0 })
    );

    send(&app, Method::POST, "/api/courses", Some(calculus())).await;
    send(
        &app,
        Method::POST,
        "/api/courses",
        Some(json!({ "code": "FIS101", "name": "Physics I", "credits": 6, "careerId": 5 })),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/api/courses",
        Some(json!({
            "code": "HIS101", "name": "History", "credits": 4, "careerId": 5, "status": "inactive"
        })),
    )
    .await;

    let (_, stats) = send(&app, Method::GET, "/api/courses/stats/career/5", None).await;
    assert_eq!(
        stats,
        json!({ "careerId": 5, "activeCount": 2, "totalCredits": 14 })
    );
}

#[tokio::test]
async fn test_update_course() {
    let app = setup_app().await;
    let (_, created) = send(&app, Method::POST, "/api/courses", Some(calculus())).await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/courses/{id}"),
        Some(json!({
            "code": "MAT101",
            "name": "Calculus I (revised)",
            "credits": 10,
            "practicalHours": 2,
            "status": "inactive"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["name"], "Calculus I (revised)");
    assert_eq!(updated["credits"], 10);
    assert_eq!(updated["practicalHours"], 2);
    assert_eq!(updated["careerId"], Value::Null);
    assert_eq!(updated["status"], "inactive");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, _) = send(&app, Method::PUT, "/api/courses/999", Some(calculus())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, error) = send(
        &app,
        Method::PUT,
        &format!("/api/courses/{id}"),
        Some(json!({ "code": "MAT101", "name": "Calculus", "credits": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"][0]["field"], "credits");
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = setup_app().await;

    let (status, error) = send(
        &app,
        Method::POST,
        "/api/courses",
        Some(json!({ "code": "", "name": "Sin codigo", "semester": 13 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = error["details"]
        .as_array()
        .expect("details missing")
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["code", "credits", "semester"]);
    assert!(error["error"].as_str().unwrap().contains("Los creditos son obligatorios"));

    let (status, error) = send(
        &app,
        Method::POST,
        "/api/courses",
        Some(json!({ "code": "MAT101", "name": "Calculus", "credits": "eight" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].is_string());

    let (_, all) = send(&app, Method::GET, "/api/courses", None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_filters_and_search() {
    let app = setup_app().await;
    for body in [
        calculus(),
        json!({
            "code": "MAT201", "name": "Calculus II", "credits": 8, "careerId": 5, "semester": 2
        }),
        json!({
            "code": "FIS101", "name": "Physics I", "credits": 6, "careerId": 7, "semester": 1
        }),
        json!({
            "code": "HIS101", "name": "History", "credits": 4, "careerId": 5, "semester": 1,
            "status": "inactive"
        }),
    ] {
        let (status, _) = send(&app, Method::POST, "/api/courses", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let codes = |value: Value| -> Vec<String> {
        value
            .as_array()
            .expect("expected array")
            .iter()
            .map(|c| c["code"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, all) = send(&app, Method::GET, "/api/courses", None).await;
    assert_eq!(codes(all), vec!["MAT101", "MAT201", "FIS101", "HIS101"]);

    let (_, career) = send(&app, Method::GET, "/api/courses/career/5", None).await;
    assert_eq!(codes(career), vec!["MAT101", "MAT201", "HIS101"]);

    let (_, semester) = send(&app, Method::GET, "/api/courses/semester/1", None).await;
    assert_eq!(codes(semester), vec!["MAT101", "FIS101", "HIS101"]);

    let (_, both) = send(&app, Method::GET, "/api/courses/career/5/semester/1", None).await;
    assert_eq!(codes(both), vec!["MAT101", "HIS101"]);

    let (_, active) = send(&app, Method::GET, "/api/courses/active", None).await;
    assert_eq!(codes(active), vec!["MAT101", "MAT201", "FIS101"]);

    let (status, found) = send(&app, Method::GET, "/api/courses/search?name=CALC", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(codes(found), vec!["MAT101", "MAT201"]);

    let (status, _) = send(&app, Method::GET, "/api/courses/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_base_path() {
    let app = setup_app().await;

    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/courses", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let pool = db::connect_in_memory()
        .await
        .expect("Failed to create database");
    let root_app = router(AppState::new(pool), "");
    let (status, courses) = send(&root_app, Method::GET, "/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(courses, json!([]));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_app().await;

    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "API REST - Sistema de Cursos");

    let paths = doc["paths"].as_object().expect("paths missing");
    assert!(paths.contains_key("/health"));
    assert!(paths.contains_key("/api/courses/{id}"));
    assert!(paths["/api/courses"]["post"].is_object());
    assert!(paths["/api/courses/{id}"]["delete"].is_object());
}
