//! Route tests against the in-memory engine.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use engine::MemoryEngine;
use insight_gateway::{Assets, Gateway, router};
use serde_json::{Value, json};
use tower::ServiceExt;

const LIMIT: usize = 1024 * 1024;

fn app() -> Router {
    router(Gateway::new(MemoryEngine::new(), Assets::disabled()), LIMIT)
}

fn rooms() -> Vec<u8> {
    json!([
        { "number": "101", "furniture": "Tables", "seats": 20 },
        { "number": "110", "furniture": "Chairs", "seats": 120 },
        { "number": "201", "furniture": "Tables", "seats": 20 },
        { "number": "301", "furniture": "Moveable", "seats": 45 },
    ])
    .to_string()
    .into_bytes()
}

fn put(id: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/dataset/{id}"))
        .body(body.into())
        .unwrap()
}

fn delete(id: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/dataset/{id}"))
        .body(Body::empty())
        .unwrap()
}

fn query(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<Value>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).unwrap())
    };
    (status, body)
}

fn rooms_query() -> Value {
    json!({
        "WHERE": { "EQ": { "rooms_seats": 20 } },
        "OPTIONS": {
            "COLUMNS": ["rooms_number", "rooms_furniture", "rooms_seats"],
            "ORDER": "rooms_seats",
            "FORM": "TABLE"
        }
    })
}

#[tokio::test]
async fn index_returns_ok() {
    let app = app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_none());
}

#[tokio::test]
async fn put_new_then_existing() {
    let app = app();

    let (status, body) = send(&app, put("rooms", rooms())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_none());

    let (status, body) = send(&app, put("rooms", rooms())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.is_none());
}

#[tokio::test]
async fn put_invalid_archive_is_bad_request_in_any_state() {
    let app = app();
    let invalid = b"PK\x03\x04 not an archive".to_vec();

    let (status, body) = send(&app, put("rooms", invalid.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["error"].is_string());

    send(&app, put("rooms", rooms())).await;
    let (status, _) = send(&app, put("rooms", invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The rejected replacement left the dataset in place.
    let (status, _) = send(&app, put("rooms", rooms())).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn put_empty_body_is_bad_request() {
    let app = app();
    let (status, body) = send(&app, put("rooms", Body::empty())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["error"], "missing dataset content");
}

#[tokio::test]
async fn put_multipart_uses_body_field() {
    let app = app();
    let boundary = "insight-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\r\n\
             ignored\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"body\"; filename=\"rooms.zip\"\r\n\
             Content-Type: application/zip\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&rooms());
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method("PUT")
        .uri("/dataset/rooms")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, query(rooms_query().to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["result"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn multipart_without_file_is_bad_request() {
    let app = app();
    let boundary = "insight-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\r\n\
         nothing here\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("PUT")
        .uri("/dataset/rooms")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_upload_is_bad_request() {
    let app = router(Gateway::new(MemoryEngine::new(), Assets::disabled()), 16);
    let (status, body) = send(&app, put("rooms", rooms())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["error"].is_string());
}

#[tokio::test]
async fn delete_existing_then_missing() {
    let app = app();
    send(&app, put("rooms", rooms())).await;

    let (status, body) = send(&app, delete("rooms")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_none());

    for _ in 0..3 {
        let (status, body) = send(&app, delete("rooms")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.unwrap()["error"].is_string());
    }
}

#[tokio::test]
async fn delete_never_added_is_not_found() {
    let app = app();
    let (status, _) = send(&app, delete("courses")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_id_is_a_decode_error() {
    let app = app();
    for uri in ["/dataset/", "/dataset"] {
        let request = Request::builder()
            .method("PUT")
            .uri(uri)
            .body(Body::from(rooms()))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "PUT {uri}");
        assert_eq!(body, Some(json!({ "error": "missing dataset id" })));

        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
        assert_eq!(body, Some(json!({ "error": "missing dataset id" })));
    }

    // Nothing was stored under an empty id.
    let request = Request::builder().uri("/datasets").body(Body::empty()).unwrap();
    let (_, body) = send(&app, request).await;
    assert_eq!(body, Some(json!({ "result": [] })));
}

#[tokio::test]
async fn put_after_delete_creates_again() {
    let app = app();
    send(&app, put("rooms", rooms())).await;
    send(&app, delete("rooms")).await;
    let (status, _) = send(&app, put("rooms", rooms())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn query_returns_matching_rows() {
    let app = app();
    send(&app, put("rooms", rooms())).await;

    let (status, body) = send(&app, query(rooms_query().to_string())).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    let result = body["result"].as_array().unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|row| row["rooms_seats"] == 20));
}

#[tokio::test]
async fn query_missing_options_is_bad_request() {
    let app = app();
    send(&app, put("rooms", rooms())).await;

    let document = json!({ "WHERE": { "EQ": { "rooms_seats": 20 } } });
    let (status, body) = send(&app, query(document.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["error"].is_string());
}

#[tokio::test]
async fn query_unknown_dataset_is_failed_dependency() {
    let app = app();
    send(&app, put("rooms", rooms())).await;

    let document = json!({
        "WHERE": { "GT": { "dogs_pass": 9 } },
        "OPTIONS": {
            "COLUMNS": ["courses_dept", "courses_pass"],
            "ORDER": "courses_pass",
            "FORM": "TABLE"
        }
    });
    let (status, body) = send(&app, query(document.to_string())).await;
    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    assert!(body.unwrap()["error"].is_string());
}

#[tokio::test]
async fn query_after_delete_is_failed_dependency() {
    let app = app();
    send(&app, put("rooms", rooms())).await;
    send(&app, delete("rooms")).await;

    let (status, _) = send(&app, query(rooms_query().to_string())).await;
    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
}

#[tokio::test]
async fn undecodable_queries_are_bad_request() {
    let app = app();
    for body in ["", "{", "[]", "{}", "42", "\"WHERE\""] {
        let (status, response) = send(&app, query(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert!(response.unwrap()["error"].is_string());
    }
}

#[tokio::test]
async fn list_reports_loaded_datasets() {
    let app = app();
    send(&app, put("rooms", rooms())).await;

    let request = Request::builder()
        .uri("/datasets")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.unwrap(),
        json!({ "result": [{ "id": "rooms", "records": 4 }] })
    );
}
