//! Router-level tests for the upload endpoints, driven with `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::util::ServiceExt;

use pdfcompare_core::mock::{MockBackend, MockResponse};
use pdfcompare_web::config::Role;
use pdfcompare_web::state::Mount;

const BOUNDARY: &str = "TEST_BOUNDARY";
const LIMIT: usize = 64 * 1024;

fn app_with(backend: Arc<MockBackend>) -> Router {
    app_with_limit(backend, LIMIT)
}

fn app_with_limit(backend: Arc<MockBackend>, limit: usize) -> Router {
    pdfcompare_web::router(Role::Local, vec![Mount::new("/pdf-pig", backend)], limit)
}

/// One multipart part: `(field name, optional file name, content)`.
type PartSpec<'a> = (&'a str, Option<&'a str>, &'a str);

fn multipart_body(parts: &[PartSpec<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[PartSpec<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/pdf-pig")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = body::to_bytes(resp.into_body(), LIMIT).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn successful_upload_returns_uniform_shape() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Text("A\n\nB".into())));
    let resp = app_with(spy.clone())
        .oneshot(upload_request(&[("file", Some("sample.pdf"), "%PDF-1.4")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["text"], "A\n\nB");
    assert_eq!(json["pages"], 0);
    assert_eq!(json["filename"], "sample.pdf");
    assert!(json["error"].is_null());
    assert_eq!(spy.call_count(), 1);
}

#[tokio::test]
async fn non_multipart_is_rejected_without_calling_backend() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Text("unused".into())));
    let req = Request::builder()
        .method("POST")
        .uri("/pdf-pig")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let resp = app_with(spy.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "Expected multipart/form-data with a file field."
    );
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn missing_content_type_is_rejected() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Text("unused".into())));
    let req = Request::builder()
        .method("POST")
        .uri("/pdf-pig")
        .body(Body::from("raw bytes"))
        .unwrap();

    let resp = app_with(spy.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn no_file_part_is_rejected() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Text("unused".into())));
    let resp = app_with(spy.clone())
        .oneshot(upload_request(&[("note", None, "just a form value")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(
        json,
        serde_json::json!({ "success": false, "error": "No file provided." })
    );
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn empty_file_is_rejected() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Text("unused".into())));
    let resp = app_with(spy.clone())
        .oneshot(upload_request(&[("file", Some("empty.pdf"), "")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "File is empty.");
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn file_field_is_preferred_over_other_file_parts() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Echo));
    let resp = app_with(spy.clone())
        .oneshot(upload_request(&[
            ("attachment", Some("other.pdf"), "other"),
            ("file", Some("wanted.pdf"), "wanted"),
        ]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["text"], "wanted");
    assert_eq!(json["filename"], "wanted.pdf");
    assert_eq!(spy.file_names(), vec!["wanted.pdf".to_string()]);
}

#[tokio::test]
async fn first_file_part_is_used_when_no_file_field() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Echo));
    let resp = app_with(spy.clone())
        .oneshot(upload_request(&[
            ("comment", None, "ignored"),
            ("document", Some("doc.pdf"), "first"),
            ("extra", Some("extra.pdf"), "second"),
        ]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["text"], "first");
    assert_eq!(json["filename"], "doc.pdf");
}

#[tokio::test]
async fn backend_failure_is_rendered_as_400_envelope() {
    let spy = Arc::new(MockBackend::new(
        "spy",
        MockResponse::Reported("X".into()),
    ));
    let resp = app_with(spy)
        .oneshot(upload_request(&[("file", Some("a.pdf"), "%PDF")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(
        json,
        serde_json::json!({
            "success": false,
            "text": null,
            "pages": 0,
            "filename": null,
            "error": "PDF extraction failed: X",
        })
    );
}

#[tokio::test]
async fn empty_extraction_is_never_success() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Empty));
    let resp = app_with(spy)
        .oneshot(upload_request(&[("file", Some("blank.pdf"), "%PDF")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["success"], false);
    assert!(json["text"].is_null());
}

#[tokio::test]
async fn timeout_message_is_preserved() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Timeout));
    let resp = app_with(spy)
        .oneshot(upload_request(&[("file", Some("big.pdf"), "%PDF")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(
        json["error"],
        "PDF extraction timed out. The file may be too large or the service is unavailable."
    );
}

#[tokio::test]
async fn dropping_the_request_cancels_the_backend() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::UntilCancelled));
    let app = app_with(spy.clone());

    // The handler never finishes on its own; give up on it like a
    // disconnecting client would.
    let outcome = tokio::time::timeout(
        Duration::from_millis(200),
        app.oneshot(upload_request(&[("file", Some("slow.pdf"), "%PDF")])),
    )
    .await;
    assert!(outcome.is_err());
    assert_eq!(spy.call_count(), 1);

    let tokens = spy.tokens();
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_cancelled());
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Text("unused".into())));
    let big = "x".repeat(8 * 1024);
    let resp = app_with_limit(spy.clone(), 1024)
        .oneshot(upload_request(&[("file", Some("big.pdf"), &big)]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn health_reports_ok() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Empty));
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let resp = app_with(spy).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "ok");
}

#[tokio::test]
async fn index_lists_mounted_routes() {
    let spy = Arc::new(MockBackend::new("spy", MockResponse::Empty));
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();

    let resp = app_with(spy).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["role"], "local");
    assert!(json["endpoints"]["/pdf-pig"].as_str().unwrap().contains("spy"));
    assert!(json["endpoints"]["/health"].is_string());
}
