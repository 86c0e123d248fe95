//! Router tests against an in-memory bucket.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use clap::Parser;
use gallery_core::validation::MAX_FILE_SIZE;
use gallery_core::{InMemoryStore, ListingService, Storage};
use gallery_web::{router, with_layers, AppState, Config};
use http_body_util::BodyExt;
use tower::ServiceExt;

const BOUNDARY: &str = "gallery-test-boundary";

fn test_config() -> Config {
    Config::try_parse_from([
        "gallery-web",
        "--bucket",
        "test-bucket",
        "--region",
        "eu-west-1",
        "--secret-key",
        "test-secret",
    ])
    .unwrap()
}

fn app_with(store: Arc<InMemoryStore>) -> Router {
    router(AppState::with_store(test_config(), store))
}

async fn body_to_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    Request::post("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("file", filename, content)))
        .unwrap()
}

/// `name=value` part of the flash cookie set by a response.
fn flash_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("flash cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn follow_with_cookie(app: Router, location: &str, cookie: &str) -> String {
    let response = app
        .oneshot(
            Request::get(location)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_to_string(response).await
}

#[tokio::test]
async fn upload_then_serve_round_trip() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    let app = app_with(store.clone());
    let payload = b"GIF89a-fake-image-bytes";

    let response = app
        .clone()
        .oneshot(upload_request("party time.gif", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    let cookie = flash_cookie(&response);

    let keys = store.keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].ends_with("_party_time.gif"), "{}", keys[0]);

    let page = follow_with_cookie(app.clone(), "/", &cookie).await;
    assert!(page.contains("File uploaded successfully!"));
    assert!(page.contains(&format!("/image/{}", keys[0])));

    let response = app
        .oneshot(
            Request::get(format!("/image/{}", keys[0]))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/gif");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=3600"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), payload);
}

#[tokio::test]
async fn invalid_extension_redirects_back_with_message() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    let app = app_with(store.clone());

    let response = app
        .clone()
        .oneshot(upload_request("malware.exe", b"MZ"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/upload");
    assert_eq!(store.call_count(), 0);

    let page = follow_with_cookie(app, "/upload", &flash_cookie(&response)).await;
    assert!(page.contains("Invalid file type. Please upload PNG, JPG, JPEG, GIF, or WebP files."));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    let app = app_with(store.clone());
    let content = vec![0u8; MAX_FILE_SIZE + 1];

    let response = app
        .clone()
        .oneshot(upload_request("huge.png", &content))
        .await
        .unwrap();

    assert_eq!(response.headers()[header::LOCATION], "/upload");
    assert_eq!(store.write_count(), 0);

    let page = follow_with_cookie(app, "/upload", &flash_cookie(&response)).await;
    assert!(page.contains("File too large. Maximum size is 16MB."));
}

#[tokio::test]
async fn upload_at_exact_ceiling_is_accepted() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    let content = vec![0u8; MAX_FILE_SIZE];

    let response = app_with(store.clone())
        .oneshot(upload_request("exact.webp", &content))
        .await
        .unwrap();

    assert_eq!(response.headers()[header::LOCATION], "/");
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn missing_file_part_is_reported() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    let app = app_with(store.clone());

    let request = Request::post("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("other", "cat.png", b"x")))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers()[header::LOCATION], "/upload");
    let page = follow_with_cookie(app.clone(), "/upload", &flash_cookie(&response)).await;
    assert!(page.contains("No file selected"));

    let request = Request::post("/upload")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("file=cat.png"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers()[header::LOCATION], "/upload");
    let page = follow_with_cookie(app, "/upload", &flash_cookie(&response)).await;
    assert!(page.contains("No file selected"));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn empty_filename_is_reported() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    let app = app_with(store.clone());

    let response = app.clone().oneshot(upload_request("", b"x")).await.unwrap();

    let page = follow_with_cookie(app, "/upload", &flash_cookie(&response)).await;
    assert!(page.contains("No file selected"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn storage_failure_surfaces_message() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    store.fail_with("AccessDenied");
    let app = app_with(store.clone());

    let response = app.clone().oneshot(upload_request("cat.png", b"x")).await.unwrap();

    assert_eq!(response.headers()[header::LOCATION], "/upload");
    let page = follow_with_cookie(app, "/upload", &flash_cookie(&response)).await;
    assert!(page.contains("Upload failed: AccessDenied"));
}

#[tokio::test]
async fn gallery_lists_only_images() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    store.insert("a.jpg", vec![1, 2, 3], Some("image/jpeg"));
    store.insert("b.txt", vec![4], Some("text/plain"));
    store.insert("c.png", vec![5], Some("image/png"));

    let response = app_with(store)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_to_string(response).await;
    assert!(page.contains("/image/a.jpg"));
    assert!(page.contains("/image/c.png"));
    assert!(!page.contains("b.txt"));
    assert!(page.contains("2 images"));
}

#[tokio::test]
async fn gallery_renders_when_listing_fails() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    store.fail_with("network unreachable");

    let response = app_with(store)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_to_string(response).await.contains("No images yet"));
}

#[tokio::test]
async fn image_proxy_status_codes() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    store.insert("albums/2024/beach.png", vec![9, 9], None);
    let app = app_with(store.clone());

    let response = app
        .clone()
        .oneshot(Request::get("/image/albums/2024/beach.png").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");

    let response = app
        .clone()
        .oneshot(Request::get("/image/missing.png").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_to_string(response).await, "Image not found");

    store.fail_with("InternalError");
    let response = app
        .oneshot(Request::get("/image/albums/2024/beach.png").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_to_string(response).await, "Server error");
}

#[tokio::test]
async fn listed_urls_with_reserved_characters_resolve() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    store.insert("what?.png", vec![1], Some("image/png"));
    store.insert("a%20b.png", vec![2], Some("image/png"));
    store.insert("trips/#1 day.webp", vec![3], Some("image/webp"));
    let app = app_with(store.clone());

    let images = ListingService::new(Storage::new(store)).list_images().await;
    assert_eq!(images.len(), 3);

    for image in images {
        let response = app
            .clone()
            .oneshot(Request::get(image.url.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", image.url);

        let expected: &[u8] = match image.filename.as_str() {
            "what?.png" => &[1],
            "a%20b.png" => &[2],
            _ => &[3],
        };
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], expected, "{}", image.url);
    }
}

#[tokio::test]
async fn image_proxy_without_client_is_server_error() {
    let app = router(AppState::with_storage(
        test_config(),
        Storage::unavailable("half-configured credentials"),
    ));

    let response = app
        .oneshot(Request::get("/image/a.png").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_to_string(response).await, "S3 client error");
}

#[tokio::test]
async fn health_reflects_live_listing() {
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    let app = app_with(store.clone());

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_to_string(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["bucket"], "test-bucket");

    store.fail_with("ExpiredToken");
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body_to_string(response).await).unwrap();
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["message"], "Health check failed: ExpiredToken");
}

#[tokio::test]
async fn health_without_bucket_is_unhealthy() {
    let store = Arc::new(InMemoryStore::without_bucket("test-bucket"));

    let response = app_with(store)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_without_client_is_unhealthy() {
    let app = router(AppState::with_storage(
        test_config(),
        Storage::unavailable("bucket name is empty"),
    ));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body_to_string(response).await).unwrap();
    assert_eq!(json["message"], "S3 client initialization failed");
}

#[tokio::test]
async fn info_reports_static_metadata() {
    let response = app_with(Arc::new(InMemoryStore::new("test-bucket")))
        .oneshot(Request::get("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_to_string(response).await).unwrap();
    assert_eq!(json["app_name"], "S3 Gallery");
    assert!(json["version"].is_string());
    assert_eq!(json["bucket"], "test-bucket");
    assert_eq!(json["region"], "eu-west-1");
    assert_eq!(json["max_file_size_mb"], 16);
    assert_eq!(
        json["allowed_extensions"],
        serde_json::json!(["png", "jpg", "jpeg", "gif", "webp"])
    );
}

#[tokio::test]
async fn unknown_route_renders_404_page() {
    let response = app_with(Arc::new(InMemoryStore::new("test-bucket")))
        .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_to_string(response).await.contains("<h1>404</h1>"));
}

async fn explode() -> &'static str {
    panic!("kaboom in handler")
}

async fn panicking_request(debug: bool) -> (StatusCode, String) {
    let app = with_layers(Router::new().route("/explode", get(explode)), debug);
    let response = app
        .oneshot(Request::get("/explode").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_string(response).await)
}

#[tokio::test]
async fn handler_panic_renders_500_page() {
    let (status, body) = panicking_request(false).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("<h1>500</h1>"));
    assert!(!body.contains("kaboom in handler"));
}

#[tokio::test]
async fn handler_panic_shows_detail_in_debug_mode() {
    let (status, body) = panicking_request(true).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("<h1>500</h1>"));
    assert!(body.contains("kaboom in handler"));
}

#[tokio::test]
async fn responses_allow_cross_origin_access() {
    let app = app_with(Arc::new(InMemoryStore::new("test-bucket")));

    let response = app
        .clone()
        .oneshot(
            Request::get("/info")
                .header(header::ORIGIN, "https://elsewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let response = app
        .oneshot(
            Request::options("/upload")
                .header(header::ORIGIN, "https://elsewhere.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    for method in ["GET", "PUT", "POST", "DELETE", "OPTIONS"] {
        assert!(methods.contains(method), "{methods}");
    }
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "*"
    );
}
