use std::any::Any;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::SignedCookieJar;
use gallery_core::proxy::CACHE_CONTROL;
use gallery_core::upload::validate_filename;
use gallery_core::validation::{max_file_size_mb, ALLOWED_EXTENSIONS, MAX_FILE_SIZE};
use gallery_core::{ProxyError, UploadError, UploadedFile};
use serde::Serialize;

use crate::flash::{self, Flash};
use crate::pages;
use crate::state::AppState;

pub const APP_NAME: &str = "S3 Gallery";

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Gallery page
pub async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    let images = state.listing.list_images().await;

    tracing::info!("Gallery page request: {} images", images.len());
    (jar, Html(pages::gallery_html(&images, flash.as_ref())))
}

/// Upload form
pub async fn upload_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, Html(pages::upload_html(flash.as_ref())))
}

/// Upload submission: redirect to the gallery on success, back to the form otherwise
pub async fn upload(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> (SignedCookieJar, Redirect) {
    let result = match multipart {
        Ok(multipart) => match read_upload(multipart).await {
            Ok(file) => state.uploads.upload(file).await,
            Err(e) => Err(e),
        },
        Err(rejection) => {
            tracing::debug!("Upload request without multipart body: {}", rejection);
            Err(UploadError::NoFile)
        }
    };

    match result {
        Ok(uploaded) => {
            tracing::info!("Upload stored: key={}", uploaded.key);
            (
                flash::set(jar, Flash::success("File uploaded successfully!")),
                Redirect::to("/"),
            )
        }
        Err(e) => {
            if e.is_validation() {
                tracing::info!("Upload rejected: {}", e);
            } else {
                tracing::error!("Upload failed: {:?}", e);
            }
            (flash::set(jar, Flash::error(e.to_string())), Redirect::to("/upload"))
        }
    }
}

/// Pull the `file` part out of the form, checking the filename before reading
/// any bytes and stopping as soon as the ceiling is passed.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, UploadError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        validate_filename(&filename)?;

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > MAX_FILE_SIZE {
                return Err(UploadError::TooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile {
            filename,
            data: Bytes::from(data),
        });
    }

    Err(UploadError::NoFile)
}

fn multipart_error(err: MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge
    } else {
        UploadError::Io(err.body_text())
    }
}

/// Get image from S3
pub async fn get_image(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    tracing::info!("Image request: key={}", key);

    match state.proxy.fetch(&key).await {
        Ok(image) => {
            tracing::debug!(
                "Serving image: key={}, content_type={}, size={} bytes",
                key,
                image.content_type,
                image.data.len()
            );
            (
                [
                    (header::CONTENT_TYPE, image.content_type.as_str()),
                    (header::CACHE_CONTROL, CACHE_CONTROL),
                ],
                image.data,
            )
                .into_response()
        }
        Err(ProxyError::NotFound) => {
            tracing::info!("Image not found: key={}", key);
            (StatusCode::NOT_FOUND, ProxyError::NotFound.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Error serving image {}: {:?}", key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub bucket: String,
}

/// Healthy only when a live listing call against the bucket succeeds
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let bucket = state.config.bucket.clone();

    let store = match state.storage.client() {
        Ok(store) => store,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy",
                    message: "S3 client initialization failed".to_string(),
                    bucket,
                }),
            );
        }
    };

    match store.probe().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                message: "Application and S3 connection working".to_string(),
                bucket,
            }),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy",
                    message: format!("Health check failed: {e}"),
                    bucket,
                }),
            )
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub app_name: &'static str,
    pub version: &'static str,
    pub bucket: String,
    pub region: String,
    pub allowed_extensions: Vec<&'static str>,
    pub max_file_size_mb: usize,
}

pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        app_name: APP_NAME,
        version: env!("CARGO_PKG_VERSION"),
        bucket: state.config.bucket.clone(),
        region: state.config.region.clone(),
        allowed_extensions: ALLOWED_EXTENSIONS.to_vec(),
        max_file_size_mb: max_file_size_mb(),
    })
}

pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(pages::not_found_html()))
}

/// Turn a handler panic into the 500 page. Panic details are only shown in
/// debug mode.
pub fn panic_response(err: Box<dyn Any + Send + 'static>, debug: bool) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!("Request handler panicked: {}", detail);

    let page = pages::server_error_html(debug.then_some(detail.as_str()));
    (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
}
