pub mod config;
pub mod flash;
pub mod handlers;
pub mod pages;
pub mod state;

use axum::{extract::DefaultBodyLimit, http::Method, routing::get, Router};
use gallery_core::validation::MAX_FILE_SIZE;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

pub use crate::config::Config;
pub use crate::state::AppState;

/// Request body ceiling for uploads: the file limit plus room for the
/// multipart framing.
pub const MAX_UPLOAD_BODY: usize = MAX_FILE_SIZE + 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let debug = state.config.debug;

    let routes = Router::new()
        .route("/", get(handlers::index))
        .route(
            "/upload",
            get(handlers::upload_form)
                .post(handlers::upload)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY)),
        )
        .route("/image/*key", get(handlers::get_image))
        .route("/health", get(handlers::health))
        .route("/info", get(handlers::info))
        .fallback(handlers::not_found)
        .with_state(state);

    with_layers(routes, debug)
}

/// Cross-cutting layers: panics become the 500 page, CORS, request tracing.
pub fn with_layers(routes: Router, debug: bool) -> Router {
    routes
        .layer(CatchPanicLayer::custom(
            move |err: Box<dyn std::any::Any + Send + 'static>| handlers::panic_response(err, debug),
        ))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// The gallery's client-side code may be served from another origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(cors::Any)
}
