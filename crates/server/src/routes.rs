//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use pinmark_core::config::MARKED_IMAGES_ROUTE;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let image_routes = Router::new()
        .route("/getimageinfo/", post(handlers::get_image_info))
        .route("/putmarkonimage/", post(handlers::put_mark_on_image))
        .route("/images", get(handlers::list_images))
        .route("/images/{filename}", delete(handlers::delete_image))
        .route(
            &format!("{MARKED_IMAGES_ROUTE}/{{filename}}"),
            get(handlers::get_marked_image),
        );

    // Static segments win over `{id}`, so `init` never parses as an id.
    let record_routes = Router::new()
        .route("/populate", post(handlers::populate_records))
        .route("/images/init", post(handlers::initialize_records))
        .route(
            "/images",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/images/{id}",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        );

    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .merge(image_routes)
        .nest("/db", record_routes);

    // When enabled, restrict /metrics to scrapers at the network level.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    let body_limit = state.config.server.max_upload_bytes;
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins. `*` allows any origin; unparsable
/// entries are logged and skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
