pub mod jobs;
pub mod meta;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use jobs::job_routes;
use meta::meta_routes;

/// Full application router with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config.client_url.as_deref());

    Router::new()
        .merge(meta_routes())
        .merge(job_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(client_url: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match client_url.map(|url| url.parse::<HeaderValue>()) {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Ignoring unparsable CLIENT_URL, allowing any origin");
            base.allow_origin(Any)
        }
        None => base.allow_origin(Any),
    }
}
