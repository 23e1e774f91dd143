use axum::handler::HandlerWithoutStateExt;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, get_service};
use axum::{Router, middleware};
use std::path::Path;
use tower_http::services::ServeDir;
use tracing::error;

use crate::Error;
use crate::error::ErrorInfo;
use crate::run::AppState;

use super::{index_handler, liveness_handler};

pub fn all_routes(state: AppState, assets_dir: &Path) -> Router {
    Router::new()
        .merge(catalog_routes(state))
        .merge(assets_routes(assets_dir))
        .fallback(any(not_found_handler))
        .layer(middleware::map_response(response_mapper))
}

fn catalog_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health/liveness", get(liveness_handler))
        .with_state(state)
}

pub fn assets_routes(assets_dir: &Path) -> Router {
    Router::new().nest_service(
        "/assets",
        get_service(
            ServeDir::new(assets_dir.join("assets"))
                .not_found_service(file_not_found.into_service()),
        ),
    )
}

async fn file_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "File not found")
}

async fn not_found_handler() -> Error {
    Error::NotFound {
        msg: "Not found".to_string(),
    }
}

/// Renders errors as plain text, logging the server-side ones.
async fn response_mapper(res: Response) -> Response {
    let error = res.extensions().get::<ErrorInfo>();
    if let Some(e) = error {
        if e.status_code.is_server_error() {
            error!("{}", e.message);
            if let Some(bt) = &e.backtrace {
                error!("{}", bt);
            }
        }

        return (
            e.status_code,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            e.message.clone(),
        )
            .into_response();
    }
    res
}
