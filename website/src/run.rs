use axum::Router;
use axum::extract::FromRef;
use snafu::ResultExt;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

use crate::Result;
use crate::config::Config;
use crate::error::{ServeSnafu, ServerBindSnafu};
use crate::services::catalog::{CatalogClient, CatalogSearch};
use crate::web::all_routes;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<dyn CatalogSearch>,
}

pub fn create_app_state(config: Config) -> Result<AppState> {
    let catalog = CatalogClient::new(&config.catalog.base_url, config.catalog.timeout())?;
    Ok(AppState {
        config: Arc::new(config),
        catalog: Arc::new(catalog),
    })
}

pub async fn run(config: Config) -> Result<()> {
    let port = config.server.port;
    let assets_dir = config.server.assets_dir.clone();
    let state = create_app_state(config)?;

    let routes_all = Router::new().merge(all_routes(state, &assets_dir)).layer(
        ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        ),
    );

    // Setup the server
    let ip = "127.0.0.1";
    let addr = format!("{}:{}", ip, port);
    info!("HTTP Server running on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .context(ServerBindSnafu { addr: addr.clone() })?;
    axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(ServeSnafu)?;

    info!("HTTP Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
pub fn create_test_app_state(
    catalog: Arc<crate::services::catalog::CatalogTestClient>,
) -> AppState {
    use std::path::PathBuf;

    use crate::config::{CatalogConfig, ServerConfig};

    let config = Config {
        server: ServerConfig {
            port: 43700,
            assets_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
        },
        catalog: CatalogConfig::new("http://localhost/api/3/action"),
    };

    AppState {
        config: Arc::new(config),
        catalog,
    }
}
