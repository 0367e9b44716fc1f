use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use aide::openapi::{Info, OpenApi};
use axum::{Extension, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::commentary::CommentaryPipeline;
use crate::persona::PersonaCatalog;
use crate::routes;
use crate::types::{AppConfig, Environment};

/// Margin on top of the outbound timeout; one request makes up to three upstream calls
const REQUEST_TIMEOUT_FACTOR: u32 = 3;

/// Builds the application router with all shared state attached
#[must_use]
pub fn router(
    environment: Environment,
    config: Arc<AppConfig>,
    pipeline: Arc<CommentaryPipeline>,
    catalog: Arc<PersonaCatalog>,
) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "Travelbot Backend".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    let request_timeout = config.http_timeout * REQUEST_TIMEOUT_FACTOR + Duration::from_secs(1);

    routes::handler(environment)
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(config))
        .layer(Extension(pipeline))
        .layer(Extension(catalog))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    config: Arc<AppConfig>,
    pipeline: Arc<CommentaryPipeline>,
    catalog: Arc<PersonaCatalog>,
) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let router = router(environment, config, pipeline, catalog);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Travelbot Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
