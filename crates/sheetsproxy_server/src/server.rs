use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware;
use axum::routing::{get, post};
use sheetsproxy_sheets::SpreadsheetBackend;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::gate::require_access_key;
use crate::handlers;

/// Largest request body accepted.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// State that's passed to all handlers.
#[derive(Debug)]
pub struct ServerState {
    pub config: ServiceConfig,
    /// Opens a fresh worksheet session per request.
    pub backend: Arc<dyn SpreadsheetBackend>,
}

/// Build the service router.
///
/// Only the row resources sit behind the access gate. Health checks and
/// unmatched routes don't.
pub fn router(state: Arc<ServerState>) -> Router {
    let rows = Router::new()
        .route(
            "/rows",
            post(handlers::append_rows).get(handlers::search_rows),
        )
        .route(
            "/rows/:row_id",
            get(handlers::get_row).patch(handlers::patch_row),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_key,
        ));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .merge(rows)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .with_state(state)
}

pub struct SheetsProxyServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl SheetsProxyServer {
    pub fn new(
        listener: TcpListener,
        config: ServiceConfig,
        backend: Arc<dyn SpreadsheetBackend>,
    ) -> Self {
        SheetsProxyServer {
            listener,
            state: Arc::new(ServerState { config, backend }),
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until ctrl-c.
    pub async fn serve(self) -> std::io::Result<()> {
        let addr = self.listener.local_addr()?;
        info!(
            version = env!("CARGO_PKG_VERSION"),
            access_key_header = %self.state.config.access_key_header,
            api_url = %self.state.config.sheets.api_url,
            "Listening on http://{addr}"
        );
        if self.state.config.access_key.is_none() {
            warn!("no access key configured, all row requests will be rejected");
        }

        let app = router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown triggered"),
        Err(err) => error!(%err, "unable to listen for shutdown signal"),
    }
}
