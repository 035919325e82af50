//! # HTTP Server
//!
//! Axum router for the read-only query API. CORS is wide open: the API
//! serves public data, so any origin may read it. Only GET (and the CORS
//! preflight OPTIONS) are routed; anything else gets a 405 from the
//! method router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::executor::RecordStore;
use crate::schema::SchemaRegistry;

use super::handler::{
    describe_handler, list_handler, not_found_handler, object_handler, ApiState,
};

/// The query API server.
pub struct ApiServer<S: RecordStore> {
    config: ServerConfig,
    state: Arc<ApiState<S>>,
}

impl<S: RecordStore + 'static> ApiServer<S> {
    pub fn new(config: ServerConfig, registry: Arc<SchemaRegistry>, store: Arc<S>) -> Self {
        let state = Arc::new(ApiState {
            registry,
            store,
            use_tz: config.use_tz,
        });
        Self { config, state }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any)
            .max_age(Duration::from_secs(1_728_000));

        Router::new()
            .route("/api", get(describe_handler::<S>))
            .route("/api/{type_name}", get(list_handler::<S>))
            .route("/api/{type_name}/{id}", get(object_handler::<S>))
            .fallback(not_found_handler)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Bind and serve until shutdown.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address: {e}"),
            )
        })?;

        let router = self.router();
        tracing::info!(%addr, "starting query API server");
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    }
}
