//! # HTTP Server
//!
//! Combines the lookup, suggestion, health and admin routers into the
//! unified ndcserve API server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServiceConfig;
use crate::observability::Logger;

use super::admin_routes::admin_routes;
use super::health_routes::health_routes;
use super::lookup_routes::lookup_routes;
use super::state::LookupState;

/// HTTP server for the lookup API
pub struct HttpServer {
    addr: String,
    router: Router,
}

impl HttpServer {
    /// Build the server from a service configuration, opening the
    /// sources and performing the initial index build.
    pub fn from_config(config: ServiceConfig) -> Self {
        let addr = config.http.socket_addr();
        let cors = build_cors(&config.http.cors_origins);
        let state = Arc::new(LookupState::from_config(config));

        let router = Router::new()
            .merge(health_routes(state.clone()))
            .nest("/api", lookup_routes(state.clone()))
            .nest("/admin", admin_routes(state))
            .layer(cors);

        Self { addr, router }
    }

    /// The configured socket address
    pub fn socket_addr(&self) -> &str {
        &self.addr
    }

    /// The router (for in-process testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process exits
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{}", e)))?;

        let listener = TcpListener::bind(addr).await?;
        Logger::info("HTTP_SERVER_STARTED", &[("addr", &self.addr)]);

        axum::serve(listener, self.router).await
    }
}

fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // No origins configured: permissive, for development.
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let parsed: Vec<_> = origins.iter().filter_map(|s| s.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
