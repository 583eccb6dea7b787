//! # ndcserve HTTP Server Module
//!
//! Thin glue over the lookup core. The routing layer never owns any
//! resolution or matching logic; it derives inputs, calls the core, and
//! shapes responses.
//!
//! # Endpoints
//!
//! - `/health`, `/metrics` - Service health and counters
//! - `/api/ndc/{code}` - Assisted lookup
//! - `/api/suggest?q=` - Autocomplete from the in-memory index
//! - `/admin/reload` - Reopen the backup and rebuild the index

pub mod admin_routes;
pub mod config;
pub mod errors;
pub mod health_routes;
pub mod lookup_routes;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use server::HttpServer;
pub use state::LookupState;
