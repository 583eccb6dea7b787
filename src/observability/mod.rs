//! Observability for ndcserve
//!
//! Structured JSON logging and the process-wide metrics registry the
//! health and metrics routes report from.

pub mod logger;
pub mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::ServiceMetrics;
