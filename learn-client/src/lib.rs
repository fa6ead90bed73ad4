//! Client for the AgenticLearn learning backend.
//!
//! [`ApiClient`] resolves a logical service name to a base URL, attaches the
//! stored credential, sends the request under a deadline and records latency,
//! payload size and an estimated carbon cost for every response.
//! [`CachedClient`] adds a TTL-bounded cache for successful GET responses.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod cost;
pub mod credentials;
pub mod errors;
pub mod footprint;
pub mod metrics_defs;
pub mod request;
pub mod resolver;

#[cfg(test)]
mod testutils;

pub use api::HealthReport;
pub use client::{ApiClient, CachedClient, ClientBuilder};
pub use config::{Config, Environment, FeatureFlags};
pub use errors::{ClientError, TransportCause};
pub use footprint::MetricsSummary;
pub use request::RequestDescriptor;
