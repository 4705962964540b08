//! awslogs-insights - CloudWatch Logs Insights query builder
//!
//! Turns log-search intent into a validated, running CloudWatch Logs Insights
//! query: a time window (absolute or relative to now), query text (Insights
//! query language or a free-text search term), and a selection of log groups.
//!
//! # Core Features
//!
//! - **Time Range Resolution**: Absolute and relative windows resolved to whole Unix seconds
//! - **Query Compilation**: Search terms compiled into `filter @message like /.../` queries
//! - **Field Prediction**: Output columns predicted from a query's `fields` stages
//! - **Validation**: Editor input checked before anything is sent
//! - **Cancellable Submission**: `StartQuery` issued on a background task with a cancel handle
//!
//! # Getting Started
//!
//! See [`app::data_plane::cloudwatch_logs`] for the query API and
//! [`app::InsightsConfig`] for configuration.

#![warn(clippy::all, rust_2018_idioms)]

pub mod app;

pub use app::data_plane::cloudwatch_logs;

/// Version string including the git commit the binary was built from
pub fn version_string() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT"), ")")
}
