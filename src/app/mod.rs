//! Core application modules for awslogs-insights.
//!
//! # Module Organization
//!
//! - [`data_plane`] - CloudWatch Logs Insights query construction, validation, and submission
//! - [`insights_config`] - Editor and connection defaults loaded from `insights.json`
//!
//! # Architecture
//!
//! User input arrives as a [`data_plane::cloudwatch_logs::QueryEditorState`]
//! snapshot. Validation gates it, the time range and query text are resolved
//! into a `StartQuery` request, and a cancellable background task submits it
//! through a [`data_plane::cloudwatch_logs::QueryExecutor`].

pub mod data_plane;
pub mod insights_config;

pub use insights_config::InsightsConfig;
