//! CloudWatch Logs Insights Query Module
//!
//! Turns what a user entered in a query editor into a validated, running
//! CloudWatch Logs Insights query.
//!
//! ## Features
//!
//! - Relative ("last 15 minutes") and absolute time ranges
//! - Insights query-language text or a free-text search term
//! - Output column prediction from a query's `fields` stages
//! - Validation of editor input before anything is sent
//! - Cancellable asynchronous `StartQuery` submission
//!
//! ## Usage
//!
//! ```rust,no_run
//! use awslogs_insights::app::data_plane::cloudwatch_logs::{
//!     CloudWatchLogsClient, ConnectionSettings, QueryEditorState, QuerySubmitter,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let editor = QueryEditorState {
//!     log_groups: vec!["/aws/lambda/my-function".to_string()],
//!     query_text: "fields @timestamp, @message | filter @message like /ERROR/".to_string(),
//!     ..QueryEditorState::default()
//! };
//!
//! let details = editor.query_details(ConnectionSettings::new("us-east-1"))?;
//! let submitter = QuerySubmitter::new(Arc::new(CloudWatchLogsClient::new()));
//!
//! let query = submitter.start_query_async(&details).outcome().await?;
//! println!("started query {}", query.id);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, rust_2018_idioms)]

pub mod client;
pub mod editor;
pub mod errors;
pub mod fields;
pub mod query_string;
pub mod submission;
pub mod time_range;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use client::{CloudWatchLogsClient, LogGroupCatalog, QueryExecutor};
pub use editor::{select_log_groups, QueryEditorState, DEFAULT_INSIGHTS_QUERY};
pub use errors::{RemoteErrorKind, RemoteQueryError};
pub use fields::get_fields;
pub use submission::{build_start_query_request, QueryHandle, QuerySubmitter, SubmissionError};
pub use types::{
    ConnectionSettings, QueryDetails, QueryString, StartQueryRequest, SubmittedQuery, TimeRange,
    TimeUnit,
};
pub use validation::{validate_editor_entries, ValidationError, ValidationResult};
