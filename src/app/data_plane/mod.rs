//! Data Plane Services Module
//!
//! Data plane services query data held inside AWS resources, as opposed to
//! control plane operations that discover and manage the resources themselves.
//!
//! ## Available Services
//!
//! - **CloudWatch Logs Insights**: Build, validate, and start Insights queries
//!   across one or more log groups

pub mod cloudwatch_logs;

pub use cloudwatch_logs::{
    CloudWatchLogsClient, QueryDetails as CloudWatchLogsQueryDetails,
    QuerySubmitter as CloudWatchLogsQuerySubmitter,
};
