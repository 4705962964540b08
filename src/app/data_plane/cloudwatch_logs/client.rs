//! CloudWatch Logs Client Wrapper
//!
//! The query core talks to CloudWatch Logs through two traits: [`LogGroupCatalog`]
//! lists selectable log groups and [`QueryExecutor`] starts and stops Insights
//! queries. [`CloudWatchLogsClient`] implements both on the AWS SDK; tests
//! substitute in-process fakes.

#![warn(clippy::all, rust_2018_idioms)]

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatchlogs as cloudwatchlogs;
use aws_types::region::Region;
use tracing::debug;

use super::errors::{RemoteErrorKind, RemoteQueryError};
use super::types::{ConnectionSettings, StartQueryRequest, SubmittedQuery};

/// Source of the log group names a query can target
#[async_trait]
pub trait LogGroupCatalog: Send + Sync {
    /// List log group names in the connection's region, optionally filtered by prefix
    async fn list_log_groups(
        &self,
        connection: &ConnectionSettings,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, RemoteQueryError>;
}

/// Remote Insights query execution
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Start a query, returning the id assigned by the service
    async fn start_query(
        &self,
        connection: &ConnectionSettings,
        request: &StartQueryRequest,
    ) -> Result<SubmittedQuery, RemoteQueryError>;

    /// Stop a running query. Returns whether the service reported it stopped.
    async fn stop_query(
        &self,
        connection: &ConnectionSettings,
        query_id: &str,
    ) -> Result<bool, RemoteQueryError>;
}

/// CloudWatch Logs client wrapper
///
/// An SDK client is built per call from the connection settings, so one wrapper
/// serves any number of regions and profiles.
#[derive(Debug, Clone, Default)]
pub struct CloudWatchLogsClient;

impl CloudWatchLogsClient {
    pub fn new() -> Self {
        Self
    }

    async fn sdk_client(&self, connection: &ConnectionSettings) -> cloudwatchlogs::Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(connection.region.clone()));

        if let Some(profile) = &connection.profile {
            loader = loader.profile_name(profile);
        }

        let aws_config = loader.load().await;
        debug!("Created CloudWatch Logs client for {}", connection);
        cloudwatchlogs::Client::new(&aws_config)
    }
}

#[async_trait]
impl LogGroupCatalog for CloudWatchLogsClient {
    async fn list_log_groups(
        &self,
        connection: &ConnectionSettings,
        prefix: Option<&str>,
    ) -> Result<Vec<String>, RemoteQueryError> {
        let client = self.sdk_client(connection).await;

        let mut log_groups = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = client
                .describe_log_groups()
                .set_log_group_name_prefix(prefix.map(str::to_string))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| RemoteQueryError::new("DescribeLogGroups", e))?;

            if let Some(groups) = response.log_groups {
                log_groups.extend(groups.into_iter().filter_map(|group| group.log_group_name));
            }

            match response.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        debug!(
            "Listed {} log groups for {}",
            log_groups.len(),
            connection
        );
        Ok(log_groups)
    }
}

#[async_trait]
impl QueryExecutor for CloudWatchLogsClient {
    async fn start_query(
        &self,
        connection: &ConnectionSettings,
        request: &StartQueryRequest,
    ) -> Result<SubmittedQuery, RemoteQueryError> {
        let client = self.sdk_client(connection).await;

        let response = client
            .start_query()
            .set_log_group_names(Some(request.log_group_names.clone()))
            .start_time(request.start_time_seconds)
            .end_time(request.end_time_seconds)
            .query_string(&request.query_string)
            .send()
            .await
            .map_err(|e| RemoteQueryError::new("StartQuery", e))?;

        let id = response.query_id.ok_or_else(|| {
            RemoteQueryError::with_kind(
                RemoteErrorKind::Other,
                "StartQuery",
                "StartQuery response did not include a query id",
            )
        })?;

        Ok(SubmittedQuery { id })
    }

    async fn stop_query(
        &self,
        connection: &ConnectionSettings,
        query_id: &str,
    ) -> Result<bool, RemoteQueryError> {
        let client = self.sdk_client(connection).await;

        let response = client
            .stop_query()
            .query_id(query_id)
            .send()
            .await
            .map_err(|e| RemoteQueryError::new("StopQuery", e))?;

        Ok(response.success)
    }
}
