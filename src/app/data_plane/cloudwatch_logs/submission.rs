//! Insights query submission
//!
//! [`QuerySubmitter`] turns validated [`QueryDetails`] into a [`StartQueryRequest`]
//! and starts it on a background task. The caller gets a [`QueryHandle`] that
//! resolves to exactly one outcome: the submitted query, a remote failure, or
//! cancellation.
//!
//! Cancelling a handle (or dropping it) before the outcome is read guarantees
//! the caller never receives a query id for that submission. An in-flight
//! `StartQuery` call is abandoned; if the service already assigned an id, a
//! best-effort `StopQuery` is sent for it. The background task keeps an
//! assigned id until the handle claims it or the submission is cancelled, so
//! a dropped handle never leaves a query running unowned.

#![warn(clippy::all, rust_2018_idioms)]

use std::sync::Arc;

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use super::client::QueryExecutor;
use super::errors::RemoteQueryError;
use super::types::{ConnectionSettings, QueryDetails, StartQueryRequest, SubmittedQuery};

/// Why a submission produced no query
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Remote(#[from] RemoteQueryError),
    #[error("query submission was cancelled")]
    Cancelled,
    #[error("query submission task failed: {0}")]
    TaskFailed(#[source] JoinError),
}

/// Build the `StartQuery` request for a query, resolving its time range now
pub fn build_start_query_request(details: &QueryDetails) -> StartQueryRequest {
    let (start_time_seconds, end_time_seconds) = details.time_range.resolve();
    StartQueryRequest {
        log_group_names: details.log_groups.clone(),
        start_time_seconds,
        end_time_seconds,
        query_string: details.query.compile(),
    }
}

/// Starts Insights queries on a [`QueryExecutor`]
#[derive(Clone)]
pub struct QuerySubmitter {
    executor: Arc<dyn QueryExecutor>,
}

impl QuerySubmitter {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Start a query in the background
    ///
    /// `details` must already be valid. Issues exactly one `StartQuery` call and
    /// never retries. Must be called from within a Tokio runtime.
    pub fn start_query_async(&self, details: &QueryDetails) -> QueryHandle {
        let request = build_start_query_request(details);
        let connection = details.connection.clone();
        let cancel_token = CancellationToken::new();
        let claim_token = CancellationToken::new();

        info!(
            "Submitting Insights query to {} log group(s) for {} ({}..{})",
            request.log_group_names.len(),
            connection,
            request.start_time_seconds,
            request.end_time_seconds
        );
        debug!("Query string: {}", request.query_string);

        let task = tokio::spawn(run_submission(
            Arc::clone(&self.executor),
            connection.clone(),
            request,
            cancel_token.clone(),
            claim_token.clone(),
        ));

        QueryHandle {
            guard: cancel_token.clone().drop_guard(),
            cancel_token,
            claim_token,
            task,
            executor: Arc::clone(&self.executor),
            connection,
        }
    }
}

/// A pending query submission
///
/// Dropping the handle cancels the submission.
pub struct QueryHandle {
    cancel_token: CancellationToken,
    /// Cancelled once the outcome is being read; releases an assigned id
    claim_token: CancellationToken,
    guard: DropGuard,
    task: JoinHandle<Result<SubmittedQuery, SubmissionError>>,
    executor: Arc<dyn QueryExecutor>,
    connection: ConnectionSettings,
}

impl QueryHandle {
    /// Cancel the submission. The outcome will be [`SubmissionError::Cancelled`].
    pub fn cancel(&self) {
        if !self.cancel_token.is_cancelled() {
            info!("Cancelling Insights query submission");
            self.cancel_token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Token that cancels this submission, for callers cancelling from elsewhere
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Wait for the submission's outcome
    pub async fn outcome(self) -> Result<SubmittedQuery, SubmissionError> {
        let QueryHandle {
            cancel_token,
            claim_token,
            guard,
            task,
            executor,
            connection,
        } = self;

        claim_token.cancel();
        let result = match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(SubmissionError::Cancelled),
            Err(e) => Err(SubmissionError::TaskFailed(e)),
        };

        // Cancellation may land after the task finished but before we got here.
        let result = match result {
            Ok(submitted) if cancel_token.is_cancelled() => {
                stop_orphaned_query(executor.as_ref(), &connection, &submitted.id).await;
                Err(SubmissionError::Cancelled)
            }
            other => other,
        };

        guard.disarm();
        result
    }
}

async fn run_submission(
    executor: Arc<dyn QueryExecutor>,
    connection: ConnectionSettings,
    request: StartQueryRequest,
    cancel_token: CancellationToken,
    claim_token: CancellationToken,
) -> Result<SubmittedQuery, SubmissionError> {
    let result = tokio::select! {
        biased;
        _ = cancel_token.cancelled() => {
            warn!("Insights query submission cancelled before StartQuery completed");
            return Err(SubmissionError::Cancelled);
        }
        result = executor.start_query(&connection, &request) => result,
    };

    let submitted = match result {
        Ok(submitted) => submitted,
        Err(e) => {
            warn!("StartQuery failed: {}", e);
            return Err(SubmissionError::Remote(e));
        }
    };
    info!("Insights query started: {}", submitted.id);

    // Hold the id until the handle claims it; cancellation wins a tie.
    tokio::select! {
        biased;
        _ = cancel_token.cancelled() => {
            stop_orphaned_query(executor.as_ref(), &connection, &submitted.id).await;
            Err(SubmissionError::Cancelled)
        }
        _ = claim_token.cancelled() => Ok(submitted),
    }
}

/// Stop a query whose id will never reach the caller. Failures are only logged.
async fn stop_orphaned_query(
    executor: &dyn QueryExecutor,
    connection: &ConnectionSettings,
    query_id: &str,
) {
    match executor.stop_query(connection, query_id).await {
        Ok(stopped) => debug!("Stopped cancelled query {} (stopped: {})", query_id, stopped),
        Err(e) => warn!("Failed to stop cancelled query {}: {}", query_id, e),
    }
}
