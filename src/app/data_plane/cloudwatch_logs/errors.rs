//! Remote failure categorization for CloudWatch Logs calls.
//!
//! Failures from the SDK are wrapped in a [`RemoteQueryError`] that keeps the
//! original error as its source and adds a [`RemoteErrorKind`] derived from
//! the AWS error code, so callers can tell throttling from a rejected query
//! without string matching of their own.
//!
//! The SDK retries transient errors internally. Nothing in this crate retries;
//! [`RemoteErrorKind::is_retryable`] exists for user-facing hints only.

#![warn(clippy::all, rust_2018_idioms)]

use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Category of a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Rate limited, or too many concurrent Insights queries
    Throttled,
    Timeout,
    /// Connection could not be established or was dropped
    Network,
    /// AWS-side transient failure
    ServiceUnavailable,
    /// Missing permissions or invalid/expired credentials
    Authorization,
    /// The request was rejected as invalid (bad query syntax, bad parameters)
    MalformedRequest,
    Other,
}

impl RemoteErrorKind {
    /// Returns true if retrying later could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RemoteErrorKind::Throttled
                | RemoteErrorKind::Timeout
                | RemoteErrorKind::Network
                | RemoteErrorKind::ServiceUnavailable
        )
    }

    /// Short label for compact display
    pub fn short_label(&self) -> &'static str {
        match self {
            RemoteErrorKind::Throttled => "throttled",
            RemoteErrorKind::Timeout => "timeout",
            RemoteErrorKind::Network => "network",
            RemoteErrorKind::ServiceUnavailable => "unavailable",
            RemoteErrorKind::Authorization => "unauthorized",
            RemoteErrorKind::MalformedRequest => "rejected",
            RemoteErrorKind::Other => "error",
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_label())
    }
}

/// A failed call to CloudWatch Logs
#[derive(Debug, Error)]
#[error("{operation} failed ({kind}): {message}")]
pub struct RemoteQueryError {
    pub kind: RemoteErrorKind,
    /// API operation name, e.g. `StartQuery`
    pub operation: String,
    /// Truncated error detail for display
    pub message: String,
    #[source]
    source: BoxError,
}

impl RemoteQueryError {
    /// Wrap an error, deriving its kind from the error text
    pub fn new<E>(operation: &str, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        let source = error.into();
        let detail = detailed_text(&*source);
        Self {
            kind: categorize_error_string(&detail),
            operation: operation.to_string(),
            message: truncate_message(&detail, 200),
            source,
        }
    }

    /// Wrap an error with an already known kind
    pub fn with_kind<E>(kind: RemoteErrorKind, operation: &str, error: E) -> Self
    where
        E: Into<BoxError>,
    {
        let source = error.into();
        Self {
            kind,
            operation: operation.to_string(),
            message: truncate_message(&detailed_text(&*source), 200),
            source,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// User-friendly message for status display
    pub fn user_message(&self) -> String {
        match self.kind {
            RemoteErrorKind::Throttled => format!("{} rate limited", self.operation),
            RemoteErrorKind::Timeout => format!("{} timeout", self.operation),
            RemoteErrorKind::Network => "Network error".to_string(),
            RemoteErrorKind::ServiceUnavailable => "CloudWatch Logs unavailable".to_string(),
            RemoteErrorKind::Authorization => {
                format!("Not authorized to call {}", self.operation)
            }
            RemoteErrorKind::MalformedRequest => {
                extract_error_code(&self.message).unwrap_or_else(|| "Invalid query".to_string())
            }
            RemoteErrorKind::Other => self.message.clone(),
        }
    }
}

/// Error text plus the text of every source in the chain
///
/// SDK errors print "service error" at the top level and keep the AWS error
/// code further down the chain.
fn detailed_text(error: &(dyn std::error::Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        text.push_str(": ");
        text.push_str(&source.to_string());
        current = source.source();
    }
    text
}

/// Categorize an error based on its string representation
pub fn categorize_error_string(error_str: &str) -> RemoteErrorKind {
    if error_str.contains("ThrottlingException")
        || error_str.contains("Throttling")
        || error_str.contains("TooManyRequestsException")
        || error_str.contains("LimitExceededException")
        || error_str.contains("RequestLimitExceeded")
        || error_str.contains("RateExceeded")
    {
        return RemoteErrorKind::Throttled;
    }

    if error_str.contains("TimeoutError")
        || error_str.contains("timeout")
        || error_str.contains("timed out")
        || error_str.contains("deadline exceeded")
    {
        return RemoteErrorKind::Timeout;
    }

    if error_str.contains("AccessDenied")
        || error_str.contains("UnauthorizedOperation")
        || error_str.contains("UnrecognizedClientException")
        || error_str.contains("InvalidClientTokenId")
        || error_str.contains("ExpiredToken")
        || error_str.contains("SignatureDoesNotMatch")
        || error_str.contains("no credentials")
        || error_str.contains("CredentialsNotLoaded")
    {
        return RemoteErrorKind::Authorization;
    }

    if error_str.contains("MalformedQueryException")
        || error_str.contains("InvalidParameterException")
        || error_str.contains("ValidationException")
        || error_str.contains("ResourceNotFoundException")
    {
        return RemoteErrorKind::MalformedRequest;
    }

    if error_str.contains("DispatchFailure")
        || error_str.contains("dispatch failure")
        || error_str.contains("connection")
        || error_str.contains("Connection")
        || error_str.contains("DNS")
        || error_str.contains("socket")
    {
        return RemoteErrorKind::Network;
    }

    if error_str.contains("ServiceUnavailable")
        || error_str.contains("ServiceUnavailableException")
        || error_str.contains("InternalServerError")
        || error_str.contains("InternalError")
        || error_str.contains("Service Unavailable")
    {
        return RemoteErrorKind::ServiceUnavailable;
    }

    RemoteErrorKind::Other
}

/// Extract an AWS error code such as `MalformedQueryException` from error text
fn extract_error_code(error_str: &str) -> Option<String> {
    error_str
        .split(|c: char| !c.is_ascii_alphanumeric())
        .find(|word| {
            word.len() < 50
                && (word.ends_with("Exception") || word.ends_with("Error"))
                && word.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        })
        .map(str::to_string)
}

/// Truncate a message to max length, adding ellipsis if truncated
fn truncate_message(msg: &str, max_len: usize) -> String {
    if msg.len() <= max_len {
        return msg.to_string();
    }
    let mut end = max_len - 3;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &msg[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_throttling() {
        assert_eq!(
            categorize_error_string("ThrottlingException: Rate exceeded"),
            RemoteErrorKind::Throttled
        );
        assert_eq!(
            categorize_error_string("LimitExceededException: too many concurrent queries"),
            RemoteErrorKind::Throttled
        );
    }

    #[test]
    fn test_categorize_authorization() {
        let kind = categorize_error_string(
            "service error: AccessDeniedException: User is not authorized to perform logs:StartQuery",
        );
        assert_eq!(kind, RemoteErrorKind::Authorization);
        assert!(!kind.is_retryable());
    }

    #[test]
    fn test_categorize_malformed_query() {
        assert_eq!(
            categorize_error_string("MalformedQueryException: unexpected symbol"),
            RemoteErrorKind::MalformedRequest
        );
    }

    #[test]
    fn test_categorize_network_and_timeout() {
        assert_eq!(
            categorize_error_string("dispatch failure: io error: connection refused"),
            RemoteErrorKind::Network
        );
        assert_eq!(
            categorize_error_string("TimeoutError: request timed out after 30s"),
            RemoteErrorKind::Timeout
        );
        assert!(RemoteErrorKind::Network.is_retryable());
    }

    #[test]
    fn test_categorize_unknown() {
        assert_eq!(categorize_error_string("something odd"), RemoteErrorKind::Other);
    }

    #[derive(Debug, Error)]
    #[error("service error")]
    struct TopLevel(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("MalformedQueryException: unexpected symbol at 1:7")]
    struct Inner;

    #[test]
    fn test_kind_is_read_from_source_chain() {
        let error = RemoteQueryError::new("StartQuery", TopLevel(Inner));

        assert_eq!(error.kind, RemoteErrorKind::MalformedRequest);
        assert_eq!(error.user_message(), "MalformedQueryException");
        assert!(std::error::Error::source(&error).is_some());
        assert_eq!(
            error.to_string(),
            "StartQuery failed (rejected): service error: MalformedQueryException: unexpected symbol at 1:7"
        );
    }

    #[test]
    fn test_with_kind_keeps_kind() {
        let error = RemoteQueryError::with_kind(
            RemoteErrorKind::Other,
            "StartQuery",
            "StartQuery response did not include a query id",
        );
        assert_eq!(error.kind, RemoteErrorKind::Other);
        assert_eq!(error.operation, "StartQuery");
    }

    #[test]
    fn test_truncate_message() {
        assert_eq!(truncate_message("short", 10), "short");
        assert_eq!(truncate_message("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate_message("ééééé", 6), "é...");
    }
}
