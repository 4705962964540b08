//! CloudWatch Logs Insights Data Types
//!
//! Data structures describing an Insights query: the log groups it targets, the
//! time window it covers, the query text, and the wire request sent to
//! `StartQuery`.

#![warn(clippy::all, rust_2018_idioms)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unit of a relative time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    /// All units, in the order a picker shows them
    pub const ALL: [TimeUnit; 5] = [
        TimeUnit::Seconds,
        TimeUnit::Minutes,
        TimeUnit::Hours,
        TimeUnit::Days,
        TimeUnit::Weeks,
    ];

    /// Length of one unit in seconds
    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 60 * 60,
            TimeUnit::Days => 24 * 60 * 60,
            TimeUnit::Weeks => 7 * 24 * 60 * 60,
        }
    }

    /// Display name shown in the editor
    pub fn display_name(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "Seconds",
            TimeUnit::Minutes => "Minutes",
            TimeUnit::Hours => "Hours",
            TimeUnit::Days => "Days",
            TimeUnit::Weeks => "Weeks",
        }
    }

    /// Single-letter suffix used by compact ranges such as `15m`
    pub fn suffix(&self) -> char {
        match self {
            TimeUnit::Seconds => 's',
            TimeUnit::Minutes => 'm',
            TimeUnit::Hours => 'h',
            TimeUnit::Days => 'd',
            TimeUnit::Weeks => 'w',
        }
    }

    fn from_suffix(suffix: char) -> Option<Self> {
        TimeUnit::ALL
            .into_iter()
            .find(|unit| unit.suffix() == suffix.to_ascii_lowercase())
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when a time unit name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time unit: '{0}'")]
pub struct ParseTimeUnitError(pub String);

impl FromStr for TimeUnit {
    type Err = ParseTimeUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let singular = name.strip_suffix('s').unwrap_or(&name);
        match singular {
            "second" => Ok(TimeUnit::Seconds),
            "minute" => Ok(TimeUnit::Minutes),
            "hour" => Ok(TimeUnit::Hours),
            "day" => Ok(TimeUnit::Days),
            "week" => Ok(TimeUnit::Weeks),
            _ => Err(ParseTimeUnitError(s.to_string())),
        }
    }
}

/// Time window a query covers
///
/// Relative ranges are anchored to "now" when they are resolved, not when they
/// are constructed, so resolving the same value twice can give different
/// instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimeRange {
    /// Both endpoints explicit. `start < end` is checked by validation, not here.
    Absolute {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// The last `amount` units before resolution time
    Relative { amount: u32, unit: TimeUnit },
}

/// Error returned when a compact relative range such as `15m` cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRelativeRangeError {
    #[error("relative range is empty")]
    Empty,
    #[error("relative range '{0}' must start with a positive whole number")]
    InvalidAmount(String),
    #[error("relative range '{0}' must end with one of s, m, h, d, w")]
    InvalidUnit(String),
}

impl TimeRange {
    pub fn absolute(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeRange::Absolute { start, end }
    }

    pub fn relative(amount: u32, unit: TimeUnit) -> Self {
        TimeRange::Relative { amount, unit }
    }

    /// Parse a compact relative range: `<amount><s|m|h|d|w>`, e.g. `15m` or `1d`
    pub fn parse_relative(text: &str) -> Result<Self, ParseRelativeRangeError> {
        let text = text.trim();
        let suffix = text.chars().last().ok_or(ParseRelativeRangeError::Empty)?;
        let unit = TimeUnit::from_suffix(suffix)
            .ok_or_else(|| ParseRelativeRangeError::InvalidUnit(text.to_string()))?;

        let amount = text[..text.len() - suffix.len_utf8()]
            .parse::<u32>()
            .ok()
            .filter(|amount| *amount >= 1)
            .ok_or_else(|| ParseRelativeRangeError::InvalidAmount(text.to_string()))?;

        Ok(TimeRange::Relative { amount, unit })
    }
}

/// Text of a query, either Insights query language or a free-text search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueryString {
    /// Insights query language, submitted verbatim
    Insights { raw: String },
    /// A search term compiled into a `filter @message like /.../` query
    SearchTerm { term: String },
}

impl QueryString {
    pub fn insights(raw: impl Into<String>) -> Self {
        QueryString::Insights { raw: raw.into() }
    }

    pub fn search_term(term: impl Into<String>) -> Self {
        QueryString::SearchTerm { term: term.into() }
    }
}

/// Region and credential profile a query runs against
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub region: String,
    /// Named credential profile; `None` uses the default provider chain
    pub profile: Option<String>,
}

impl ConnectionSettings {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

impl fmt::Display for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.profile {
            Some(profile) => write!(f, "{}@{}", profile, self.region),
            None => write!(f, "default@{}", self.region),
        }
    }
}

/// Everything needed to run one Insights query
///
/// Log groups keep their selection order and may contain duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDetails {
    pub connection: ConnectionSettings,
    pub log_groups: Vec<String>,
    pub time_range: TimeRange,
    pub query: QueryString,
}

/// Request sent to the `StartQuery` API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQueryRequest {
    pub log_group_names: Vec<String>,
    /// Unix seconds
    pub start_time_seconds: i64,
    /// Unix seconds
    pub end_time_seconds: i64,
    pub query_string: String,
}

/// A query accepted by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedQuery {
    pub id: String,
}
