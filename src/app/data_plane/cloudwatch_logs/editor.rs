//! Query editor form state
//!
//! [`QueryEditorState`] is a plain snapshot of what the user has entered in a
//! query editor: radio button selections and text fields, with no behavior of
//! its own. It is assembled once per validation or submission and turned into
//! [`QueryDetails`] only after it validates.

#![warn(clippy::all, rust_2018_idioms)]

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::fields::get_fields;
use super::types::{ConnectionSettings, QueryDetails, QueryString, TimeRange, TimeUnit};
use super::validation::{parse_relative_amount, validate_editor_entries, ValidationError, ValidationResult};

/// Query used when an editor opens without one
pub const DEFAULT_INSIGHTS_QUERY: &str = "fields @timestamp, @message | sort @timestamp desc | limit 20";

/// Snapshot of a query editor's inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEditorState {
    /// Selected log groups, in selection order
    pub log_groups: Vec<String>,
    pub absolute_time_selected: bool,
    pub relative_time_selected: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Raw text of the relative amount field
    pub relative_time_amount: String,
    pub relative_time_unit: TimeUnit,
    pub insights_query_selected: bool,
    pub search_term_selected: bool,
    pub query_text: String,
    pub search_term: String,
}

impl Default for QueryEditorState {
    /// A fresh editor: last hour, Insights query mode, nothing selected
    fn default() -> Self {
        let now = Utc::now();
        Self {
            log_groups: Vec::new(),
            absolute_time_selected: false,
            relative_time_selected: true,
            start_date: now - Duration::hours(1),
            end_date: now,
            relative_time_amount: "1".to_string(),
            relative_time_unit: TimeUnit::Hours,
            insights_query_selected: true,
            search_term_selected: false,
            query_text: DEFAULT_INSIGHTS_QUERY.to_string(),
            search_term: String::new(),
        }
    }
}

impl QueryEditorState {
    /// Editor state reproducing an existing query
    pub fn from_query_details(details: &QueryDetails) -> Self {
        let mut state = Self {
            log_groups: details.log_groups.clone(),
            ..Self::default()
        };

        match &details.time_range {
            TimeRange::Absolute { start, end } => {
                state.absolute_time_selected = true;
                state.relative_time_selected = false;
                state.start_date = *start;
                state.end_date = *end;
            }
            TimeRange::Relative { amount, unit } => {
                state.relative_time_amount = amount.to_string();
                state.relative_time_unit = *unit;
            }
        }

        match &details.query {
            QueryString::Insights { raw } => {
                state.query_text = raw.clone();
            }
            QueryString::SearchTerm { term } => {
                state.insights_query_selected = false;
                state.search_term_selected = true;
                state.search_term = term.clone();
            }
        }

        state
    }

    pub fn validate(&self) -> ValidationResult {
        validate_editor_entries(self)
    }

    /// Validate and build the query these inputs describe
    pub fn query_details(
        &self,
        connection: ConnectionSettings,
    ) -> Result<QueryDetails, ValidationError> {
        self.validate()?;

        let time_range = if self.absolute_time_selected {
            TimeRange::absolute(self.start_date, self.end_date)
        } else {
            let amount = parse_relative_amount(&self.relative_time_amount)
                .ok_or(ValidationError::RelativeAmountMissing)?;
            TimeRange::relative(amount, self.relative_time_unit)
        };

        let query = if self.search_term_selected {
            QueryString::search_term(self.search_term.clone())
        } else {
            QueryString::insights(self.query_text.clone())
        };

        Ok(QueryDetails {
            connection,
            log_groups: self.log_groups.clone(),
            time_range,
            query,
        })
    }

    /// Columns the current query text is expected to produce
    pub fn predicted_fields(&self) -> Vec<String> {
        let query = if self.search_term_selected {
            QueryString::search_term(self.search_term.clone())
        } else {
            QueryString::insights(self.query_text.clone())
        };
        get_fields(&query.compile())
    }
}

/// Initial log group selection for an editor
///
/// Keeps the preselected names that exist in the catalog, in preselected order.
pub fn select_log_groups(catalog: &[String], preselected: &[String]) -> Vec<String> {
    preselected
        .iter()
        .filter(|name| catalog.contains(name))
        .cloned()
        .collect()
}
