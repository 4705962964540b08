//! Query editor validation
//!
//! Checks an editor's form state before a query is built and submitted. Checks
//! run in a fixed order and the first failure is reported.

#![warn(clippy::all, rust_2018_idioms)]

use thiserror::Error;

use super::editor::QueryEditorState;

/// Reason a query cannot be submitted yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select an absolute or relative time range")]
    TimeRangeNotSelected,
    #[error("Start date must be before end date")]
    StartAfterEnd,
    #[error("Enter a positive number for the relative time range")]
    RelativeAmountMissing,
    #[error("Select whether to query with Insights syntax or a search term")]
    QueryTypeNotSelected,
    #[error("No query entered")]
    QueryTextEmpty,
    #[error("No search term entered")]
    SearchTermEmpty,
    #[error("Select at least one log group")]
    NoLogGroupSelected,
}

pub type ValidationResult = Result<(), ValidationError>;

/// Parse the relative amount text as a positive whole number
pub(crate) fn parse_relative_amount(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|amount| *amount >= 1)
}

/// Validate editor entries, reporting the first failing check
///
/// Order: time mode, absolute ordering, relative amount, query mode, query
/// text, search term, log group selection. Absolute endpoints are compared at
/// the whole-second precision they are submitted with.
pub fn validate_editor_entries(state: &QueryEditorState) -> ValidationResult {
    if state.absolute_time_selected == state.relative_time_selected {
        return Err(ValidationError::TimeRangeNotSelected);
    }

    // Whole seconds: 10.2s..10.8s is rejected since both submit as 10
    if state.absolute_time_selected && state.start_date.timestamp() >= state.end_date.timestamp()
    {
        return Err(ValidationError::StartAfterEnd);
    }

    if state.relative_time_selected && parse_relative_amount(&state.relative_time_amount).is_none()
    {
        return Err(ValidationError::RelativeAmountMissing);
    }

    if state.insights_query_selected == state.search_term_selected {
        return Err(ValidationError::QueryTypeNotSelected);
    }

    if state.insights_query_selected && state.query_text.trim().is_empty() {
        return Err(ValidationError::QueryTextEmpty);
    }

    if state.search_term_selected && state.search_term.trim().is_empty() {
        return Err(ValidationError::SearchTermEmpty);
    }

    if state.log_groups.is_empty() {
        return Err(ValidationError::NoLogGroupSelected);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn valid_relative_state() -> QueryEditorState {
        QueryEditorState {
            log_groups: vec!["log1".to_string()],
            query_text: "fields @timestamp".to_string(),
            ..QueryEditorState::default()
        }
    }

    #[test]
    fn test_default_state_with_log_group_is_valid() {
        assert_eq!(validate_editor_entries(&valid_relative_state()), Ok(()));
    }

    #[test]
    fn test_no_time_mode_selected() {
        let state = QueryEditorState {
            relative_time_selected: false,
            absolute_time_selected: false,
            ..valid_relative_state()
        };
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::TimeRangeNotSelected)
        );
    }

    #[test]
    fn test_both_time_modes_selected() {
        let state = QueryEditorState {
            absolute_time_selected: true,
            ..valid_relative_state()
        };
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::TimeRangeNotSelected)
        );
    }

    #[test]
    fn test_start_must_be_before_end() {
        let now = Utc::now();
        let mut state = QueryEditorState {
            absolute_time_selected: true,
            relative_time_selected: false,
            start_date: now,
            end_date: now - Duration::days(1),
            ..valid_relative_state()
        };
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::StartAfterEnd)
        );

        state.end_date = state.start_date;
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::StartAfterEnd)
        );

        state.end_date = state.start_date + Duration::seconds(1);
        assert_eq!(validate_editor_entries(&state), Ok(()));
    }

    #[test]
    fn test_start_and_end_within_one_second_are_rejected() {
        let start = Utc.timestamp_millis_opt(10_200).unwrap();
        let state = QueryEditorState {
            absolute_time_selected: true,
            relative_time_selected: false,
            start_date: start,
            end_date: start + Duration::milliseconds(600),
            ..valid_relative_state()
        };
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::StartAfterEnd)
        );
    }

    #[test]
    fn test_relative_amount_must_be_positive_number() {
        for amount in ["", "  ", "abc", "0", "-3", "1.5"] {
            let state = QueryEditorState {
                relative_time_amount: amount.to_string(),
                ..valid_relative_state()
            };
            assert_eq!(
                validate_editor_entries(&state),
                Err(ValidationError::RelativeAmountMissing),
                "amount {:?}",
                amount
            );
        }

        let state = QueryEditorState {
            relative_time_amount: " 15 ".to_string(),
            ..valid_relative_state()
        };
        assert_eq!(validate_editor_entries(&state), Ok(()));
    }

    #[test]
    fn test_query_mode_must_be_exclusive() {
        let state = QueryEditorState {
            insights_query_selected: false,
            search_term_selected: false,
            ..valid_relative_state()
        };
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::QueryTypeNotSelected)
        );
    }

    #[test]
    fn test_blank_query_text() {
        let state = QueryEditorState {
            query_text: "  \n".to_string(),
            ..valid_relative_state()
        };
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::QueryTextEmpty)
        );
    }

    #[test]
    fn test_blank_search_term() {
        let state = QueryEditorState {
            insights_query_selected: false,
            search_term_selected: true,
            search_term: String::new(),
            ..valid_relative_state()
        };
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::SearchTermEmpty)
        );
    }

    #[test]
    fn test_no_log_groups() {
        let state = QueryEditorState {
            log_groups: Vec::new(),
            ..valid_relative_state()
        };
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::NoLogGroupSelected)
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let state = QueryEditorState {
            relative_time_amount: String::new(),
            query_text: String::new(),
            log_groups: Vec::new(),
            ..valid_relative_state()
        };
        assert_eq!(
            validate_editor_entries(&state),
            Err(ValidationError::RelativeAmountMissing)
        );
    }

    #[test]
    fn test_messages_are_human_readable() {
        assert_eq!(
            ValidationError::NoLogGroupSelected.to_string(),
            "Select at least one log group"
        );
        assert_eq!(
            ValidationError::StartAfterEnd.to_string(),
            "Start date must be before end date"
        );
    }
}
