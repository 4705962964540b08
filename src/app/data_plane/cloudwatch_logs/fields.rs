//! Output field prediction for Insights queries
//!
//! Insights queries are `|`-separated stages. The columns a query produces are
//! the ones named by its last `fields` stage; each `fields` stage replaces the
//! list from any earlier one. This module predicts those columns from the query
//! text so a results table can be laid out before any rows arrive.
//!
//! The parser is advisory. Malformed text never fails, it just yields fewer
//! recognized fields.

#![warn(clippy::all, rust_2018_idioms)]

use once_cell::sync::Lazy;
use regex::Regex;

/// A stage whose leading keyword is `fields`, with the field list captured
static FIELDS_STAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^fields(?:\s+(?P<list>.*))?$").expect("fields stage pattern is valid")
});

/// Predict the output fields of an Insights query
///
/// Returns the field list of the last `fields` stage in written order, or an
/// empty list if the query has no `fields` stage. Stage detection anchors on
/// the stage's leading keyword, so `filter @message like /fields/` is not a
/// `fields` stage.
///
/// ```
/// use awslogs_insights::app::data_plane::cloudwatch_logs::get_fields;
///
/// assert_eq!(
///     get_fields("fields @timestamp, @logStream | limit 10 | fields @message"),
///     vec!["@message".to_string()]
/// );
/// ```
pub fn get_fields(query: &str) -> Vec<String> {
    split_top_level(query, '|')
        .into_iter()
        .filter_map(fields_in_stage)
        .last()
        .unwrap_or_default()
}

/// Field list of a single stage, or `None` when the stage is not a `fields` stage
fn fields_in_stage(stage: &str) -> Option<Vec<String>> {
    let captures = FIELDS_STAGE.captures(stage.trim())?;
    let list = captures.name("list").map_or("", |m| m.as_str());

    Some(
        split_top_level(list, ',')
            .into_iter()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Split on `separator`, ignoring separators inside quotes, `/regex/`
/// literals or parentheses
///
/// An opener that is never closed is treated as an ordinary character, so a
/// stray apostrophe or parenthesis does not swallow the rest of the text.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut inert = Vec::new();
    loop {
        match scan(text, separator, &inert) {
            Ok(segments) => return segments,
            Err(unclosed) => inert.push(unclosed),
        }
    }
}

/// One splitting pass; openers at the `inert` byte offsets are plain characters.
/// Returns the offset of the first unclosed opener on failure.
fn scan<'a>(text: &'a str, separator: char, inert: &[usize]) -> Result<Vec<&'a str>, usize> {
    let mut segments = Vec::new();
    let mut literal: Option<(usize, char)> = None;
    let mut escaped = false;
    let mut open_parens = Vec::new();
    let mut segment_start = 0;

    for (index, c) in text.char_indices() {
        if let Some((_, close)) = literal {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == close {
                literal = None;
            }
            continue;
        }

        if inert.contains(&index) {
            continue;
        }

        match c {
            '"' | '\'' | '`' => literal = Some((index, c)),
            '/' if regex_can_start(&text[..index]) => literal = Some((index, c)),
            '(' => open_parens.push(index),
            ')' => {
                open_parens.pop();
            }
            _ if c == separator && open_parens.is_empty() => {
                segments.push(&text[segment_start..index]);
                segment_start = index + c.len_utf8();
            }
            _ => {}
        }
    }

    if let Some((opened_at, _)) = literal {
        return Err(opened_at);
    }
    if let Some(&opened_at) = open_parens.first() {
        return Err(opened_at);
    }

    segments.push(&text[segment_start..]);
    Ok(segments)
}

/// Whether a `/` after `preceding` opens a regex literal rather than dividing
fn regex_can_start(preceding: &str) -> bool {
    let preceding = preceding.trim_end();
    match preceding.chars().last() {
        None => true,
        Some(c) if "(,=~!|".contains(c) => true,
        Some(_) => ends_with_keyword(preceding, "like"),
    }
}

fn ends_with_keyword(text: &str, keyword: &str) -> bool {
    let Some(split) = text.len().checked_sub(keyword.len()) else {
        return false;
    };
    if !text.is_char_boundary(split) || !text[split..].eq_ignore_ascii_case(keyword) {
        return false;
    }
    !text[..split]
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '@')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(query: &str) -> Vec<String> {
        get_fields(query)
    }

    #[test]
    fn test_fields_as_second_stage() {
        assert_eq!(
            fields("filter @message like /Error/ | fields @message"),
            vec!["@message"]
        );
    }

    #[test]
    fn test_no_fields_stage_is_empty() {
        assert!(fields("filter @message like /Error/").is_empty());
        assert!(fields("stats count(*) by bin(1h) | sort @timestamp desc").is_empty());
    }

    #[test]
    fn test_only_fields_stage() {
        assert_eq!(
            fields("fields @logStream, @timestamp"),
            vec!["@logStream", "@timestamp"]
        );
    }

    #[test]
    fn test_last_fields_stage_wins() {
        assert_eq!(
            fields("fields @timestamp, @logStream | limit 10 | fields @message"),
            vec!["@message"]
        );
    }

    #[test]
    fn test_fields_word_inside_filter_is_ignored() {
        assert_eq!(
            fields("filter @message like /fields/ | fields @logStream"),
            vec!["@logStream"]
        );
        assert_eq!(
            fields("fields @message | filter @message like 'fields @x'"),
            vec!["@message"]
        );
    }

    #[test]
    fn test_empty_query() {
        assert!(fields("").is_empty());
        assert!(fields("   ").is_empty());
    }

    #[test]
    fn test_empty_fields_stage_clears_earlier_fields() {
        assert!(fields("fields @timestamp | fields").is_empty());
        assert!(fields("fields @timestamp | fields  ,  , ").is_empty());
    }

    #[test]
    fn test_keyword_is_case_insensitive_and_anchored() {
        assert_eq!(fields("  FIELDS @message ,@log  "), vec!["@message", "@log"]);
        assert!(fields("fieldsx @message").is_empty());
        assert!(fields("display fields").is_empty());
    }

    #[test]
    fn test_multiline_fields_stage() {
        assert_eq!(
            fields("fields @timestamp,\n    @message\n| sort @timestamp desc"),
            vec!["@timestamp", "@message"]
        );
    }

    #[test]
    fn test_commas_inside_calls_do_not_split_fields() {
        assert_eq!(
            fields("fields concat(@logStream, '|', @message) as line, @timestamp"),
            vec!["concat(@logStream, '|', @message) as line", "@timestamp"]
        );
    }

    #[test]
    fn test_pipe_inside_quotes_is_not_a_stage_boundary() {
        assert_eq!(
            fields("filter @message = \"a | fields b\" | fields @message"),
            vec!["@message"]
        );
    }

    #[test]
    fn test_unbalanced_quote_is_treated_as_plain_text() {
        assert_eq!(fields("fields @message | filter @message = 'oops"), vec!["@message"]);
        assert_eq!(
            fields("filter @message = 'oops | fields @message"),
            vec!["@message"]
        );
        assert_eq!(fields("filter (@message | fields @logStream"), vec!["@logStream"]);
    }

    #[test]
    fn test_quotes_and_parens_inside_regex_are_inert() {
        assert_eq!(
            fields("filter @message like /can't connect/ | fields @message"),
            vec!["@message"]
        );
        assert_eq!(
            fields(r"filter @message like /\(/ | fields @logStream"),
            vec!["@logStream"]
        );
        assert_eq!(
            fields("filter @message =~ /a|b/ | fields @timestamp"),
            vec!["@timestamp"]
        );
    }

    #[test]
    fn test_escaped_slash_stays_inside_regex() {
        assert_eq!(
            fields(r"filter @message like /path\/to | x/ | fields @message"),
            vec!["@message"]
        );
    }

    #[test]
    fn test_division_is_not_a_regex() {
        assert_eq!(
            fields("fields @duration / 1000 as seconds, @requestId | fields @a/2, @b"),
            vec!["@a/2", "@b"]
        );
    }
}
