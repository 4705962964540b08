//! Query text compilation
//!
//! Produces the literal Insights query-language string for a [`QueryString`].

#![warn(clippy::all, rust_2018_idioms)]

use super::types::QueryString;

/// Query prefix used for free-text searches
pub const SEARCH_TERM_QUERY_PREFIX: &str = "fields @timestamp, @message | filter @message like /";

impl QueryString {
    /// Build the query string submitted to `StartQuery`
    ///
    /// Search terms are inserted into the `/.../` pattern without escaping, so a
    /// term containing `/` or regex metacharacters changes the meaning of the
    /// compiled filter.
    // TODO: decide with product whether search terms should be regex-escaped;
    // escaping changes which events existing searches match.
    pub fn compile(&self) -> String {
        match self {
            QueryString::Insights { raw } => raw.clone(),
            QueryString::SearchTerm { term } => {
                format!("{}{}/", SEARCH_TERM_QUERY_PREFIX, term)
            }
        }
    }
}
