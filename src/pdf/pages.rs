//! Page list parsing

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid page number {token:?} at position {position}")]
pub struct PageRangeError {
    pub token: String,
    pub position: usize,
}

/// Parse a comma separated page list such as `"1, 3,5"`.
///
/// Order and duplicates are kept as given. Every token must be a base-10
/// integer after trimming, so empty tokens (and an empty string) fail.
/// Zero and negative numbers pass; callers that need positive pages check
/// that themselves.
pub fn parse_page_ranges(text: &str) -> Result<Vec<i64>, PageRangeError> {
    text.split(',')
        .enumerate()
        .map(|(position, token)| {
            let token = token.trim();
            token.parse::<i64>().map_err(|_| PageRangeError {
                token: token.to_string(),
                position,
            })
        })
        .collect()
}
