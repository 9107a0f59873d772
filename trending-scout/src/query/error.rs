//! Query building error types.

use thiserror::Error;

/// Error produced while building query specifications.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Lookback window outside the supported range.
    #[error("Lookback of {0} days is outside the supported range 1-30")]
    InvalidLookback(u32),

    /// Category name not in the fixed set.
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    /// Natural-language or raw input was blank.
    #[error("Search text is empty")]
    EmptyQuery,

    /// A `key:value` token could not be parsed as a qualifier.
    #[error("Invalid qualifier '{0}'")]
    InvalidQualifier(String),

    /// Sort field name not recognized.
    #[error("Unknown sort field '{0}'")]
    UnknownSortField(String),
}
