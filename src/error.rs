use thiserror::Error;

/// Why a single article produced no row. Recovered per article by the scanner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no birth/death date found")]
    NoDateFound,

    #[error("cannot parse {field} date from {raw:?}")]
    UnparsableDate { field: &'static str, raw: String },
}
