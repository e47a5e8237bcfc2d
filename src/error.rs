use thiserror::Error;

/// Convenient result alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by configuration loading, export and the simulation driver.
///
/// Search outcomes are never errors: a strategy that cannot find a path reports
/// it through [SearchResult](crate::SearchResult).
#[derive(Debug, Error)]
pub enum Error {
    /// The persisted grid configuration failed validation. The live grid is left untouched.
    #[error("invalid grid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A coordinate lies outside the grid it refers to.
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// A simulation was requested on a grid without both start and end set.
    #[error("start or end point not set")]
    MissingEndpoints,

    /// A simulation was requested without any algorithm selected.
    #[error("no algorithm selected")]
    NoAlgorithms,

    /// Wrapper for JSON (de)serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for CSV export errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Error {
        Error::InvalidConfig {
            reason: reason.into(),
        }
    }
}
