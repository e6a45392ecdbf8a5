//! Error types for `daybook`.

/// Errors that can occur while loading, persisting or configuring a board.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A date string could not be parsed as a calendar day.
    #[error("Invalid date '{0}' (expected D/M/YYYY)")]
    InvalidDate(String),

    /// A category name is not one of the known categories.
    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    /// The home directory could not be determined.
    #[error("Could not determine the data directory (no home directory)")]
    NoDataDir,
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
