//! Error types for the strayfind-catalog crate

/// Errors raised while fetching catalog data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Transport-level HTTP failure
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        /// Request URL
        url: String,
        /// Underlying reqwest error
        #[source]
        source: reqwest::Error,
    },
    /// Server answered with a non-success status
    #[error("API returned status {status} for {url}: {body}")]
    Status {
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },
    /// The API key lacks admin privileges
    #[error("API key does not have admin privileges")]
    NotAdmin,
    /// Response body could not be decoded
    #[error("Failed to decode {what}: {source}")]
    Decode {
        /// What was being decoded
        what: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
    /// The server's `nextPage` value was not a page number
    #[error("Invalid nextPage value {0:?}")]
    InvalidNextPage(String),
    /// Database connection, query or decode failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Fetch was cancelled before completion
    #[error("Catalog fetch cancelled")]
    Cancelled,
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
