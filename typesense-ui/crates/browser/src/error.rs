use client::ServiceError;
use thiserror::Error;

/// Failure recorded in the browser's error field.
///
/// Displays as the underlying service message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    /// Schema fetch failed; no schema is loaded.
    #[error("{source}")]
    SchemaLoad {
        collection: String,
        #[source]
        source: ServiceError,
    },
    /// Search failed; the schema stays loaded, documents are cleared.
    #[error("{source}")]
    Search {
        collection: String,
        #[source]
        source: ServiceError,
    },
}

impl BrowserError {
    pub fn collection(&self) -> &str {
        match self {
            Self::SchemaLoad { collection, .. } | Self::Search { collection, .. } => collection,
        }
    }

    pub const fn service_error(&self) -> &ServiceError {
        match self {
            Self::SchemaLoad { source, .. } | Self::Search { source, .. } => source,
        }
    }
}
