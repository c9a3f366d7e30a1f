use thiserror::Error;

/// Failure taxonomy for one ingestion cycle.
///
/// `Fetch`, `Schema`, and `Persist` are scoped to a single source's task:
/// they are caught, logged, and counted without touching other sources.
/// `Registry` is fatal to the whole cycle — without the source list there
/// is nothing to dispatch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Network failure, timeout, non-2xx status, or a response body that is
    /// not a JSON array, for one source.
    ///
    /// The field is `source_name` rather than `source` because thiserror
    /// reserves a field of that name for [`std::error::Error::source`].
    #[error("fetch from '{source_name}' failed: {cause}")]
    Fetch { source_name: String, cause: String },

    /// The stored mapping schema could not be parsed as an object of
    /// string paths.
    #[error("invalid mapping schema: {cause}")]
    Schema { cause: String },

    /// The record sink rejected a write (uniqueness violation, malformed
    /// normalized record, or database failure).
    #[error("persist failed: {cause}")]
    Persist { cause: String },

    /// The source registry could not be queried.
    #[error("source registry unavailable: {cause}")]
    Registry { cause: String },
}

impl IngestError {
    pub fn fetch(source_name: impl Into<String>, cause: impl ToString) -> Self {
        Self::Fetch {
            source_name: source_name.into(),
            cause: cause.to_string(),
        }
    }

    pub fn schema(cause: impl ToString) -> Self {
        Self::Schema {
            cause: cause.to_string(),
        }
    }

    pub fn persist(cause: impl ToString) -> Self {
        Self::Persist {
            cause: cause.to_string(),
        }
    }

    pub fn registry(cause: impl ToString) -> Self {
        Self::Registry {
            cause: cause.to_string(),
        }
    }

    /// Whether this error aborts the whole cycle rather than one source.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Registry { .. })
    }
}
