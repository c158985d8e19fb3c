use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelqError {
    /// Missing table, column, key or navigation metadata
    #[error("Schema error: {0}")]
    Schema(String),

    /// Malformed clause shape (non-literal LIMIT, literal-only comparison, ...)
    #[error("Compile error: {0}")]
    Compile(String),

    /// Predicate construct with no SQL mapping
    #[error("Unsupported predicate: `{method}` has no SQL mapping")]
    UnsupportedPredicate { method: String },

    /// More than one navigation field on the target matches the source type
    #[error("Ambiguous navigation from `{entity}` to `{target}`: candidates {candidates:?}")]
    AmbiguousNavigation {
        entity: String,
        target: String,
        candidates: Vec<String>,
    },

    /// A single-valued reference resolved to more than one row
    #[error("Duplicate key {key} for single-valued reference to `{entity}`")]
    DuplicateKey { entity: String, key: String },

    /// Error reported by the execution collaborator
    #[error("Execution error: {0}")]
    Execution(String),

    /// Error mapping rows or navigation values onto entities
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// No rows returned when at least one was expected
    #[error("No rows found")]
    NotFound,
}

/// Result type for compile and resolve operations
pub type Result<T> = std::result::Result<T, RelqError>;
