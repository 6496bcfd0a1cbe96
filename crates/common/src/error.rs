/// CourseRec error types
#[derive(Debug, thiserror::Error)]
pub enum CourseRecError {
    /// Missing or malformed input columns
    #[error("Schema error: {0}")]
    Schema(String),

    /// Vectors with inconsistent lengths
    #[error("Dimension mismatch at row {row}: expected {expected}, found {found}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        row: usize,
    },

    /// Name lookup miss
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query index out of range
    #[error("Index {index} out of range for corpus of {len} items")]
    Index { index: usize, len: usize },

    /// Query issued before the similarity matrix was built
    #[error("Similarity engine is not ready: call build() first")]
    NotReady,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CourseRecError {
    /// Create schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    /// Create not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

// HTTP response conversion
impl CourseRecError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Index { .. } => 400,
            Self::NotFound(_) => 404,
            Self::NotReady => 503,
            Self::Schema(_) => 500,
            Self::DimensionMismatch { .. } => 500,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 400,
            Self::Csv(_) => 500,
            Self::Other(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CourseRecError::not_found("x").status_code(), 404);
        assert_eq!(CourseRecError::Index { index: 3, len: 2 }.status_code(), 400);
        assert_eq!(CourseRecError::NotReady.status_code(), 503);
        assert_eq!(CourseRecError::schema("missing").status_code(), 500);
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = CourseRecError::DimensionMismatch {
            expected: 3,
            found: 2,
            row: 7,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch at row 7: expected 3, found 2"
        );
    }
}
