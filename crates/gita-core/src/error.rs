use thiserror::Error;

/// Top-level error type for the Gita dialogue engine.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types where a richer taxonomy is needed (e.g.
/// `DialogueError`) and implement `From<GitaError>` so that the `?` operator
/// works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GitaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Search error: {0}")]
    Search(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for GitaError {
    fn from(err: toml::de::Error) -> Self {
        GitaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GitaError {
    fn from(err: toml::ser::Error) -> Self {
        GitaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GitaError {
    fn from(err: serde_json::Error) -> Self {
        GitaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, GitaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitaError::Corpus("missing embeddings".to_string());
        assert_eq!(err.to_string(), "Corpus error: missing embeddings");
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = GitaError::DimensionMismatch {
            expected: 384,
            actual: 512,
        };
        assert_eq!(
            err.to_string(),
            "Embedding dimension mismatch: expected 384, got 512"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GitaError = io_err.into();
        assert!(matches!(err, GitaError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        let err: GitaError = parsed.unwrap_err().into();
        assert!(matches!(err, GitaError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        let err: GitaError = parsed.unwrap_err().into();
        assert!(matches!(err, GitaError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_variants_constructible() {
        let errors: Vec<GitaError> = vec![
            GitaError::Config("test".into()),
            GitaError::Corpus("test".into()),
            GitaError::DimensionMismatch {
                expected: 1,
                actual: 2,
            },
            GitaError::Search("test".into()),
            GitaError::Embedding("test".into()),
            GitaError::Generation("test".into()),
            GitaError::Storage("test".into()),
            GitaError::Speech("test".into()),
            GitaError::Serialization("test".into()),
        ];
        assert_eq!(errors.len(), 9);
    }
}
