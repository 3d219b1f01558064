//! Error types for sf-codegen.

/// Result type alias for sf-codegen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-codegen operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Describing an object failed.
    #[error("Describe failed: {0}")]
    Rest(String),

    /// Writing generated files failed.
    #[error("IO error: {0}")]
    Io(String),

    /// The generator was asked to do something it cannot.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<cloudy_sf_rest::Error> for Error {
    fn from(err: cloudy_sf_rest::Error) -> Self {
        Error::with_source(ErrorKind::Rest(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_io_error_keeps_source() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err.kind, ErrorKind::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_config_display() {
        let err = Error::new(ErrorKind::Config("no sobjects".into()));
        assert_eq!(err.to_string(), "Configuration error: no sobjects");
    }
}
