//! Error types for sf-auth.
//!
//! Error messages avoid exposing credential data.

/// Result type alias for sf-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-auth operations.
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
    /// The login endpoint answered with a SOAP fault.
    #[error("SOAP fault: {code} - {message}")]
    SoapFault { code: String, message: String },

    /// The login endpoint answered with a non-2xx status and no fault body.
    #[error("HTTP error during authentication: {status}")]
    Http { status: u16 },

    /// The login request never produced a usable response.
    #[error("Transport error during authentication: {0}")]
    Transport(String),

    /// The login response was missing an expected element.
    #[error("Invalid login response: {0}")]
    InvalidResponse(String),

    /// Invalid credentials configuration.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Gateway construction or configuration error.
    #[error("Client error: {0}")]
    Client(String),
}

impl From<cloudy_sf_client::Error> for Error {
    fn from(err: cloudy_sf_client::Error) -> Self {
        let kind = match &err.kind {
            // The raw body may echo the submitted envelope; keep it out of
            // the message and only surface the status.
            cloudy_sf_client::ErrorKind::Http { status, .. } => ErrorKind::Http { status: *status },
            kind if kind.is_transport() => ErrorKind::Transport(kind.to_string()),
            kind => ErrorKind::Client(kind.to_string()),
        };
        Error::with_source(kind, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidResponse(err.to_string()), err)
    }
}
