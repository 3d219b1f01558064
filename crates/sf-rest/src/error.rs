//! Error types for sf-rest.

/// Result type alias for sf-rest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-rest operations.
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

    /// Returns the HTTP status if the service answered with a non-2xx status.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body of a non-2xx response.
    pub fn body(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true if the request never produced a usable response.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Non-2xx response. `body` is the raw response body.
    #[error("HTTP error: {status} {}", cloudy_sf_client::security::redact(.body))]
    Http { status: u16, body: String },

    /// Connection failure, timeout or undecodable response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A record in an update or delete batch has no usable `Id`.
    #[error("Record {record_index} of batch {batch_index} has no Id/id field")]
    MissingIdentifier {
        batch_index: usize,
        record_index: usize,
    },

    /// The service returned a different number of outcomes than records sent.
    #[error("Batch {batch_index}: sent {expected} records but received {actual} results")]
    ResultArityMismatch {
        batch_index: usize,
        expected: usize,
        actual: usize,
    },

    /// The response did not have the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A page reported `done: false` without a `nextRecordsUrl`.
    #[error("Page {page} is not done but carries no nextRecordsUrl")]
    IncompletePagination { page: usize },

    /// A nested collection claims a cursor but has no record list.
    #[error("Malformed nested collection in field '{field}'")]
    MalformedNestedCollection { field: String },

    /// The same pagination cursor was returned twice in one read.
    #[error("Pagination cursor returned twice: {cursor}")]
    RepeatedCursor { cursor: String },

    /// Nested collections exceed the supported depth.
    #[error("Nested collections deeper than {max_depth} levels")]
    NestingTooDeep { max_depth: usize },

    /// An object or field name is not a valid API name.
    #[error("Invalid API name: {0}")]
    InvalidName(String),

    /// Invalid argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Other client failure (configuration, URL).
    #[error("Client error: {0}")]
    Client(String),
}

impl From<cloudy_sf_client::Error> for Error {
    fn from(err: cloudy_sf_client::Error) -> Self {
        let kind = match &err.kind {
            cloudy_sf_client::ErrorKind::Http { status, body } => ErrorKind::Http {
                status: *status,
                body: body.clone(),
            },
            kind if kind.is_transport() => ErrorKind::Transport(kind.to_string()),
            kind => ErrorKind::Client(kind.to_string()),
        };
        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}
