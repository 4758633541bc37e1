/// Error Module
///
/// Defines the error types surfaced by dbwrap. Connection-time failures are
/// reported through three coarse categories; statement failures surface the
/// driver's own error unmodified.
use thiserror::Error;
use tracing::error;

/// Message for a missing or disabled database driver.
pub const DRIVER_UNAVAILABLE_MESSAGE: &str =
    "Could not open a database connection. Is the driver installed or enabled?";

/// Message for a database that does not exist on the server.
pub const DATABASE_NOT_FOUND_MESSAGE: &str =
    "Could not open a database connection. Does the database exist?";

/// Message for every other connection failure, bad credentials included.
pub const AUTHENTICATION_FAILED_MESSAGE: &str =
    "Could not open a database connection. Please check your username and password.";

/// An error reported by an underlying database driver.
///
/// Carries the driver's message verbatim and, when the failure came from a
/// backend library, the original error as its source.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct DriverError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl DriverError {
    /// Creates a driver error from a bare message
    pub fn new(message: impl Into<String>) -> Self {
        DriverError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a driver error that wraps a backend error, reusing its message
    pub fn wrap<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DriverError {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates a driver error with its own message and a backend error as source
    pub fn with_source<E>(message: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DriverError {
            message: message.into(),
            source: Some(Box::new(error)),
        }
    }

    /// The raw message reported by the driver
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<rusqlite::Error> for DriverError {
    fn from(error: rusqlite::Error) -> Self {
        DriverError::wrap(error)
    }
}

#[cfg(feature = "mysql")]
impl From<mysql::Error> for DriverError {
    fn from(error: mysql::Error) -> Self {
        DriverError::wrap(error)
    }
}

/// Error type for dbwrap operations.
///
/// The three connection variants are only ever produced by
/// [`classify_connect_failure`]. The catch-all variant never carries a cause.
#[derive(Error, Debug)]
pub enum DbError {
    /// The driver for the requested protocol is not compiled in or unknown
    #[error("{}", DRIVER_UNAVAILABLE_MESSAGE)]
    DriverUnavailable {
        #[source]
        source: Option<DriverError>,
    },

    /// The target database does not exist
    #[error("{}", DATABASE_NOT_FOUND_MESSAGE)]
    DatabaseNotFound {
        #[source]
        source: Option<DriverError>,
    },

    /// Invalid credentials, or any connection failure not matched above
    #[error("{}", AUTHENTICATION_FAILED_MESSAGE)]
    AuthenticationOrConnectionFailed {
        #[source]
        source: Option<DriverError>,
    },

    /// A prepare, bind or execute failure, reported as the driver worded it
    #[error(transparent)]
    StatementExecutionFailed(#[from] DriverError),

    /// The connection has been closed
    #[error("Not connected to a database")]
    NotConnected,

    /// Settings file loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Returns the underlying driver error attached to this error, if any
    pub fn cause(&self) -> Option<&DriverError> {
        match self {
            DbError::DriverUnavailable { source }
            | DbError::DatabaseNotFound { source }
            | DbError::AuthenticationOrConnectionFailed { source } => source.as_ref(),
            DbError::StatementExecutionFailed(driver_error) => Some(driver_error),
            DbError::NotConnected | DbError::Config(_) => None,
        }
    }
}

/// Type alias for Result with DbError as the error type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Maps a failed connection attempt onto one of the three connection errors.
///
/// The driver's raw message is logged before matching. Matching is done on
/// the lower-cased message and the first hit wins.
pub fn classify_connect_failure(failure: DriverError) -> DbError {
    error!("{}", failure.message());

    let message = failure.message().to_lowercase();
    if message.contains("could not find driver") {
        DbError::DriverUnavailable {
            source: Some(failure),
        }
    } else if message.contains("unknown database") {
        DbError::DatabaseNotFound {
            source: Some(failure),
        }
    } else {
        // No cause on the catch-all path.
        DbError::AuthenticationOrConnectionFailed { source: None }
    }
}
