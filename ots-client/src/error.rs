//! Caller-facing error types.
//!
//! Every failed operation surfaces exactly one of two families:
//!
//! - [`ServiceError`]: the service understood the request and rejected it,
//!   carrying a machine code from the wire error envelope. Only these
//!   participate in retry decisions.
//! - [`ClientError`]: a fault detected on this side: request validation,
//!   a malformed response envelope, a signature/digest/clock verification
//!   failure, or a transport failure. Never retried.

use ots_core::ValueError;

use crate::transport::TransportError;

/// Error type for all client operations.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// A failure reported by the service, with a machine code.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A failure detected locally, before send or while validating a
    /// response.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// A service-reported failure.
#[derive(Clone, Debug, thiserror::Error)]
#[error("service error {code}: {message} (HTTP {http_status}, request id \"{request_id}\")")]
pub struct ServiceError {
    /// Machine code, e.g. `OTSServerBusy`. See [`ots_core::codes`].
    pub code: String,
    /// Human-readable message from the service.
    pub message: String,
    /// HTTP status of the response that carried the error.
    pub http_status: u16,
    /// The `x-ots-requestid` response header, empty when absent.
    pub request_id: String,
}

/// A locally detected failure.
#[derive(Clone, Debug, thiserror::Error)]
#[error("client error: {message}")]
pub struct ClientError {
    /// Human-readable reason.
    pub message: String,
    /// HTTP status of the offending response, when one was received.
    pub http_status: Option<u16>,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        ClientError {
            message: message.into(),
            http_status: None,
        }
    }

    /// Attach the HTTP status of the response that triggered this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }
}

impl Error {
    /// A local validation failure carrying a human-readable reason.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::Client(ClientError::new(message))
    }

    /// The service error, when this is one.
    pub fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Error::Service(e) => Some(e),
            Error::Client(_) => None,
        }
    }

    /// Whether this error was detected locally.
    pub fn is_client(&self) -> bool {
        matches!(self, Error::Client(_))
    }

    /// The HTTP status associated with this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Service(e) => Some(e.http_status),
            Error::Client(e) => e.http_status,
        }
    }
}

impl From<ValueError> for Error {
    fn from(err: ValueError) -> Self {
        Error::Client(ClientError::new(err.to_string()))
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Client(ClientError::new(err.to_string()))
    }
}
