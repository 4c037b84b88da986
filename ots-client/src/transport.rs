//! The consumed transport boundary.
//!
//! This layer does not manage sockets or connection pools. It hands a fully
//! signed request (path, headers, body) to a [`Transport`] and gets back the
//! raw response envelope. Any transport-level failure is surfaced as a
//! [`TransportError`], which the client classifies as a local error and
//! never retries.

use bytes::Bytes;
use futures::future::BoxFuture;
use http::HeaderMap;

/// A raw HTTP response as seen at the transport boundary.
#[derive(Clone, Debug)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// HTTP reason phrase.
    pub reason: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body bytes.
    pub body: Bytes,
}

/// A connection- or timeout-level failure below the protocol layer.
#[derive(Clone, Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        TransportError(message.into())
    }
}

/// Sends one signed request and returns the raw response.
///
/// Every operation is a single POST; the method is fixed by the protocol, so
/// only the path varies. Implementations own timeouts and pooling; this
/// layer imposes no bound on an in-flight request beyond the retry ceiling.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        path: &'a str,
        headers: HeaderMap,
        body: Bytes,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send<'a>(
        &'a self,
        path: &'a str,
        headers: HeaderMap,
        body: Bytes,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        (**self).send(path, headers, body)
    }
}
