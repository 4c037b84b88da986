//! Scripted transport for driving the client without a network.
//!
//! Success responses are fully signed with the test credentials, so the
//! client's envelope verification runs for real against them.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use chrono::Utc;
use futures::future::BoxFuture;
use hmac::{Hmac, Mac};
use http::{HeaderMap, HeaderValue, header};
use md5::Md5;
use ots_client::{RawResponse, Transport, TransportError};
use ots_core::pb;
use prost::Message;
use sha1::{Digest, Sha1};

pub const ACCESS_ID: &str = "test-id";
pub const ACCESS_SECRET: &str = "test-secret";
pub const INSTANCE: &str = "test-instance";

type Responder = Box<dyn Fn(&str) -> Result<RawResponse, TransportError> + Send + Sync>;

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Responder>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Script a signed 2xx response with the given body.
    pub fn push_ok(&self, body: Vec<u8>) {
        self.push(Box::new(move |path| Ok(signed_ok(path, &body))));
    }

    /// Script an error-envelope response.
    pub fn push_service_error(&self, status: u16, code: &str, message: &str) {
        let code = code.to_string();
        let message = message.to_string();
        self.push(Box::new(move |_| Ok(service_error(status, &code, &message))));
    }

    /// Script an arbitrary raw response.
    pub fn push_raw(&self, response: RawResponse) {
        self.push(Box::new(move |_| Ok(response.clone())));
    }

    /// Script a transport-level failure.
    pub fn push_transport_error(&self, message: &str) {
        let message = message.to_string();
        self.push(Box::new(move |_| Err(TransportError::new(message.clone()))));
    }

    fn push(&self, responder: Responder) {
        self.responses.lock().unwrap().push_back(responder);
    }

    /// How many requests the client actually sent.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request_paths(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send<'a>(
        &'a self,
        path: &'a str,
        _headers: HeaderMap,
        _body: Bytes,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        self.requests.lock().unwrap().push(path.to_string());
        let responder = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left");
        let result = responder(path);
        Box::pin(async move { result })
    }
}

/// A 200 response whose control headers and authorization signature verify
/// under the test credentials.
pub fn signed_ok(path: &str, body: &[u8]) -> RawResponse {
    let mut headers = HeaderMap::new();
    let digest = BASE64.encode(Md5::digest(body));
    let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    headers.insert("x-ots-contentmd5", HeaderValue::from_str(&digest).unwrap());
    headers.insert("x-ots-requestid", HeaderValue::from_static("mock-request-id"));
    headers.insert("x-ots-date", HeaderValue::from_str(&date).unwrap());
    headers.insert("x-ots-contenttype", HeaderValue::from_static("application/x.pb2"));

    let mut lines: Vec<String> = headers
        .iter()
        .map(|(name, value)| format!("{}:{}", name.as_str(), value.to_str().unwrap().trim()))
        .collect();
    lines.sort();
    let canonical = format!("{}\n{path}", lines.join("\n"));
    let mut mac = Hmac::<Sha1>::new_from_slice(ACCESS_SECRET.as_bytes()).unwrap();
    mac.update(canonical.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("OTS {ACCESS_ID}:{signature}")).unwrap(),
    );

    RawResponse {
        status: 200,
        reason: "OK".to_string(),
        headers,
        body: Bytes::from(body.to_vec()),
    }
}

/// An error response carrying the wire error envelope and a request id.
pub fn service_error(status: u16, code: &str, message: &str) -> RawResponse {
    let envelope = pb::Error {
        code: code.to_string(),
        message: Some(message.to_string()),
    };
    let mut headers = HeaderMap::new();
    headers.insert("x-ots-requestid", HeaderValue::from_static("mock-request-id"));
    RawResponse {
        status,
        reason: "Error".to_string(),
        headers,
        body: Bytes::from(envelope.encode_to_vec()),
    }
}
