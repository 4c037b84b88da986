//! Request signing and response verification.
//!
//! Every request carries six control headers in the `x-ots-` namespace:
//! date, api version, access key id, instance name, content MD5, and a
//! signature over the others. The signature is `base64(HMAC-SHA1(secret,
//! canonical_string))` where the canonical string is
//!
//! ```text
//! {path}\nPOST\n{canonical_query}\n{sorted lowercase name:value lines}\n
//! ```
//!
//! Responses are verified on receipt: mandatory header presence (2xx only),
//! body MD5 against the declared digest, server date within a 15-minute
//! skew window, and an `Authorization: OTS <id>:<signature>` header whose
//! signature mirrors the request algorithm over the *response* control
//! headers plus the request path, without the method. That asymmetry is
//! service-defined behavior.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDateTime, Utc};
use hmac::{Hmac, Mac};
use http::{HeaderMap, HeaderValue, header};
use md5::Md5;
use sha1::{Digest, Sha1};

use crate::error::{ClientError, Error};

/// Protocol version sent in every request.
pub const API_VERSION: &str = "2014-08-08";

/// Control-header namespace included in the canonical string.
const HEADER_NAMESPACE: &str = "x-ots-";

const HEADER_DATE: &str = "x-ots-date";
const HEADER_API_VERSION: &str = "x-ots-apiversion";
const HEADER_ACCESS_KEY_ID: &str = "x-ots-accesskeyid";
const HEADER_INSTANCE_NAME: &str = "x-ots-instancename";
const HEADER_CONTENT_MD5: &str = "x-ots-contentmd5";
const HEADER_SIGNATURE: &str = "x-ots-signature";
const HEADER_CONTENT_TYPE: &str = "x-ots-contenttype";
pub(crate) const HEADER_REQUEST_ID: &str = "x-ots-requestid";

/// Authorization scheme prefix on response headers.
const AUTH_SCHEME: &str = "OTS ";

/// Date format of `x-ots-date`, RFC 1123 with a literal GMT zone.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Maximum tolerated difference between server and local clocks.
const MAX_CLOCK_SKEW_SECS: i64 = 15 * 60;

/// Computes request signatures and verifies response envelopes.
#[derive(Clone, Debug)]
pub(crate) struct Signer {
    access_key_id: String,
    access_key_secret: String,
    instance_name: String,
    api_version: String,
}

impl Signer {
    pub(crate) fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        instance_name: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Signer {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            instance_name: instance_name.into(),
            api_version: api_version.into(),
        }
    }

    /// Assemble the full header set for one outgoing request.
    pub(crate) fn make_request_headers(
        &self,
        path: &str,
        body: &[u8],
    ) -> Result<HeaderMap, Error> {
        let digest = BASE64.encode(Md5::digest(body));
        let date = Utc::now().format(DATE_FORMAT).to_string();

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, HEADER_DATE, &date)?;
        insert_header(&mut headers, HEADER_API_VERSION, &self.api_version)?;
        insert_header(&mut headers, HEADER_ACCESS_KEY_ID, &self.access_key_id)?;
        insert_header(&mut headers, HEADER_INSTANCE_NAME, &self.instance_name)?;
        insert_header(&mut headers, HEADER_CONTENT_MD5, &digest)?;

        let signature = self.request_signature(path, &headers);
        insert_header(&mut headers, HEADER_SIGNATURE, &signature)?;

        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(concat!("ots-rs/", env!("CARGO_PKG_VERSION"))),
        );
        Ok(headers)
    }

    /// Verify the response envelope: mandatory headers (2xx), body digest,
    /// and clock skew. Signature verification is separate; see
    /// [`Signer::check_authorization`].
    pub(crate) fn check_response_headers(
        &self,
        status: u16,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<(), Error> {
        if is_success(status) {
            for name in [
                HEADER_CONTENT_MD5,
                HEADER_REQUEST_ID,
                HEADER_DATE,
                HEADER_CONTENT_TYPE,
            ] {
                if !headers.contains_key(name) {
                    return Err(client_error(
                        format!("\"{name}\" is missing in response header."),
                        status,
                    ));
                }
            }
        }

        if let Some(declared) = headers.get(HEADER_CONTENT_MD5) {
            let digest = BASE64.encode(Md5::digest(body));
            if header_str(declared) != digest {
                return Err(client_error("MD5 mismatch in response.", status));
            }
        }

        if let Some(date) = headers.get(HEADER_DATE) {
            let server_time = NaiveDateTime::parse_from_str(header_str(date), DATE_FORMAT)
                .map_err(|_| client_error("Invalid date format in response.", status))?;
            let skew = Utc::now().signed_duration_since(server_time.and_utc());
            if skew.num_seconds().abs() > MAX_CLOCK_SKEW_SECS {
                return Err(client_error(
                    "The difference between date in response and system time is more than 15 minutes.",
                    status,
                ));
            }
        }

        Ok(())
    }

    /// Verify the response `Authorization` header against a mirrored
    /// canonical string. A missing header is only an error on a 2xx
    /// response; error responses are allowed to omit it.
    pub(crate) fn check_authorization(
        &self,
        path: &str,
        status: u16,
        headers: &HeaderMap,
    ) -> Result<(), Error> {
        let Some(auth) = headers.get(header::AUTHORIZATION) else {
            if is_success(status) {
                return Err(client_error(
                    "\"Authorization\" is missing in response header.",
                    status,
                ));
            }
            return Ok(());
        };

        let auth = header_str(auth);
        let Some(rest) = auth.strip_prefix(AUTH_SCHEME) else {
            return Err(client_error("Invalid Authorization in response.", status));
        };
        let Some((access_id, signature)) = rest.split_once(':') else {
            return Err(client_error("Invalid Authorization in response.", status));
        };
        if access_id != self.access_key_id {
            return Err(client_error("Invalid accesskeyid in response.", status));
        }
        if signature != self.response_signature(path, headers) {
            return Err(client_error("Invalid signature in response.", status));
        }
        Ok(())
    }

    fn request_signature(&self, path: &str, headers: &HeaderMap) -> String {
        let (uri, query) = split_query(path);
        let mut canonical = format!("{uri}\nPOST\n{}\n", canonicalize_query(query));
        canonical.push_str(&headers_string(headers));
        canonical.push('\n');
        self.sign(&canonical)
    }

    // The response canonical string carries no method line.
    fn response_signature(&self, path: &str, headers: &HeaderMap) -> String {
        let (uri, _) = split_query(path);
        let canonical = format!("{}\n{uri}", headers_string(headers));
        self.sign(&canonical)
    }

    fn sign(&self, canonical: &str) -> String {
        let mut mac = Hmac::<Sha1>::new_from_slice(self.access_key_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(canonical.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn client_error(message: impl Into<String>, status: u16) -> Error {
    Error::Client(ClientError::new(message).with_status(status))
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), Error> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| Error::Client(ClientError::new(format!("invalid value for header {name}"))))?;
    headers.insert(name, value);
    Ok(())
}

fn header_str(value: &HeaderValue) -> &str {
    value.to_str().unwrap_or_default()
}

fn split_query(path: &str) -> (&str, &str) {
    match path.split_once('?') {
        Some((uri, query)) => (uri, query),
        None => (path, ""),
    }
}

/// Sorted lowercase `name:value` lines over the control-header namespace,
/// excluding the signature header itself.
fn headers_string(headers: &HeaderMap) -> String {
    let mut lines: Vec<String> = headers
        .iter()
        .filter(|(name, _)| {
            let name = name.as_str();
            name.starts_with(HEADER_NAMESPACE) && name != HEADER_SIGNATURE
        })
        .map(|(name, value)| format!("{}:{}", name.as_str(), header_str(value).trim()))
        .collect();
    lines.sort();
    lines.join("\n")
}

/// URL-decode the query parameters, sort them by name, and re-encode.
fn canonicalize_query(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }
    let mut pairs: Vec<(String, String)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(name), percent_decode(value))
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", percent_encode(name), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' => out.push(byte as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn percent_decode(s: &str) -> String {
    let mut out = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                if let (Some(hi), Some(lo)) = (
                    bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                    bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
                ) {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> Signer {
        Signer::new("test-id", "test-secret", "test-instance", API_VERSION)
    }

    fn fixed_request_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (HEADER_DATE, "Tue, 12 Aug 2014 10:23:03 GMT"),
            (HEADER_API_VERSION, API_VERSION),
            (HEADER_ACCESS_KEY_ID, "test-id"),
            (HEADER_INSTANCE_NAME, "test-instance"),
            (HEADER_CONTENT_MD5, "1B2M2Y8AsgTpgAmY7PhCfg=="),
        ] {
            insert_header(&mut headers, name, value).unwrap();
        }
        headers
    }

    #[test]
    fn test_request_signature_is_deterministic() {
        let signer = signer();
        let headers = fixed_request_headers();
        let first = signer.request_signature("/PutRow", &headers);
        let second = signer.request_signature("/PutRow", &headers);
        assert_eq!(first, second);
    }

    #[test]
    fn test_request_signature_changes_with_any_header() {
        let signer = signer();
        let base = signer.request_signature("/PutRow", &fixed_request_headers());

        let mut changed = fixed_request_headers();
        insert_header(&mut changed, HEADER_INSTANCE_NAME, "other-instance").unwrap();
        assert_ne!(base, signer.request_signature("/PutRow", &changed));

        let mut changed = fixed_request_headers();
        insert_header(&mut changed, HEADER_DATE, "Tue, 12 Aug 2014 10:23:04 GMT").unwrap();
        assert_ne!(base, signer.request_signature("/PutRow", &changed));
    }

    #[test]
    fn test_signature_header_excluded_from_canonical_string() {
        let signer = signer();
        let mut headers = fixed_request_headers();
        let base = signer.request_signature("/PutRow", &headers);
        insert_header(&mut headers, HEADER_SIGNATURE, "bogus").unwrap();
        assert_eq!(base, signer.request_signature("/PutRow", &headers));
    }

    #[test]
    fn test_make_request_headers_complete_and_self_consistent() {
        let signer = signer();
        let headers = signer.make_request_headers("/PutRow", b"body").unwrap();
        for name in [
            HEADER_DATE,
            HEADER_API_VERSION,
            HEADER_ACCESS_KEY_ID,
            HEADER_INSTANCE_NAME,
            HEADER_CONTENT_MD5,
            HEADER_SIGNATURE,
        ] {
            assert!(headers.contains_key(name), "missing {name}");
        }
        let declared = header_str(headers.get(HEADER_SIGNATURE).unwrap()).to_string();
        assert_eq!(declared, signer.request_signature("/PutRow", &headers));
    }

    #[test]
    fn test_content_md5_matches_body() {
        let signer = signer();
        let headers = signer.make_request_headers("/PutRow", b"payload").unwrap();
        let expected = BASE64.encode(Md5::digest(b"payload"));
        assert_eq!(header_str(headers.get(HEADER_CONTENT_MD5).unwrap()), expected);
    }

    fn response_headers(body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let date = Utc::now().format(DATE_FORMAT).to_string();
        insert_header(&mut headers, HEADER_CONTENT_MD5, &BASE64.encode(Md5::digest(body)))
            .unwrap();
        insert_header(&mut headers, HEADER_REQUEST_ID, "request-1").unwrap();
        insert_header(&mut headers, HEADER_DATE, &date).unwrap();
        insert_header(&mut headers, HEADER_CONTENT_TYPE, "application/x.pb2").unwrap();
        headers
    }

    #[test]
    fn test_check_response_headers_accepts_valid_envelope() {
        let signer = signer();
        let headers = response_headers(b"body");
        assert!(signer.check_response_headers(200, &headers, b"body").is_ok());
    }

    #[test]
    fn test_check_response_headers_missing_header() {
        let signer = signer();
        let mut headers = response_headers(b"body");
        headers.remove(HEADER_REQUEST_ID);
        let err = signer
            .check_response_headers(200, &headers, b"body")
            .unwrap_err();
        assert!(err.to_string().contains("missing in response header"));
        assert_eq!(err.http_status(), Some(200));
    }

    #[test]
    fn test_check_response_headers_digest_mismatch() {
        let signer = signer();
        let headers = response_headers(b"original");
        let err = signer
            .check_response_headers(200, &headers, b"tampered")
            .unwrap_err();
        assert!(err.to_string().contains("MD5 mismatch"));
    }

    #[test]
    fn test_check_response_headers_invalid_date() {
        let signer = signer();
        let mut headers = response_headers(b"body");
        insert_header(&mut headers, HEADER_DATE, "not a date").unwrap();
        let err = signer
            .check_response_headers(200, &headers, b"body")
            .unwrap_err();
        assert!(err.to_string().contains("Invalid date format"));
    }

    #[test]
    fn test_check_response_headers_clock_skew() {
        let signer = signer();
        let mut headers = response_headers(b"body");
        insert_header(&mut headers, HEADER_DATE, "Tue, 12 Aug 2014 10:23:03 GMT").unwrap();
        let err = signer
            .check_response_headers(200, &headers, b"body")
            .unwrap_err();
        assert!(err.to_string().contains("more than 15 minutes"));
    }

    #[test]
    fn test_check_authorization_round_trip() {
        let signer = signer();
        let mut headers = response_headers(b"body");
        let signature = signer.response_signature("/GetRow", &headers);
        let auth = format!("OTS test-id:{signature}");
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&auth).unwrap());
        assert!(signer.check_authorization("/GetRow", 200, &headers).is_ok());
    }

    #[test]
    fn test_check_authorization_wrong_access_id() {
        let signer = signer();
        let mut headers = response_headers(b"body");
        let signature = signer.response_signature("/GetRow", &headers);
        let auth = format!("OTS other-id:{signature}");
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&auth).unwrap());
        let err = signer
            .check_authorization("/GetRow", 200, &headers)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid accesskeyid"));
    }

    #[test]
    fn test_check_authorization_bad_scheme() {
        let signer = signer();
        let mut headers = response_headers(b"body");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer token"),
        );
        let err = signer
            .check_authorization("/GetRow", 200, &headers)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid Authorization"));
    }

    #[test]
    fn test_check_authorization_missing_only_fails_on_success() {
        let signer = signer();
        let headers = response_headers(b"body");
        assert!(signer.check_authorization("/GetRow", 200, &headers).is_err());
        assert!(signer.check_authorization("/GetRow", 500, &headers).is_ok());
    }

    #[test]
    fn test_canonicalize_query_sorts_and_reencodes() {
        assert_eq!(canonicalize_query(""), "");
        assert_eq!(
            canonicalize_query("b=2&a=1"),
            "a=1&b=2"
        );
        assert_eq!(
            canonicalize_query("name=hello%20world"),
            "name=hello+world"
        );
    }

    #[test]
    fn test_percent_round_trip() {
        let original = "a b/c=d&e";
        assert_eq!(percent_decode(&percent_encode(original)), original);
    }
}
