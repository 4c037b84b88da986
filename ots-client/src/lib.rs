//! Client-side protocol layer for the ots table-store service.
//!
//! This crate turns typed table and row operations into signed,
//! protobuf-encoded HTTP requests, verifies and decodes the signed
//! responses, classifies failures, and decides when a failed operation is
//! safe to retry. It does **not** implement a transport: callers supply
//! anything implementing [`Transport`] (send path + headers + body, get
//! back status + headers + body), and the protocol layer does the rest.
//!
//! ## Layers
//!
//! - **Value codec** (`ots-core`): the closed set of typed wire values with
//!   lossless encode/decode.
//! - **Message codec** ([`request`]/[`response`] via the operation methods):
//!   one typed request/response pair per operation, with every structural
//!   invariant validated locally before a single byte is sent.
//! - **Signing**: six `x-ots-` control headers per request, an HMAC-SHA1
//!   signature over a canonical string, and full verification of the
//!   response envelope (header presence, body MD5, clock skew, mirrored
//!   response signature).
//! - **Retry** ([`RetryPolicy`]): error-code-driven decisions with bounded,
//!   half-jittered exponential backoff. [`DefaultRetryPolicy`],
//!   [`NoRetryPolicy`], and [`NoDelayRetryPolicy`] are provided; anything
//!   implementing the trait can be injected.
//!
//! ## Example
//!
//! ```ignore
//! use ots_client::{Client, Condition, PrimaryKey, Attributes, Direction, CapacityUnit};
//! use ots_core::Value;
//!
//! let client = Client::builder("access-id", "access-secret", "my-instance")
//!     .build(transport)?;
//!
//! // Single-row write with a precondition.
//! let key = PrimaryKey::from_pairs([("pk", "A")])?;
//! let attributes = Attributes::from_pairs([("col", 7i64)])?;
//! client.put_row("myTable", Condition::ExpectNotExist, key, attributes).await?;
//!
//! // Scan a key interval, accumulating consumed capacity.
//! let mut tally = CapacityUnit::default();
//! let start = PrimaryKey::from_pairs([("pk", Value::InfMin)])?;
//! let end = PrimaryKey::from_pairs([("pk", Value::InfMax)])?;
//! let mut scan = client.range_scan(
//!     "myTable", Direction::Forward, start, end, None, Some(100), &mut tally,
//! )?;
//! while let Some(row) = scan.next().await {
//!     let row = row?;
//!     println!("{:?}", row.primary_key);
//! }
//! ```
//!
//! ## Errors
//!
//! Every failure is either a [`ServiceError`] (the service rejected the
//! request with a machine code; candidates for retry) or a [`ClientError`]
//! (local validation, a malformed or unverifiable response, or a transport
//! failure; never retried). Batch operations are the exception to
//! error-as-failure: per-item outcomes are data in the response records,
//! and only a structurally bad envelope raises.

mod auth;
mod builder;
mod client;
mod error;
pub mod request;
pub mod response;
mod retry;
mod scan;
mod transport;
mod types;

pub use builder::ClientBuilder;
pub use client::Client;
pub use error::{ClientError, Error, ServiceError};
pub use request::{
    BatchGetTable, BatchWriteTable, DeleteRowItem, GetRange, Operation, PutRowItem, UpdateRowItem,
};
pub use response::{
    BatchGetRowResponse, BatchGetTableResult, BatchWriteRowResponse, BatchWriteTableResult,
    DescribeTableResponse, GetRangeResponse, GetRowResponse, ListTableResponse, RowResult,
    UpdateTableResponse, WriteResult,
};
pub use retry::{DefaultRetryPolicy, NoDelayRetryPolicy, NoRetryPolicy, RetryPolicy};
pub use scan::RangeScan;
pub use transport::{RawResponse, Transport, TransportError};
pub use types::{
    Attributes, CapacityUnit, ColumnKind, Condition, Direction, PrimaryKey, ReservedThroughput,
    ReservedThroughputDetails, Row, RowUpdate, TableMeta,
};

// Re-export the value types users need to build keys and attributes.
pub use ots_core::{Value, ValueError, codes};
