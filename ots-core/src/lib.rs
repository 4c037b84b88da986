//! Core protocol types for ots-rs.
//!
//! This crate holds the pieces of the table-store protocol that carry no
//! I/O: the wire schema ([`pb`]), the typed value codec ([`Value`]), and the
//! catalog of well-known service error codes ([`codes`]). The client crate
//! (`ots-client`) builds the request/response, signing, and retry layers on
//! top of these.

pub mod codes;
pub mod pb;
mod value;

pub use value::{Value, ValueError, checked_i32};
