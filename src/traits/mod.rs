//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - the HTTP transport used by the client

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, Response};
