//! OpenSearch implementation of the search transport.
//!
//! This module provides a concrete implementation of `SearchTransport`
//! using OpenSearch as the backend.

mod client;
mod request;

pub use client::OpenSearchTransport;
