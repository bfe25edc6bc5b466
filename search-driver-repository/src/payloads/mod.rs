//! Request payload builders.
//!
//! A payload is the JSON object handed to the transport: routing keys
//! (`index`, `type`, `id`) at the top level and the request `body` below them.

mod payload;
mod raw;

pub use payload::Payload;
pub use raw::{is_empty_value, RawPayload};
