//! Interface definitions for the search driver.
//!
//! This module defines the seams the driver is built around: the transport
//! to the search engine, the model capability trait, the primary store used
//! when mapping hits back to models, and search rules.

mod search_rule;
mod search_transport;
mod searchable;

pub use search_rule::SearchRule;
pub use search_transport::{SearchCallback, SearchTransport};
pub use searchable::{ModelStore, Searchable, SOFT_DELETED_FIELD};
