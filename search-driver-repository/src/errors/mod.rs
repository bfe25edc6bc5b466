//! Error types for the search driver repository.

mod search_error;

pub use search_error::SearchError;
