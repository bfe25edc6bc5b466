//! # Search Driver Shared
//!
//! Plain data types shared between the search driver crates: sort orders,
//! filter clauses, highlights and parsed search results.

pub mod filter;
pub mod highlight;
pub mod results;
pub mod sort;

pub use filter::{group_filters, ClauseGroup, Filter, Operator};
pub use highlight::Highlight;
pub use results::{total_hits, SearchHit, SearchResults};
pub use sort::{SortDirection, SortOrder};
