//! Keyword filtering and pagination over the abstract table.

pub mod filter;
pub mod paginate;

pub use filter::{filter, parse_search_terms, FilterResult};
pub use paginate::{paginate, Page};
