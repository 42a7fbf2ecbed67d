//! URL handling module for Site-Mirror
//!
//! This module provides homepage normalization, query/fragment stripping, host
//! extraction for the storage layout, and crawl-scope resolution of extracted links.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{host_segment, normalize_url, strip_query_and_fragment};
pub use scope::{resolve_link, same_origin, Resolution};
