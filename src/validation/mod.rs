//! Tag field validation
//!
//! This module converts tags from their external string form into typed values.

mod tag;

pub use tag::{parse_tag, parse_tags};
