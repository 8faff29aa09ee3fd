//! Data types for the tag registry
//!
//! This module contains the core tag records shared by the store and the wire layer.

mod tag;

pub use tag::{Tag, TagFields, TagIdentity};
