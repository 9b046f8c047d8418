//! Search over the in-memory reflection collection.
//!
//! # Responsibility
//! - Filter loaded reflections by a user term.
//! - Keep storage positions attached to filtered rows.

pub mod filter;
