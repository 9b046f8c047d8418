//! Domain model for journal reflections.
//!
//! # Responsibility
//! - Define the persisted record shape shared by store, search and export.
//! - Define explicit per-session form state for front ends.
//!
//! # Invariants
//! - A reflection has no identity besides its position in the stored sequence.
//! - The model performs no validation; empty fields are legal.

pub mod reflection;
