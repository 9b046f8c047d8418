//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, search and export calls into front-end operations.
//! - Keep front ends decoupled from storage details.

pub mod reflection_service;
