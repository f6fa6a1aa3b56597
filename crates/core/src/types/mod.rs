//! Core types for Clementine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod specification;
pub mod status;

pub use id::*;
pub use specification::Specification;
pub use status::*;
