//! # Utilities
//!
//! Shared helpers that are not part of the model itself.

pub mod threading;

pub use threading::build_thread_pool;
