//! Core layer - value model and pure helpers
//!
//! Nothing in here does I/O; everything can be called from any thread.

/// Nested value model and type predicates
pub mod value;

/// Iterative, cycle-aware flattening
pub mod flatten;

/// Running totals
pub mod sequence;

/// Unique id generation
pub mod ident;
