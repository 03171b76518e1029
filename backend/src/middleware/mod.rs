//! Request middleware.
//!
//! Cross-cutting request lifecycle concerns. Currently only trace
//! correlation.

pub mod trace;

pub use trace::Trace;
