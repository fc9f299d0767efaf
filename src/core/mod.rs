//! Core types and error handling shared across the pipeline
//!
//! This module hosts the error taxonomy used by every stage of an
//! aggregation run. Components return [`BundlepackError`] for the failure
//! cases the tool defines for itself and plain `anyhow` errors for ambient
//! I/O, with context attached at each call boundary.

pub mod error;

pub use error::{BundlepackError, ErrorContext, user_friendly_error};
