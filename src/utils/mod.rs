//! Utility functions for input processing.
//!
//! - [`domain_normalizer`] - Domain validation and canonicalization

pub mod domain_normalizer;
