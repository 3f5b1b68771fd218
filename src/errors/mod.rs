//! Error types and error handling for semantic analysis.
//!
//! This module defines the errors raised while checking a program. It
//! includes:
//!
//! - Error structures with source position information
//! - One variant per rule the analyzer enforces
//! - Error formatting against the checked source text
//! - Helpful error messages and suggestions

pub mod errors;
