//! Utility functions for code generation and request handling.
//!
//! - [`code_generator`] - Short code generation and shape checks
//! - [`public_url`] - Public base URL of short links
//! - [`db_error`] - Database error classification

pub mod code_generator;
pub mod db_error;
pub mod public_url;
