//! Centralized error handling
//!
//! # Usage
//!
//! ```rust
//! use edm_orgs::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for import pipeline Results
pub type ImportResult<T> = Result<T, ImportError>;
