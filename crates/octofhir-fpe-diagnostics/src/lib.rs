//! Editor diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the editor crates:
//! - structured `FPE####` error codes with static descriptions
//! - token locations (which binding, which token, which nested argument)
//! - diagnostics reported by program checks
//! - the workspace-level [`FpeError`] type

mod error;
mod error_code;
mod location;

pub use error::*;
pub use error_code::*;
pub use location::*;

/// Result type for editor operations that can fail outside the type system
pub type Result<T> = std::result::Result<T, FpeError>;
