//! dbw-core: numeric foundation for the drive-by-wire control crates.
//!
//! Contains:
//! - numeric (Real + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::CoreError;
pub use numeric::*;
