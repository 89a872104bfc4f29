//! Picstash-Common: shared error handling.
//!
//! This crate provides the unified error type and result alias used across
//! the picstash workspace.
//!
//! # Examples
//!
//! ```
//! use picstash_common::{Error, Result};
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("image 42"))
//! }
//! ```

pub mod error;

pub use error::{Error, Result};
