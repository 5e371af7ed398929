//! SQL rendering primitives.
//!
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations
//! - [`value`] - Scalar values and literal escaping

pub mod dialect;
pub mod token;
pub mod value;


pub use dialect::{DateBucket, Dialect, SqlDialect};
pub use token::{Token, TokenStream};
pub use value::{Value, ValueEscaper};
