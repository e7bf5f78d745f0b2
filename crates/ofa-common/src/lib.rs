//! Shared utilities for the oneforall crates.
//!
//! Polars `AnyValue` conversions and the decimal parsing used for values that
//! arrive as text with a comma separator.

pub mod polars;

pub use polars::{any_to_f64, any_to_key, any_to_string, parse_decimal, parse_f64};
