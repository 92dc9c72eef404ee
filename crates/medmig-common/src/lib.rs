//! Shared utilities for the medmig crates.
//!
//! Cells read from the admissions export arrive as Polars `AnyValue`s whose
//! concrete type depends on schema inference. These helpers give every crate
//! the same answer to "what text is in this cell" and "is this cell a number".

mod cell;

pub use cell::{
    any_to_f64, any_to_i64, any_to_string, format_numeric, is_blank, is_numeric_dtype, parse_f64,
    parse_i64,
};
