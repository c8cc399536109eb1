//! rill Core - values, rows, and errors shared by every rill crate.
//!
//! - `Value`: a single cell (null, boolean, number, string)
//! - `Row`: an ordered column-name to value mapping
//! - `pattern_match`: compiled LIKE / ILIKE patterns
//! - `Error`: errors raised while assembling pipelines
//!
//! # Example
//!
//! ```rust
//! use rill_core::{values_equal, Row, Value};
//!
//! let row = Row::new().with("id", 1).with("name", "Alice");
//!
//! assert_eq!(row.get("name"), Some(&Value::String("Alice".into())));
//! assert!(row.get("email").is_none());
//! assert!(values_equal(row.get("id").unwrap(), &Value::Float64(1.0)));
//! ```

#![no_std]

extern crate alloc;

mod error;
pub mod pattern_match;
mod row;
mod value;

pub use error::{Error, Result};
pub use row::Row;
pub use value::{compare_values, values_equal, Value, NULL};
