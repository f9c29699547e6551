pub mod config;
pub mod error;
pub mod ranges;

pub use config::*;
pub use error::*;
pub use ranges::{parse_column_ranges, ColumnSet};
