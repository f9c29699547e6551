//! Column-wise scaling engine: online statistics per column, derivation of
//! a linear map into a target range, and the persisted settings format.

mod accumulator;
pub mod codec;
mod format;
mod parameters;
mod table;
mod token;

use std::borrow::Cow;

use common::Result;

pub use accumulator::{ColumnAccumulator, Extent, StatisticsMode};
pub use codec::{read_settings, write_settings};
pub use format::{format_value, ZERO_EPSILON};
pub use parameters::{standard_normal_cdf, ScalingParameters};
pub use table::{ColumnFitter, ColumnParameters, ParameterTable};
pub use token::Token;

/// Maps a raw column token to its output text.
pub trait Scaler {
    fn adjust<'a>(&self, raw: &'a str) -> Result<Cow<'a, str>>;
}
