//! Fit and apply flows over CSV record streams.

mod input;
mod pipeline;

pub use input::{next_line, ReadSeek, RewindableInput};
pub use pipeline::{apply, fit, transform_stream, Phase, RunSummary};
