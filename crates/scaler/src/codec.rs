//! Settings file format.
//!
//! One line per column, in ascending column order:
//!
//! ```text
//! <index>:<m> <b> <lower> <upper>     scaled column
//! <index>:                            ignored column
//! ```
//!
//! Numbers use the shortest text that parses back to the same `f64`, so a
//! reloaded table transforms exactly like the one that was saved. Clamping
//! is not stored.

use std::io::{BufRead, Write};

use common::{OutputBounds, Result, ScaleError};
use tracing::debug;

use crate::parameters::ScalingParameters;
use crate::table::{ColumnParameters, ParameterTable};

pub fn encode_line(column: usize, params: &ColumnParameters) -> String {
    match params {
        ColumnParameters::Scaled(p) => {
            let bounds = p.bounds();
            format!(
                "{column}:{} {} {} {}",
                p.m(),
                p.b(),
                bounds.lower,
                bounds.upper
            )
        }
        ColumnParameters::Ignored => format!("{column}:"),
    }
}

pub fn write_settings<W: Write>(table: &ParameterTable, writer: &mut W) -> Result<()> {
    for (column, params) in table.iter() {
        writeln!(writer, "{}", encode_line(column, params))?;
    }
    writer.flush()?;
    debug!(columns = table.len(), "Wrote scaling settings");
    Ok(())
}

/// Parse one non-blank settings line. `line_number` is 1-based and only
/// used in error messages.
pub fn decode_line(
    line_number: usize,
    text: &str,
    clamp: bool,
) -> Result<(usize, ColumnParameters)> {
    let malformed = |reason: String| ScaleError::Settings {
        line: line_number,
        reason,
    };

    let (index, body) = text
        .split_once(':')
        .ok_or_else(|| malformed(format!("missing ':' in {text:?}")))?;
    let column: usize = index
        .trim()
        .parse()
        .map_err(|_| malformed(format!("{index:?} is not a column index")))?;

    let body = body.trim();
    if body.is_empty() {
        return Ok((column, ColumnParameters::Ignored));
    }

    let fields = body
        .split_whitespace()
        .map(|f| {
            f.parse::<f64>()
                .map_err(|_| malformed(format!("{f:?} is not a number")))
        })
        .collect::<Result<Vec<_>>>()?;
    let [m, b, lower, upper] = fields[..] else {
        return Err(malformed(format!(
            "expected 4 numbers after ':', found {}",
            fields.len()
        )));
    };
    let bounds = OutputBounds::new(lower, upper).map_err(|e| malformed(e.to_string()))?;

    Ok((
        column,
        ColumnParameters::Scaled(ScalingParameters::new(m, b, bounds).with_clamp(clamp)),
    ))
}

/// Load a whole settings file. `clamp` is applied to every scaled column.
pub fn read_settings<R: BufRead>(reader: R, clamp: bool) -> Result<ParameterTable> {
    let mut table = ParameterTable::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (column, params) = decode_line(i + 1, &line, clamp)?;
        if table.insert(column, params).is_some() {
            return Err(ScaleError::Settings {
                line: i + 1,
                reason: format!("column {column} appears more than once"),
            });
        }
    }
    debug!(columns = table.len(), clamp, "Loaded scaling settings");
    Ok(table)
}
