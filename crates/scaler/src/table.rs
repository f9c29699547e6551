use std::borrow::Cow;
use std::collections::btree_map::{self, BTreeMap};

use common::{ColumnSet, FitConfig, OutputBounds, Result, ScaleError};
use tracing::{debug, warn};

use crate::accumulator::{ColumnAccumulator, StatisticsMode};
use crate::parameters::ScalingParameters;
use crate::Scaler;

/// What a column does on transform: scale, or pass the token through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnParameters {
    Scaled(ScalingParameters),
    Ignored,
}

impl ColumnParameters {
    pub fn as_scaled(&self) -> Option<&ScalingParameters> {
        match self {
            ColumnParameters::Scaled(params) => Some(params),
            ColumnParameters::Ignored => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, ColumnParameters::Ignored)
    }
}

impl Scaler for ColumnParameters {
    fn adjust<'a>(&self, raw: &'a str) -> Result<Cow<'a, str>> {
        match self {
            ColumnParameters::Scaled(params) => params.adjust(raw),
            // Never parsed, so non-numeric content is fine here.
            ColumnParameters::Ignored => Ok(Cow::Borrowed(raw.trim())),
        }
    }
}

/// Fitting-phase state of one column.
#[derive(Debug, Clone, PartialEq)]
enum FitSlot {
    Accumulating(ColumnAccumulator),
    Ignored,
}

/// Accumulates per-column statistics over the first pass, discovering
/// columns as they appear.
#[derive(Debug, Clone)]
pub struct ColumnFitter {
    mode: StatisticsMode,
    bounds: OutputBounds,
    ignored: ColumnSet,
    columns: BTreeMap<usize, FitSlot>,
    records: usize,
}

impl ColumnFitter {
    pub fn new(mode: StatisticsMode, bounds: OutputBounds, ignored: ColumnSet) -> Self {
        Self {
            mode,
            bounds,
            ignored,
            columns: BTreeMap::new(),
            records: 0,
        }
    }

    pub fn from_config(config: &FitConfig) -> Result<Self> {
        let mode = if config.use_distribution {
            StatisticsMode::Distribution
        } else {
            StatisticsMode::Range
        };
        Ok(Self::new(mode, config.bounds(), config.ignored_columns()?))
    }

    pub fn mode(&self) -> StatisticsMode {
        self.mode
    }

    pub fn bounds(&self) -> OutputBounds {
        self.bounds
    }

    /// Records observed so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Columns discovered so far.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Feed one token of `column`, creating the column on first sight.
    pub fn observe(&mut self, column: usize, raw: &str) -> Result<()> {
        let slot = match self.columns.entry(column) {
            btree_map::Entry::Occupied(entry) => entry.into_mut(),
            btree_map::Entry::Vacant(entry) => {
                let slot = if self.ignored.contains(column) {
                    FitSlot::Ignored
                } else {
                    FitSlot::Accumulating(ColumnAccumulator::new(self.mode))
                };
                debug!(column, ignored = slot == FitSlot::Ignored, "Discovered column");
                entry.insert(slot)
            }
        };
        match slot {
            FitSlot::Accumulating(acc) => acc.add(raw).map_err(|e| e.in_column(column)),
            FitSlot::Ignored => Ok(()),
        }
    }

    /// Feed every comma-separated token of one input line.
    pub fn observe_record(&mut self, line: &str) -> Result<()> {
        for (column, raw) in line.split(',').enumerate() {
            self.observe(column, raw)?;
        }
        self.records += 1;
        Ok(())
    }

    /// Derive parameters for every discovered column.
    pub fn finish(self) -> ParameterTable {
        let bounds = self.bounds;
        let mut table = ParameterTable::new();
        for (column, slot) in self.columns {
            let params = match slot {
                FitSlot::Accumulating(acc) => {
                    let params = acc.finalize(bounds);
                    if params.is_degenerate() {
                        warn!(
                            column,
                            midpoint = bounds.midpoint(),
                            "Column has no spread, mapping every value to the midpoint"
                        );
                    }
                    ColumnParameters::Scaled(params)
                }
                FitSlot::Ignored => ColumnParameters::Ignored,
            };
            table.insert(column, params);
        }
        table
    }
}

/// Column index → parameters, read-only while transforming.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTable {
    columns: BTreeMap<usize, ColumnParameters>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column, returning the previous entry.
    pub fn insert(&mut self, column: usize, params: ColumnParameters) -> Option<ColumnParameters> {
        self.columns.insert(column, params)
    }

    pub fn get(&self, column: usize) -> Option<&ColumnParameters> {
        self.columns.get(&column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Entries in ascending column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ColumnParameters)> {
        self.columns.iter().map(|(k, v)| (*k, v))
    }

    pub fn ignored_count(&self) -> usize {
        self.columns.values().filter(|p| p.is_ignored()).count()
    }

    pub fn degenerate_count(&self) -> usize {
        self.columns
            .values()
            .filter_map(ColumnParameters::as_scaled)
            .filter(|p| p.is_degenerate())
            .count()
    }

    /// Adjust one token of `column`.
    pub fn adjust<'a>(&self, column: usize, raw: &'a str) -> Result<Cow<'a, str>> {
        self.get(column)
            .ok_or(ScaleError::UnknownColumn(column))?
            .adjust(raw)
            .map_err(|e| e.in_column(column))
    }

    /// Transform one input line (without its terminator) into `out`.
    ///
    /// A line without a comma produces an empty output line.
    pub fn transform_record(&self, line: &str, out: &mut String) -> Result<()> {
        out.clear();
        if !line.contains(',') {
            return Ok(());
        }
        for (column, raw) in line.split(',').enumerate() {
            if column > 0 {
                out.push(',');
            }
            out.push_str(&self.adjust(column, raw)?);
        }
        Ok(())
    }
}
