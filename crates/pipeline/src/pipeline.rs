use std::fmt;
use std::io::{BufRead, Write};

use common::{ApplyConfig, FitConfig, Result};
use scaler::{read_settings, write_settings, ColumnFitter, ParameterTable};
use tracing::{debug, info};

use crate::input::{next_line, RewindableInput};

/// Stage of a fit or apply run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Pass 1: accumulate statistics.
    Scanning,
    /// Finalize parameters and persist them.
    Deriving,
    /// Parse a settings file.
    Loading,
    /// Pass 2 (or the only pass, when applying).
    Transforming,
    Done,
}

impl Phase {
    pub fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Idle, Phase::Scanning)
                | (Phase::Scanning, Phase::Deriving)
                | (Phase::Deriving, Phase::Transforming)
                | (Phase::Idle, Phase::Loading)
                | (Phase::Loading, Phase::Transforming)
                | (Phase::Transforming, Phase::Done)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Scanning => "scanning",
            Phase::Deriving => "deriving",
            Phase::Loading => "loading",
            Phase::Transforming => "transforming",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct PhaseTracker {
    phase: Phase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal phase change {} -> {}",
            self.phase,
            next
        );
        debug!(from = %self.phase, to = %next, "Phase change");
        self.phase = next;
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines read by the transform pass.
    pub records: usize,
    /// Columns in the parameter table.
    pub columns: usize,
    pub ignored_columns: usize,
    /// Scaled columns that map everything to the midpoint.
    pub degenerate_columns: usize,
    /// Whether the input had to be copied to temporary storage.
    pub spooled: bool,
}

/// Fit parameters on `input`, write them to `settings`, then write the
/// transformed input to `output`.
///
/// Reads `input` twice, each time from its first byte; the caller keeps it
/// (and any spool file) alive until this returns.
pub fn fit<S: Write, W: Write>(
    input: &mut RewindableInput,
    settings: &mut S,
    output: &mut W,
    config: &FitConfig,
) -> Result<RunSummary> {
    let mut tracker = PhaseTracker::new();
    let mut fitter = ColumnFitter::from_config(config)?;

    info!(
        mode = ?fitter.mode(),
        lower = fitter.bounds().lower,
        upper = fitter.bounds().upper,
        spooled = input.is_spooled(),
        "Starting fit"
    );

    tracker.advance(Phase::Scanning);
    input.rewind()?;
    let mut line = String::new();
    while next_line(input, &mut line)? {
        fitter.observe_record(&line)?;
    }
    debug!(
        records = fitter.records(),
        columns = fitter.column_count(),
        "Statistics pass complete"
    );

    tracker.advance(Phase::Deriving);
    let table = fitter.finish();
    write_settings(&table, settings)?;

    tracker.advance(Phase::Transforming);
    input.rewind()?;
    let records = transform_stream(&table, input, output)?;

    tracker.advance(Phase::Done);
    let summary = summarize(&table, records, input.is_spooled());
    info!(?summary, "Fit complete");
    Ok(summary)
}

/// Load saved parameters from `settings` and write the transformed
/// `input` to `output`.
pub fn apply<S: BufRead, R: BufRead, W: Write>(
    settings: S,
    input: &mut R,
    output: &mut W,
    config: &ApplyConfig,
) -> Result<RunSummary> {
    let mut tracker = PhaseTracker::new();

    tracker.advance(Phase::Loading);
    let table = read_settings(settings, config.clamp)?;
    info!(columns = table.len(), clamp = config.clamp, "Starting apply");

    tracker.advance(Phase::Transforming);
    let records = transform_stream(&table, input, output)?;

    tracker.advance(Phase::Done);
    let summary = summarize(&table, records, false);
    info!(?summary, "Apply complete");
    Ok(summary)
}

/// Transform every line of `input` with `table`; returns the line count.
pub fn transform_stream<R: BufRead, W: Write>(
    table: &ParameterTable,
    input: &mut R,
    output: &mut W,
) -> Result<usize> {
    let mut line = String::new();
    let mut scaled = String::new();
    let mut records = 0;
    while next_line(input, &mut line)? {
        table.transform_record(&line, &mut scaled)?;
        writeln!(output, "{scaled}")?;
        records += 1;
    }
    output.flush()?;
    Ok(records)
}

fn summarize(table: &ParameterTable, records: usize, spooled: bool) -> RunSummary {
    RunSummary {
        records,
        columns: table.len(),
        ignored_columns: table.ignored_count(),
        degenerate_columns: table.degenerate_count(),
        spooled,
    }
}
