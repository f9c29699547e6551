use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{parse_column_ranges, ColumnSet, Result, ScaleError};

/// Run-wide options, loadable from a JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    #[serde(default)]
    pub fit: FitConfig,

    #[serde(default)]
    pub apply: ApplyConfig,
}

impl ScaleConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Options that only apply when fitting (`save`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Scale into `[-1, 1]` instead of `[0, 1]`.
    #[serde(default)]
    pub alternate_bounds: bool,

    /// Use mean/standard deviation instead of min/max.
    #[serde(default)]
    pub use_distribution: bool,

    /// 1-based column ranges to pass through unscaled, e.g. `"2-4,7"`.
    #[serde(default)]
    pub ignore_columns: Option<String>,
}

impl FitConfig {
    pub fn bounds(&self) -> OutputBounds {
        if self.alternate_bounds {
            OutputBounds::symmetric()
        } else {
            OutputBounds::unit()
        }
    }

    pub fn ignored_columns(&self) -> Result<ColumnSet> {
        match &self.ignore_columns {
            Some(list) => parse_column_ranges(list),
            None => Ok(ColumnSet::new()),
        }
    }
}

/// Options that only apply when replaying saved settings (`restore`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyConfig {
    /// Clip every scaled value into its column's bounds.
    #[serde(default)]
    pub clamp: bool,
}

/// Target output range `[lower, upper]` of a scaled column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutputBounds {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        // Written so that NaN bounds are rejected too.
        if !(upper > lower) {
            return Err(ScaleError::Config(format!(
                "upper bound {upper} must be greater than lower bound {lower}"
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn unit() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
        }
    }

    pub fn symmetric() -> Self {
        Self {
            lower: -1.0,
            upper: 1.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn midpoint(&self) -> f64 {
        (self.upper + self.lower) / 2.0
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

impl Default for OutputBounds {
    fn default() -> Self {
        Self::unit()
    }
}

/// Which of the two entry points a run takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Fit on the input, write settings to the path, then transform.
    Save(PathBuf),
    /// Load settings from the path, then transform.
    Restore(PathBuf),
}

impl RunMode {
    /// Exactly one of `save` and `restore` must be given.
    pub fn from_flags(save: Option<PathBuf>, restore: Option<PathBuf>) -> Result<Self> {
        match (save, restore) {
            (Some(path), None) => Ok(RunMode::Save(path)),
            (None, Some(path)) => Ok(RunMode::Restore(path)),
            (Some(_), Some(_)) => Err(ScaleError::Config(
                "save and restore are mutually exclusive".into(),
            )),
            (None, None) => Err(ScaleError::Config(
                "one of save or restore is required".into(),
            )),
        }
    }
}
