//! `scale`: scale CSV columns into [0, 1] (or [-1, 1]) and replay the saved
//! scaling on other data.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use common::{RunMode, ScaleConfig};
use pipeline::{apply, fit, RewindableInput, RunSummary};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "scale")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scales a CSV dataset so all features are in [0, 1]", long_about = None)]
#[command(after_help = "You must specify either save (-s, --save) or restore (-r, --restore). \
The restore operation ignores the negative-one, use-distribution and ignore options; the save \
operation stores their effect in the settings file. Only the restore operation uses the clamp \
option.")]
struct Cli {
    /// The scaling parameter settings save file
    #[arg(short, long, value_name = "SETTINGS_FILE")]
    save: Option<PathBuf>,

    /// The scaling parameter settings restore file
    #[arg(short, long, value_name = "SETTINGS_FILE")]
    restore: Option<PathBuf>,

    /// Ensure scaled values are within range
    #[arg(short, long)]
    clamp: bool,

    /// Use -1 instead of 0 as the lower bound
    #[arg(short, long, visible_alias = "alternate-bounds")]
    negative_one: bool,

    /// Scale by mean and standard deviation instead of minimum and maximum
    #[arg(short, long)]
    use_distribution: bool,

    /// A comma-delimited list of 1-based columns to not scale, e.g. 2-4,7
    #[arg(short, long, value_name = "COLUMNS")]
    ignore: Option<String>,

    /// JSON file with default options; flags on the command line add to it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// The input data file (default standard input)
    input_file: Option<PathBuf>,

    /// The scaled output data file (default standard output)
    output_file: Option<PathBuf>,
}

impl Cli {
    fn scale_config(&self) -> anyhow::Result<ScaleConfig> {
        let mut config = match &self.config {
            Some(path) => ScaleConfig::load(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => ScaleConfig::default(),
        };
        config.fit.alternate_bounds |= self.negative_one;
        config.fit.use_distribution |= self.use_distribution;
        if self.ignore.is_some() {
            config.fit.ignore_columns = self.ignore.clone();
        }
        config.apply.clamp |= self.clamp;
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Validated before any input is touched.
    let mode = match RunMode::from_flags(cli.save.clone(), cli.restore.clone()) {
        Ok(mode) => mode,
        Err(e) => Cli::command()
            .error(ErrorKind::ArgumentConflict, e.to_string())
            .exit(),
    };

    match run(&cli, mode) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("scale: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, mode: RunMode) -> anyhow::Result<RunSummary> {
    let config = cli.scale_config()?;

    let summary = match mode {
        RunMode::Save(path) => {
            if config.apply.clamp {
                warn!("clamp only applies when restoring; ignoring it");
            }
            let mut input = open_rewindable_input(cli.input_file.as_ref())?;
            let mut settings = BufWriter::new(
                File::create(&path)
                    .with_context(|| format!("creating settings file {}", path.display()))?,
            );
            let mut output = open_output(cli.output_file.as_ref())?;
            fit(&mut input, &mut settings, &mut output, &config.fit)?
        }
        RunMode::Restore(path) => {
            if config.fit.alternate_bounds
                || config.fit.use_distribution
                || config.fit.ignore_columns.is_some()
            {
                warn!("negative-one, use-distribution and ignore only apply when saving; ignoring them");
            }
            let settings = BufReader::new(
                File::open(&path)
                    .with_context(|| format!("opening settings file {}", path.display()))?,
            );
            match &cli.input_file {
                Some(p) => {
                    let file = File::open(p)
                        .with_context(|| format!("opening input {}", p.display()))?;
                    let mut output = open_output(cli.output_file.as_ref())?;
                    apply(settings, &mut BufReader::new(file), &mut output, &config.apply)?
                }
                None => {
                    let mut output = open_output(cli.output_file.as_ref())?;
                    apply(settings, &mut io::stdin().lock(), &mut output, &config.apply)?
                }
            }
        }
    };

    Ok(summary)
}

fn open_rewindable_input(path: Option<&PathBuf>) -> anyhow::Result<RewindableInput> {
    match path {
        Some(p) => {
            let file = File::open(p).with_context(|| format!("opening input {}", p.display()))?;
            Ok(RewindableInput::from_file(file)?)
        }
        None => Ok(RewindableInput::spool(io::stdin().lock())?),
    }
}

fn open_output(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("creating output {}", p.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_merge_into_config() {
        let cli = Cli::parse_from(["scale", "-s", "out.scale", "-n", "-u", "-i", "2-3"]);
        let config = cli.scale_config().unwrap();
        assert!(config.fit.alternate_bounds);
        assert!(config.fit.use_distribution);
        assert_eq!(config.fit.ignore_columns.as_deref(), Some("2-3"));
        assert!(!config.apply.clamp);
    }

    #[test]
    fn test_alternate_bounds_alias() {
        let cli = Cli::parse_from(["scale", "-s", "x", "--alternate-bounds"]);
        assert!(cli.negative_one);
    }

    #[test]
    fn test_positional_files() {
        let cli = Cli::parse_from(["scale", "-r", "x", "-c", "in.csv", "out.csv"]);
        assert!(cli.clamp);
        assert_eq!(cli.input_file, Some(PathBuf::from("in.csv")));
        assert_eq!(cli.output_file, Some(PathBuf::from("out.csv")));
    }
}
