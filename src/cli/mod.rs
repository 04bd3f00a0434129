//! Command-line parsing for the air change rate estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting code. Turning arguments into `EstimateConfig` happens in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{
    Constraint, DEFAULT_ACH_MAX, DEFAULT_ACH_MIN, DEFAULT_MAX_ITERATIONS, DEFAULT_PRECISION, StepMode,
};

pub mod inputs;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ach",
    version,
    about = "Estimate indoor/outdoor air exchange (ACH) from AQI time series"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit `(c, r, ach)` to one or more CSV files and print the estimates.
    Estimate(EstimateArgs),
    /// Write a synthetic decay series to CSV (handy for trying `estimate`).
    Simulate(SimulateArgs),
}

/// Options for `ach estimate`.
#[derive(Debug, Parser, Clone)]
pub struct EstimateArgs {
    /// CSV files or directories containing CSV files.
    #[arg(value_name = "CSV", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Column holding sample times (hours).
    #[arg(long, default_value = "time")]
    pub time_label: String,

    /// Column holding indoor AQI readings.
    #[arg(long, default_value = "indoor")]
    pub indoor_label: String,

    /// Column holding outdoor AQI readings.
    #[arg(long, default_value = "outdoor")]
    pub outdoor_label: String,

    /// Fit constraint. `init` pins the start value to the first indoor reading.
    #[arg(long, value_enum, ignore_case = true, value_name = "MODE")]
    pub constrain: Option<ConstrainArg>,

    /// Lower bound of the `ach` search interval.
    #[arg(long, default_value_t = DEFAULT_ACH_MIN, allow_negative_numbers = true)]
    pub ach_min: f64,

    /// Upper bound of the `ach` search interval.
    #[arg(long, default_value_t = DEFAULT_ACH_MAX, allow_negative_numbers = true)]
    pub ach_max: f64,

    /// Search `[-H, H]` instead of `[ach-min, ach-max]`.
    #[arg(long, value_name = "H", conflicts_with_all = ["ach_min", "ach_max"])]
    pub ach_bound: Option<f64>,

    /// Convergence tolerance on `ach`. `0` runs the search to `--max-iter`.
    #[arg(long, env = "ACH_PRECISION", default_value_t = DEFAULT_PRECISION)]
    pub precision: f64,

    /// Iteration cap for the `ach` search.
    #[arg(long = "max-iter", env = "ACH_MAX_ITER", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Timestep used by the recurrence.
    #[arg(long, value_enum, default_value_t = StepMode::Local)]
    pub step: StepMode,

    /// Print estimates as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Render an ASCII plot of observed vs. fitted indoor values.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the estimate(s) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Export observed vs. fitted values to CSV (single input only).
    #[arg(long = "export-fit", value_name = "CSV")]
    pub export_fit: Option<PathBuf>,
}

/// Values accepted by `--constrain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConstrainArg {
    /// No constraint (same as omitting the flag).
    #[value(name = "none")]
    Unconstrained,
    /// Start the recurrence from the observed first indoor value.
    Init,
}

impl ConstrainArg {
    pub fn constraint(self) -> Option<Constraint> {
        match self {
            ConstrainArg::Unconstrained => None,
            ConstrainArg::Init => Some(Constraint::Init),
        }
    }

    /// Name shown in the invocation summary (`None` for no constraint).
    pub fn label(self) -> Option<&'static str> {
        match self {
            ConstrainArg::Unconstrained => None,
            ConstrainArg::Init => Some("init"),
        }
    }
}

/// Options for `ach simulate`.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Indoor AQI at `time = 0`.
    #[arg(long, default_value_t = 133.0)]
    pub c: f64,

    /// Air changes per hour.
    #[arg(long, default_value_t = 1.5, allow_negative_numbers = true)]
    pub ach: f64,

    /// Outdoor AQI at `time = 0`.
    #[arg(long, default_value_t = 40.0)]
    pub outdoor: f64,

    /// Outdoor change per hour.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub drift: f64,

    /// Nominal timestep (hours).
    #[arg(long, default_value_t = 0.1667)]
    pub ts: f64,

    /// Number of samples.
    #[arg(short = 'n', long = "n", default_value_t = 15)]
    pub samples: usize,

    /// Relative timestep jitter in `[0, 1)`.
    #[arg(long, default_value_t = 0.0)]
    pub jitter: f64,

    /// Standard deviation of Gaussian noise on indoor readings.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_defaults() {
        let cli = Cli::try_parse_from(["ach", "estimate", "test1.csv"]).unwrap();
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(args.inputs, vec![PathBuf::from("test1.csv")]);
        assert_eq!(args.time_label, "time");
        assert_eq!(args.step, StepMode::Local);
        assert_eq!(args.ach_min, 0.0);
        assert_eq!(args.ach_max, 10.0);
        assert!(args.constrain.is_none());
        assert!(!args.json);
    }

    #[test]
    fn estimate_flags() {
        let cli = Cli::try_parse_from([
            "ach", "estimate", "a.csv", "b.csv", "--constrain", "init", "--ach-bound", "3",
            "--step", "uniform", "--precision", "1e-5", "--json",
        ])
        .unwrap();
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.constrain, Some(ConstrainArg::Init));
        assert_eq!(args.ach_bound, Some(3.0));
        assert_eq!(args.step, StepMode::Uniform);
        assert_eq!(args.precision, 1e-5);
        assert!(args.json);
    }

    #[test]
    fn constrain_accepts_only_known_values() {
        for raw in ["init", "INIT", "none"] {
            assert!(Cli::try_parse_from(["ach", "estimate", "a.csv", "--constrain", raw]).is_ok(), "{raw}");
        }
        let err = Cli::try_parse_from(["ach", "estimate", "a.csv", "--constrain", "final"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn ach_bound_conflicts_with_explicit_range() {
        let res = Cli::try_parse_from(["ach", "estimate", "a.csv", "--ach-bound", "3", "--ach-max", "5"]);
        assert!(res.is_err());
    }

    #[test]
    fn simulate_requires_output() {
        assert!(Cli::try_parse_from(["ach", "simulate"]).is_err());
        let cli = Cli::try_parse_from(["ach", "simulate", "--out", "s.csv", "-n", "30", "--drift", "-2"]).unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.samples, 30);
        assert_eq!(args.drift, -2.0);
        assert_eq!(args.seed, 42);
    }
}
