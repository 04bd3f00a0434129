//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - estimates every input file (in parallel)
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use rayon::prelude::*;

use crate::cli::{Command, ConstrainArg, EstimateArgs, SimulateArgs};
use crate::domain::{AchBounds, ColumnLabels, EstimateConfig, FitOptions, SimulationConfig};
use crate::error::AppError;
use crate::io::export::EstimateFile;

pub mod pipeline;

use pipeline::EstimateRun;

const TOOL_NAME: &str = "ach";

/// Entry point for the `ach` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine; flags and the real environment still apply.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Estimate(args) => handle_estimate(&args),
        Command::Simulate(args) => handle_simulate(&args),
    }
}

fn handle_estimate(args: &EstimateArgs) -> Result<(), AppError> {
    let config = estimate_config_from_args(args)?;
    log::info!("estimating {} input file(s)", config.csv_paths.len());

    // Each file is independent; results come back in input order.
    let runs: Vec<EstimateRun> = config
        .csv_paths
        .par_iter()
        .map(|path| pipeline::run_estimate(path, &config))
        .collect::<Result<_, _>>()?;

    let documents: Vec<EstimateFile> = runs.iter().map(estimate_file).collect();

    if config.json {
        let text = match documents.as_slice() {
            [single] => serde_json::to_string_pretty(single),
            many => serde_json::to_string_pretty(many),
        }
        .map_err(|e| AppError::new(2, format!("Failed to serialize estimate: {e}")))?;
        println!("{text}");
    } else {
        for run in &runs {
            println!(
                "{}",
                crate::report::format_estimate(&run.invocation, run.ingest.rows_read, &run.estimate)
            );
            if config.plot {
                println!(
                    "{}",
                    crate::plot::render_fit_plot(&run.rows, config.plot_width, config.plot_height)
                );
                println!("{}", crate::report::format_fitted_table(&run.rows));
            }
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_estimate {
        crate::io::export::write_estimate_json(path, &documents)?;
    }
    if let (Some(path), [run]) = (&config.export_fit, runs.as_slice()) {
        crate::io::export::write_fit_csv(path, &run.rows)?;
    }

    Ok(())
}

fn handle_simulate(args: &SimulateArgs) -> Result<(), AppError> {
    let config = SimulationConfig {
        c: args.c,
        ach: args.ach,
        outdoor: args.outdoor,
        drift: args.drift,
        ts: args.ts,
        samples: args.samples,
        jitter: args.jitter,
        noise: args.noise,
        seed: args.seed,
    };
    let series = crate::data::generate_series(&config)?;
    crate::io::export::write_series_csv(&args.out, &series)?;

    println!(
        "wrote {} samples (c={}, ach={}) to {}",
        series.len(),
        config.c,
        config.ach,
        args.out.display()
    );
    Ok(())
}

/// Build the pipeline configuration from parsed `estimate` flags.
///
/// Resolves directory inputs to CSV files and checks export flags before any
/// file is read.
pub fn estimate_config_from_args(args: &EstimateArgs) -> Result<EstimateConfig, AppError> {
    let constraint = args.constrain.and_then(ConstrainArg::constraint);
    let mut options = FitOptions::from_constraint(constraint, args.precision);
    options.ach_bounds = match args.ach_bound {
        Some(h) => AchBounds::symmetric(h),
        None => AchBounds::new(args.ach_min, args.ach_max),
    };
    options.max_iterations = args.max_iterations;
    options.step_mode = args.step;

    let csv_paths = crate::cli::inputs::resolve_csv_inputs(&args.inputs)?;
    if args.export_fit.is_some() && csv_paths.len() != 1 {
        return Err(AppError::new(
            2,
            format!("--export-fit needs exactly one input file (got {})", csv_paths.len()),
        ));
    }

    Ok(EstimateConfig {
        csv_paths,
        labels: ColumnLabels {
            time: args.time_label.clone(),
            indoor: args.indoor_label.clone(),
            outdoor: args.outdoor_label.clone(),
        },
        constrain: args.constrain.and_then(ConstrainArg::label).map(str::to_string),
        options,
        json: args.json,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_estimate: args.export.clone(),
        export_fit: args.export_fit.clone(),
    })
}

fn estimate_file(run: &EstimateRun) -> EstimateFile {
    EstimateFile {
        tool: TOOL_NAME.to_string(),
        source: run.ingest.source.clone(),
        summary: run.invocation.clone(),
        estimate: run.estimate.clone(),
    }
}
