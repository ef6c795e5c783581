use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::DEFAULT_SAMPLE_ROWS;

#[derive(Parser)]
#[command(name = "air-quality-processor")]
#[command(about = "Clean air monitor exports and flag high-impact PM10 readings")]
#[command(version)]
pub struct Cli {
    /// Runs `process` with the configured defaults when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Only print errors"
    )]
    pub quiet: bool,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file (TOML, JSON or YAML) layered over the defaults"
    )]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset. Step status goes to the
    /// printed summary by default, so only warnings are logged.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "info,air_quality_processor=debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// The stage bar stays hidden whenever it would interleave with logs.
    pub fn hide_progress(&self) -> bool {
        self.quiet || self.verbose
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, clean, flag and save the monitor dataset
    Process {
        #[arg(short, long, help = "Input CSV file [default: data/yesterday_air_monitors.csv]")]
        input: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output CSV file [default: data/high_impact_air_monitors.csv]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Readings above this value are high impact [default: 100]")]
        threshold: Option<f64>,

        #[arg(long, help = "Column compared against the threshold [default: Max_PM10]")]
        pollutant_column: Option<String>,

        #[arg(long, help = "Also write the step report as JSON")]
        report_json: Option<PathBuf>,
    },

    /// Check the input carries every required column and run the steps without saving
    Validate {
        #[arg(short, long, help = "Input CSV file")]
        input: Option<PathBuf>,
    },

    /// Display shape, column types and sample rows of a CSV file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_ROWS)]
        sample: usize,
    },

    /// Print the effective configuration as JSON
    ShowConfig,
}
