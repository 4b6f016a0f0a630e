//! Command-line parsing for the regional feed aggregator.
//!
//! Every flag is optional: a bare `ozh` performs a full run with `sources.toml`
//! from the current directory and today's date.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "ozh",
    version,
    about = "Aggregate regional COVID-19 CSV feeds into national reports"
)]
pub struct Cli {
    /// Config file with the region sources.
    #[arg(short, long, env = "OZH_CONFIG", default_value = "sources.toml")]
    pub config: PathBuf,

    /// Write reports here instead of the configured `[output].dir`.
    #[arg(short, long, env = "OZH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Treat this date as "today" (YYYY-MM-DD) when building the calendar.
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Write a default config file to `--config` and exit.
    #[arg(long)]
    pub init_config: bool,

    /// Verbose logging (debug level).
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_is_a_full_default_run() {
        let cli = Cli::try_parse_from(["ozh"]).unwrap();
        assert_eq!(cli.output_dir, None);
        assert_eq!(cli.as_of, None);
        assert!(!cli.init_config);
        assert_eq!(cli.log_filter(), "info");
    }

    #[test]
    fn parses_as_of_and_output_dir() {
        let cli = Cli::try_parse_from(["ozh", "--as-of", "2020-04-01", "-o", "out", "-v"]).unwrap();
        assert_eq!(cli.as_of, NaiveDate::from_ymd_opt(2020, 4, 1));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["ozh", "-v", "-q"]).is_err());
    }
}
