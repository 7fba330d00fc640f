//! Command line arguments for `rf2-validate`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::logging::LogFormat;

#[derive(Debug, Parser)]
#[command(
    name = "rf2-validate",
    version,
    about = "Validate the file names and content of an RF2 release package",
    long_about = "Validate the file names and content of an RF2 release package.\n\n\
                  Writes formattingReport.txt (and lookupReport.txt when an expected \
                  effective time is given) to the output directory."
)]
pub struct Cli {
    /// Root directory of the release package.
    #[arg(short, long, value_name = "DIR")]
    pub input: PathBuf,

    /// Directory the reports are written to. Created if missing.
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Release date every row should carry; enables the effective time lookup.
    #[arg(long, value_name = "YYYYMMDD", value_parser = parse_release_date)]
    pub expected_effective_time: Option<NaiveDate>,

    /// Glob of files to skip. Can be given more than once.
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Worker threads; 0 uses one per CPU.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub threads: usize,

    /// Also write formattingReport.json.
    #[arg(long)]
    pub json: bool,

    /// Verbosity (-v, -vv, -vvv). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

fn parse_release_date(raw: &str) -> Result<NaiveDate, String> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{raw}' is not a YYYYMMDD date"));
    }
    NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|e| format!("'{raw}': {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_arguments() {
        let cli = Cli::try_parse_from(["rf2-validate", "--input", "release", "--output", "out"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("release"));
        assert_eq!(cli.output, PathBuf::from("out"));
        assert!(cli.expected_effective_time.is_none());
        assert_eq!(cli.threads, 0);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_all_arguments() {
        let cli = Cli::try_parse_from([
            "rf2-validate",
            "-i",
            "release",
            "-o",
            "out",
            "--expected-effective-time",
            "20130731",
            "--exclude",
            "*.zip",
            "--exclude",
            "*.pdf",
            "--threads",
            "4",
            "--json",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.expected_effective_time, NaiveDate::from_ymd_opt(2013, 7, 31));
        assert_eq!(cli.exclude, vec!["*.zip", "*.pdf"]);
        assert_eq!(cli.threads, 4);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_output_is_required() {
        assert!(Cli::try_parse_from(["rf2-validate", "--input", "release"]).is_err());
    }

    #[test]
    fn test_release_date_parsing() {
        assert!(parse_release_date("20130731").is_ok());
        assert!(parse_release_date("2013-07-31").is_err());
        assert!(parse_release_date("20130231").is_err());
        assert!(parse_release_date("2013073").is_err());
    }
}
