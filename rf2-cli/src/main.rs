// These Clippy lints are disabled because this is a CLI binary, not a library:
// - print_stdout/print_stderr: CLI tools are expected to print to stdout/stderr for user output.
// - exit: Calling `std::process::exit()` is standard for CLI apps to signal failure to the shell.
#![allow(clippy::print_stdout, clippy::print_stderr, clippy::exit)]

use std::io;

use clap::Parser;
use colored::Colorize;
use rf2_cli::cli::Cli;
use rf2_cli::logging::{LogConfig, init_logging};
use rf2_cli::{echo_lookup_errors, run};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&LogConfig::from_verbosity(cli.verbose, cli.log_format)) {
        eprintln!("Error: failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let report = match run(&cli) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    if let Err(e) = echo_lookup_errors(&report, &mut io::stderr().lock()) {
        eprintln!("Error: {e:#}");
    }

    let summary = report.summary_line();
    if report.ok {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.red());
        for scan_err in &report.scan_errors {
            eprintln!("{}", scan_err.format_human_readable().yellow());
        }
        std::process::exit(1);
    }
}
