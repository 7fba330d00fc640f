//! One validation run: configure, validate, write the reports.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rf2_validator::output::{
    FORMATTING_REPORT, JSON_REPORT, LOOKUP_REPORT, write_formatting_report, write_json,
    write_lookup_report,
};
use rf2_validator::{
    EffectiveTimeValidator, FsSourceConfig, ValidationConfig, ValidationReport, validate_fs,
};
use tracing::info;

use crate::cli::Cli;

/// Lookup errors echoed per file before the rest are suppressed.
pub const MAX_ECHOED_LOOKUP_ERRORS: usize = 10;

/// Validate the release named by `cli` and write every requested report.
///
/// # Errors
///
/// Returns an error if the output directory or the formatting report cannot
/// be created, which is checked before validation starts. Also fails if the
/// release root is unusable or a report cannot be written. Validation
/// findings are not errors; they are in the report.
pub fn run(cli: &Cli) -> anyhow::Result<ValidationReport> {
    let mut fs_config = FsSourceConfig::new(&cli.input);
    fs_config.exclude.clone_from(&cli.exclude);
    fs_config.threads = cli.threads;

    let mut validation_config = ValidationConfig::default();
    validation_config.expected_effective_time = cli.expected_effective_time;
    if cli.expected_effective_time.is_some() {
        validation_config.cross_reference = Some(Arc::new(EffectiveTimeValidator));
    }

    // The destination must be writable before any release file is read.
    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory {}", cli.output.display()))?;
    let formatting_path = cli.output.join(FORMATTING_REPORT);
    let formatting = create_report(&formatting_path)?;

    let report = validate_fs(&fs_config, &validation_config)?;

    finish_report(&formatting_path, formatting, |w| write_formatting_report(&report, w))?;
    if validation_config.cross_reference.is_some() {
        write_report(&cli.output.join(LOOKUP_REPORT), |w| write_lookup_report(&report, w))?;
    }
    if cli.json {
        write_report(&cli.output.join(JSON_REPORT), |w| write_json(&report, w))?;
    }
    info!(output = %cli.output.display(), "Reports written");

    Ok(report)
}

fn create_report(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn finish_report(
    path: &Path,
    mut writer: BufWriter<File>,
    write: impl FnOnce(&mut dyn Write) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    write(&mut writer).with_context(|| format!("Failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_report(
    path: &Path,
    write: impl FnOnce(&mut dyn Write) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    finish_report(path, create_report(path)?, write)
}

/// Echo lookup findings, at most [`MAX_ECHOED_LOOKUP_ERRORS`] per file
/// followed by a suppression notice.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn echo_lookup_errors(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    for file in report.files.iter().filter(|f| !f.lookup_errors.is_empty()) {
        writeln!(writer, "Processing File {}", file.path.display())?;
        for error in file.lookup_errors.iter().take(MAX_ECHOED_LOOKUP_ERRORS) {
            writeln!(writer, "{}", error.format_human_readable())?;
        }
        let suppressed = file.lookup_errors.len().saturating_sub(MAX_ECHOED_LOOKUP_ERRORS);
        if suppressed > 0 {
            writeln!(
                writer,
                "Suppressing {suppressed} further lookup errors for this file; see {LOOKUP_REPORT}"
            )?;
        }
    }
    Ok(())
}
