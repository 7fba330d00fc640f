//! # rf2-validator
//!
//! Format gate for RF2 terminology release packages.
//!
//! The crate keeps the **per-file validation pipeline** (file name, schema,
//! line endings, header, typed cells) apart from the **input strategy**
//! (directory walking), and exposes a trait seam for semantic
//! cross-reference checks that need a terminology store.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rf2_validator::{FsSourceConfig, ValidationConfig, validate_fs};
//!
//! let mut fs_config = FsSourceConfig::new("release/SnomedCT_RF2Release_INT_20130731");
//! fs_config.exclude = vec!["*.zip".to_owned()];
//!
//! let report = validate_fs(&fs_config, &ValidationConfig::default()).unwrap();
//! println!("{}", report.summary_line());
//! println!("Scan errors: {}", report.scan_errors.len());
//! println!("OK: {}", report.ok);
//! ```

mod config;
pub mod cross_ref;
mod error;
pub mod filename;
pub mod legacy_map;
pub mod line_ending;
pub mod output;
mod report;
pub mod row;
pub mod schema;
mod strategy;
mod validator;
pub mod value;

pub use config::{CancellationToken, FsSourceConfig, ValidationConfig};
pub use cross_ref::{
    CrossReferenceRequest, CrossReferenceValidator, EffectiveTimeValidator, LookupFailure,
};
pub use error::{ErrorKind, ErrorScope, LookupError, ScanError, ScanErrorKind, ValidationError};
pub use filename::{FileNameInfo, ReleaseState, classify_file_name};
pub use legacy_map::{LegacyIdMap, LegacyMapError};
pub use report::{FileValidationResult, ValidationReport};

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use filename::LEGACY_MAP_PREFIX;
use strategy::fs::find_files;
use validator::{RunContext, validate_file};

/// Validate every file of a release package on disk.
///
/// This is the primary public API.
///
/// # Arguments
///
/// * `fs_config` - Release root, exclude patterns, traversal limits, worker threads
/// * `validation_config` - Expected effective time, cross-reference validator, cancellation
///
/// # Errors
///
/// Returns an error if `fs_config.root` is empty, does not exist or is not a
/// directory, or if the worker pool cannot be started.
/// Per-file defects are reported in the per-file results; traversal and legacy
/// map failures are reported in `report.scan_errors` and never silently discarded.
pub fn validate_fs(
    fs_config: &FsSourceConfig,
    validation_config: &ValidationConfig,
) -> anyhow::Result<ValidationReport> {
    let root = &fs_config.root;
    if root.as_os_str().is_empty() {
        anyhow::bail!("No release root provided for validation");
    }
    if !root.exists() {
        anyhow::bail!("Path does not exist: {}", root.display());
    }
    if !root.is_dir() {
        anyhow::bail!("Release root is not a directory: {}", root.display());
    }

    let (files, mut scan_errors) = find_files(fs_config);
    for scan_err in &scan_errors {
        warn!(file = %scan_err.file.display(), "{}", scan_err.message);
    }

    let legacy_map = if validation_config.cross_reference.is_some() {
        load_legacy_map(&files, &mut scan_errors)
    } else {
        None
    };
    let ctx = RunContext {
        config: validation_config,
        legacy_map: legacy_map.as_ref(),
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(fs_config.threads)
        .build()?;

    let outcomes: Vec<Option<FileValidationResult>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                if validation_config.cancel.is_cancelled() {
                    return None;
                }
                Some(validate_file(path, &relative_path(root, path), ctx))
            })
            .collect()
    });

    let cancelled = outcomes.iter().any(Option::is_none);
    let results: Vec<FileValidationResult> = outcomes.into_iter().flatten().collect();
    let report = ValidationReport::from_results(results, scan_errors, cancelled);

    info!(
        processed = report.processed_files,
        valid = report.valid_files,
        errors = report.errors_count(),
        lookup_errors = report.lookup_errors_count(),
        scan_errors = report.scan_errors.len(),
        cancelled = report.cancelled,
        "{}",
        report.summary_line()
    );
    Ok(report)
}

/// Build the legacy identifier tables from every `sct2_to_uuid_map` file found.
///
/// A failure is recorded as a scan error and the run continues without a map.
fn load_legacy_map(files: &[PathBuf], scan_errors: &mut Vec<ScanError>) -> Option<LegacyIdMap> {
    let map_files: Vec<PathBuf> = files
        .iter()
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with(LEGACY_MAP_PREFIX))
        })
        .cloned()
        .collect();
    if map_files.is_empty() {
        return None;
    }

    match LegacyIdMap::load(&map_files) {
        Ok(map) => Some(map),
        Err(e) => {
            warn!(file = %e.path().display(), "Legacy identifier map not loaded: {e}");
            scan_errors.push(ScanError::new(
                e.path().to_path_buf(),
                ScanErrorKind::LegacyMap,
                e.to_string(),
            ));
            None
        }
    }
}

fn relative_path(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
