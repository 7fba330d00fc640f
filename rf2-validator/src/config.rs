//! Configuration types for RF2 validation.
//!
//! Split into core validation config (what is checked) and source-specific
//! config (how release files are discovered), so the core API does not leak
//! filesystem concerns.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;

use crate::cross_ref::CrossReferenceValidator;

/// Cooperative cancellation flag shared between the caller and the worker pool.
///
/// Checked before each file is validated; a file already in progress runs to
/// completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Core validation config, independent of the input source.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct ValidationConfig {
    /// Release date every row's `effectiveTime` should carry. Only consulted by
    /// cross-reference validators.
    pub expected_effective_time: Option<NaiveDate>,
    /// Semantic row validator. When set, fully parsed rows are forwarded to it
    /// and the legacy identifier maps are loaded.
    pub cross_reference: Option<Arc<dyn CrossReferenceValidator>>,
    /// Stops the run between files.
    pub cancel: CancellationToken,
}

/// Filesystem-specific source options.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct FsSourceConfig {
    /// Root of the release package. Required.
    pub root: PathBuf,
    /// Exclude patterns (glob format), matched against the full path and the file name.
    pub exclude: Vec<String>,
    /// Whether to follow symbolic links.
    ///
    /// **Defaults to `false`**. Resolved paths must stay inside `root` either way.
    pub follow_links: bool,
    /// Maximum directory traversal depth (default: 64).
    pub max_depth: usize,
    /// Worker threads for file validation; `0` uses one per CPU.
    pub threads: usize,
}

impl FsSourceConfig {
    /// Config for one release root with default limits.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

impl Default for FsSourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            exclude: Vec::new(),
            follow_links: false,
            max_depth: 64,
            threads: 0,
        }
    }
}
