//! Filesystem validation source.
//!
//! Discovers release files on disk and opens them for the validation pipeline.
//! Every regular file under the root is a candidate, because a stray file in a
//! release package is itself a naming error. Properties enforced here:
//! - Symlinks are not followed by default (`follow_links: false`)
//! - Resolved paths are checked to remain within the release root
//! - Device files, pipes, and sockets are skipped
//! - Maximum directory depth is enforced to prevent infinite recursion

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::config::FsSourceConfig;
use crate::error::{ScanError, ScanErrorKind};

/// UTF-8 byte order mark.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Check if a path matches any of the exclude patterns
fn matches_exclude(path: &Path, exclude_patterns: &[Pattern]) -> bool {
    let path_str = path.to_string_lossy();
    for pattern in exclude_patterns {
        if pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
        {
            return true;
        }
    }
    false
}

/// Find every release file under the configured root.
///
/// Returns `(files, scan_errors)`:
/// - `files`: sorted paths that passed all filters and are ready to validate.
/// - `scan_errors`: walk errors (permission denied, loop, etc.), boundary
///   violations and bad exclude patterns. These are never silently discarded.
#[must_use]
pub fn find_files(config: &FsSourceConfig) -> (Vec<PathBuf>, Vec<ScanError>) {
    let mut files = Vec::new();
    let mut scan_errors = Vec::new();

    let mut exclude_patterns = Vec::with_capacity(config.exclude.len());
    for pat_str in &config.exclude {
        match Pattern::new(pat_str) {
            Ok(pat) => exclude_patterns.push(pat),
            Err(e) => {
                scan_errors.push(ScanError::new(
                    PathBuf::from(pat_str),
                    ScanErrorKind::InvalidExcludePattern,
                    format!("Invalid exclude glob pattern '{pat_str}': {e}"),
                ));
            }
        }
    }

    let root = &config.root;
    // Canonicalize the root once so we can enforce the boundary for every entry.
    let canonical_root = match root.canonicalize() {
        Ok(r) => r,
        Err(e) => {
            scan_errors.push(ScanError::new(
                root.clone(),
                ScanErrorKind::IoError,
                format!("Failed to canonicalize root path: {e}"),
            ));
            return (files, scan_errors);
        }
    };

    for entry_result in WalkDir::new(root)
        .follow_links(config.follow_links)
        .max_depth(config.max_depth)
        .sort_by_file_name()
    {
        let entry = match entry_result {
            Ok(e) => e,
            Err(walk_err) => {
                let path = walk_err
                    .path()
                    .map_or_else(|| root.clone(), Path::to_path_buf);
                scan_errors.push(ScanError::new(
                    path,
                    ScanErrorKind::WalkError,
                    format!("Directory traversal error: {walk_err}"),
                ));
                continue;
            }
        };

        let file_path = entry.path();

        if !file_path.is_file() {
            continue;
        }

        // Catches symlink escapes even when follow_links is true.
        match file_path.canonicalize() {
            Ok(canonical_path) => {
                if !canonical_path.starts_with(&canonical_root) {
                    scan_errors.push(ScanError::new(
                        file_path.to_path_buf(),
                        ScanErrorKind::OutsideRepository,
                        format!(
                            "Path resolves outside the release root: {} -> {}",
                            file_path.display(),
                            canonical_path.display()
                        ),
                    ));
                    continue;
                }
            }
            Err(e) => {
                scan_errors.push(ScanError::new(
                    file_path.to_path_buf(),
                    ScanErrorKind::IoError,
                    format!("Failed to canonicalize path: {e}"),
                ));
                continue;
            }
        }

        // Only regular files: skip devices, pipes and sockets
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if let Ok(ft) = entry.metadata().map(|m| m.file_type())
                && (ft.is_block_device() || ft.is_char_device() || ft.is_fifo() || ft.is_socket())
            {
                continue;
            }
        }

        if matches_exclude(file_path, &exclude_patterns) {
            continue;
        }

        files.push(file_path.to_path_buf());
    }

    files.sort();
    files.dedup();
    (files, scan_errors)
}

/// Open a text file for reading, positioned after any UTF-8 byte order mark.
///
/// # Errors
///
/// Returns any I/O error from opening or reading the file.
pub fn open_text(path: &Path) -> io::Result<BufReader<File>> {
    let mut reader = BufReader::new(File::open(path)?);
    skip_bom(&mut reader)?;
    Ok(reader)
}

/// Consume a leading byte order mark, if present.
///
/// # Errors
///
/// Returns any I/O error from filling the buffer.
pub fn skip_bom<R: BufRead>(reader: &mut R) -> io::Result<()> {
    if reader.fill_buf()?.starts_with(BOM) {
        reader.consume(BOM.len());
    }
    Ok(())
}

/// Physical lines of a text file, each paired with its 1-based line number.
///
/// Lines are split on LF and a trailing CR is dropped. Blank lines are
/// yielded as empty buffers, so numbering always matches the file.
#[derive(Debug)]
pub struct NumberedLines<R> {
    lines: io::Split<R>,
    next_line: usize,
}

impl<R: BufRead> Iterator for NumberedLines<R> {
    type Item = (usize, io::Result<Vec<u8>>);

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        let number = self.next_line;
        self.next_line += 1;
        let line = line.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            bytes
        });
        Some((number, line))
    }
}

/// Number the lines of `reader`, starting at `first_line`.
#[must_use]
pub fn numbered_lines<R: BufRead>(reader: R, first_line: usize) -> NumberedLines<R> {
    NumberedLines {
        lines: reader.split(b'\n'),
        next_line: first_line,
    }
}
