//! CR+LF line ending checks.

use std::io::{self, Read};

use crate::error::{ErrorKind, ValidationError};

const BUFFER_SIZE: usize = 8 * 1024;

/// Result of scanning a file's line endings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEndingCheck {
    /// The first `\n` in the file is preceded by `\r`.
    pub first_line_crlf: bool,
    /// The file ends with `\r\n`.
    pub ends_with_crlf: bool,
}

impl LineEndingCheck {
    #[must_use]
    pub fn is_ok(self) -> bool {
        self.first_line_crlf && self.ends_with_crlf
    }

    /// One error per failed check.
    #[must_use]
    pub fn errors(self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if !self.first_line_crlf {
            errors.push(ValidationError::file(
                ErrorKind::LineEnding,
                "Files are supposed to have windows style line feeds - CR+LF",
            ));
        }
        if !self.ends_with_crlf {
            errors.push(ValidationError::file(
                ErrorKind::LineEnding,
                "Files are supposed to end with a windows style line feed - CR+LF",
            ));
        }
        errors
    }
}

/// Stream `reader` to the end, checking the first line terminator and the
/// final two bytes.
///
/// # Errors
/// Returns any I/O error from the reader.
pub fn check_line_endings<R: Read>(mut reader: R) -> io::Result<LineEndingCheck> {
    let mut buffer = [0u8; BUFFER_SIZE];
    let mut previous: Option<u8> = None;
    let mut last: Option<u8> = None;
    let mut first_line_crlf: Option<bool> = None;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let chunk = &buffer[..read];

        if first_line_crlf.is_none()
            && let Some(newline) = chunk.iter().position(|b| *b == b'\n')
        {
            let before = if newline == 0 {
                last
            } else {
                Some(chunk[newline - 1])
            };
            first_line_crlf = Some(before == Some(b'\r'));
        }

        match chunk {
            [.., second_last, final_byte] => {
                previous = Some(*second_last);
                last = Some(*final_byte);
            }
            [only] => {
                previous = last;
                last = Some(*only);
            }
            [] => {}
        }
    }

    Ok(LineEndingCheck {
        first_line_crlf: first_line_crlf.unwrap_or(false),
        ends_with_crlf: previous == Some(b'\r') && last == Some(b'\n'),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn check(content: &[u8]) -> LineEndingCheck {
        check_line_endings(content).unwrap()
    }

    /// Delivers one byte per read call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((first, rest)) if !buf.is_empty() => {
                    buf[0] = *first;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_all_crlf() {
        let result = check(b"id\tactive\r\n1\t0\r\n");
        assert!(result.is_ok());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_lf_only_fails_both() {
        let result = check(b"id\tactive\n1\t0\n");
        assert!(!result.first_line_crlf);
        assert!(!result.ends_with_crlf);
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn test_bare_lf_at_end_fails_only_eof_check() {
        let result = check(b"id\tactive\r\n1\t0\r\n2\t1\n");
        assert!(result.first_line_crlf);
        assert!(!result.ends_with_crlf);
        let errors = result.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("end with a windows style line feed"));
    }

    #[test]
    fn test_no_trailing_newline() {
        let result = check(b"id\tactive\r\n1\t0");
        assert!(result.first_line_crlf);
        assert!(!result.ends_with_crlf);
    }

    #[test]
    fn test_no_newline_at_all() {
        let result = check(b"id\tactive");
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let result = check(b"");
        assert!(!result.is_ok());
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn test_single_line() {
        assert!(check(b"id\r\n").is_ok());
    }

    #[test]
    fn test_crlf_split_across_reads() {
        let result = check_line_endings(Trickle(b"a\r\nb\r\n")).unwrap();
        assert!(result.is_ok());
        let result = check_line_endings(Trickle(b"a\nb\r\n")).unwrap();
        assert!(!result.first_line_crlf);
        assert!(result.ends_with_crlf);
    }

    #[test]
    fn test_large_input_spanning_buffers() {
        let mut content = b"header\r\n".to_vec();
        content.extend(std::iter::repeat_n(b'x', BUFFER_SIZE * 2 + 1));
        content.extend_from_slice(b"\r\n");
        assert!(check(&content).is_ok());
    }
}
