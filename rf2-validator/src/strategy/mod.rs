//! Validation source strategies.
//!
//! Only the filesystem strategy (`fs` module) exists, backing the concrete
//! `validate_fs()` public API.

pub mod fs;
