//! Library side of the `rf2-validate` binary, split out so the run can be
//! tested without spawning a process.

pub mod cli;
pub mod logging;
pub mod run;

pub use run::{echo_lookup_errors, run};
