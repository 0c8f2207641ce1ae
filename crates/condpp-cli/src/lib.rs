//! condpp command-line driver
//!
//! Argument parsing and the job runner behind the `condpp` binary. Kept in a
//! library so integration tests can drive it without spawning processes.

pub mod cli;
pub mod runner;

pub use cli::{build_command, CliOptions};
pub use runner::{plan_jobs, run, Job, RunOutcome};
