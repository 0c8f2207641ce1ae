use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use condpp_core::{BatchSummary, FilePreprocessor};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::cli::CliOptions;

/// One independent unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Single file printed to stdout
    Stdout(PathBuf),
    File { source: PathBuf, output: PathBuf },
    Directory { source: PathBuf, output: PathBuf },
}

impl Job {
    fn execute(&self, driver: &FilePreprocessor) -> Result<(BatchSummary, Option<String>)> {
        match self {
            Job::Stdout(source) => {
                let (_, out) = driver.preprocess_path(source)?;
                let summary = BatchSummary {
                    files_processed: 1,
                    files_changed: usize::from(!out.is_unchanged()),
                    bytes_removed: out.removed_bytes(),
                    errors: Vec::new(),
                };
                Ok((summary, Some(out.text)))
            }
            Job::File { source, output } => Ok((driver.preprocess_file(source, output)?, None)),
            Job::Directory { source, output } => {
                Ok((driver.preprocess_directory(source, output)?, None))
            }
        }
    }
}

/// Everything a run produced
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub summary: BatchSummary,
    /// Transformed text when a single file was sent to stdout
    pub stdout: Option<String>,
}

/// Decide where every input goes.
///
/// A lone directory is written straight into the output directory; with
/// several inputs each one gets its own entry named after the input.
pub fn plan_jobs(options: &CliOptions) -> Result<Vec<Job>> {
    let Some(out_dir) = &options.out_dir else {
        return match options.inputs.as_slice() {
            [input] if !input.is_dir() => Ok(vec![Job::Stdout(input.clone())]),
            _ => Err(anyhow!(
                "--out-dir is required when preprocessing directories or multiple inputs"
            )),
        };
    };

    let single = options.inputs.len() == 1;
    options
        .inputs
        .iter()
        .map(|input| {
            let name = input
                .file_name()
                .ok_or_else(|| anyhow!("Input has no file name: {}", input.display()))?;
            if input.is_dir() {
                let output = if single { out_dir.clone() } else { out_dir.join(name) };
                Ok(Job::Directory {
                    source: input.clone(),
                    output,
                })
            } else {
                Ok(Job::File {
                    source: input.clone(),
                    output: out_dir.join(name),
                })
            }
        })
        .collect()
}

/// Run every job on the blocking pool and fold the results.
///
/// Jobs share nothing but the read-only driver, so they run concurrently. A
/// failing job is recorded in the summary and does not stop the others.
pub async fn run(options: &CliOptions) -> Result<RunOutcome> {
    let jobs = plan_jobs(options)?;
    let driver = Arc::new(FilePreprocessor::with_config(
        options.environment(),
        options.config(),
    ));
    debug!(jobs = jobs.len(), "starting preprocessing run");

    let mut tasks = JoinSet::new();
    for job in jobs {
        let driver = Arc::clone(&driver);
        tasks.spawn_blocking(move || job.execute(&driver));
    }

    let mut outcome = RunOutcome::default();
    while let Some(result) = tasks.join_next().await {
        match result? {
            Ok((summary, stdout)) => {
                outcome.summary.merge(summary);
                if stdout.is_some() {
                    outcome.stdout = stdout;
                }
            }
            Err(e) => outcome.summary.errors.push(format!("{e:#}")),
        }
    }
    // completion order is arbitrary
    outcome.summary.errors.sort();

    info!(
        files = outcome.summary.files_processed,
        changed = outcome.summary.files_changed,
        removed_bytes = outcome.summary.bytes_removed,
        errors = outcome.summary.errors.len(),
        "preprocessing run finished"
    );

    Ok(outcome)
}
