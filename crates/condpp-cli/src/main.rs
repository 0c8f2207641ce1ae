use std::process::ExitCode;

use anyhow::Result;
use condpp_cli::{build_command, run, CliOptions};
use condpp_core::init_tracing;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = build_command().get_matches();
    let options = CliOptions::from_matches(&matches)?;

    init_tracing(if options.debug { "debug" } else { "warn" });

    let outcome = run(&options).await?;

    if let Some(text) = &outcome.stdout {
        print!("{text}");
    }

    for error in &outcome.summary.errors {
        eprintln!("error: {error}");
    }

    if outcome.summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
