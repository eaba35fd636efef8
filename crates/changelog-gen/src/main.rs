// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! changelog-gen: prepend a changelog entry for the commits since the last one

use std::process::ExitCode;

use changelog_gen::cli::Cli;
use clap::Parser;
use tracing::debug;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level().into()),
        )
        .init();

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("error: cannot read current directory: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!(cwd = %cwd.display(), command = ?cli.command, "Starting");

    match cli.run(&cwd, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
