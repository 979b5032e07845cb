// crates/sentinel-cli/src/main.rs
// ============================================================================
// Module: Sentinel CLI Entry Point
// Description: Command dispatcher for the ingest and brief subcommands (A5).
// Purpose: Thin, synchronous CLI wrapper over the sentinel-core pipeline.
// Dependencies: clap, sentinel-config, sentinel-core, sentinel-store-sqlite
// ============================================================================

//! ## Overview
//! Two subcommands, matching §6's CLI surface: `ingest` drives one batch of
//! already-staged raw items through the pipeline, `brief` renders a
//! markdown/JSON digest of recently-seen alerts. Exit codes follow §6:
//! `0` success, `1` configuration or database error, `2` partial ingest
//! (the batch ran, but at least one item failed).

// ============================================================================
// SECTION: Modules
// ============================================================================

mod brief;
mod errors;
mod ingest;
mod logging;
mod util;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write as _;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;

use crate::brief::BriefArgs;
use crate::ingest::IngestArgs;

// ============================================================================
// SECTION: CLI
// ============================================================================

/// Local-first supply-chain risk ingestion pipeline.
#[derive(Parser, Debug)]
#[command(name = "sentinel", version, about)]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Top-level subcommands (§6).
#[derive(Subcommand, Debug)]
enum Command {
    /// Stage and process a batch of raw item candidates.
    Ingest(IngestArgs),
    /// Render a digest of recently-seen alerts.
    Brief(BriefArgs),
}

// ============================================================================
// SECTION: Main
// ============================================================================

/// Entry point; dispatches to the selected subcommand and maps its outcome
/// to the exit codes §6 specifies.
fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Ingest(args) => run_ingest(&args),
        Command::Brief(args) => run_brief(&args),
    }
}

/// Runs `sentinel ingest`, mapping the report to an exit code.
fn run_ingest(args: &IngestArgs) -> ExitCode {
    match ingest::run(args) {
        Ok(report) => {
            let _ = write_stdout_line(&format!(
                "processed={} events={} alerts={} errors={}",
                report.processed, report.events, report.alerts, report.errors
            ));
            if report.errors > 0 {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "ingest failed");
            err.exit_code()
        }
    }
}

/// Runs `sentinel brief`, printing the rendered digest.
fn run_brief(args: &BriefArgs) -> ExitCode {
    match brief::run(args) {
        Ok(rendered) => {
            let _ = write_stdout_line(&rendered);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "brief failed");
            err.exit_code()
        }
    }
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::Cli;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
