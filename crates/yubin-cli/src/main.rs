// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod actions;
mod commands;
mod output;

use std::process::ExitCode as ProcessExitCode;

use clap::{error::ErrorKind, CommandFactory, Parser};
use clap_complete::{generate, Generator};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use yubin_core::{env_bool, ExitCode, MachineError, ENV_YUBIN_LOG_JSON, ENV_YUBIN_LOG_LEVEL};
use yubin_query::AddressFilter;

use crate::actions::{IngestArgs, QueryArgs};
use crate::commands::{Cli, Commands};
use crate::output::{emit_error, CliError, OutputMode};

fn main() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError {
                    exit_code: ExitCode::Usage,
                    machine: MachineError::new("usage_error", "invalid command line arguments")
                        .with_detail("error", &err.to_string()),
                });
            }
        },
    };
    let output_mode = OutputMode { json: cli.json };
    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help"))?;
    init_tracing(cli.quiet, cli.verbose);

    match command {
        Commands::Ingest {
            family,
            input,
            db,
            encoding,
            output_root,
            emit_normalized_debug,
            replay,
            no_manifest,
        } => actions::run_ingest(
            IngestArgs {
                family,
                input,
                db,
                encoding,
                output_root,
                emit_normalized_debug,
                replay,
                no_manifest,
            },
            output_mode,
        ),
        Commands::Query {
            family,
            zipcode,
            address,
            company,
            limit,
            cursor,
            db,
        } => actions::run_query(
            QueryArgs {
                family,
                filter: AddressFilter {
                    zipcode,
                    address,
                    company,
                },
                limit,
                cursor,
                db,
            },
            output_mode,
        ),
        Commands::InspectDb { db, sample_rows } => {
            actions::inspect_db(db, sample_rows, output_mode)
        }
        Commands::DiffNormalized { base, target } => {
            actions::diff_normalized(&base, &target, output_mode)
        }
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    }
}

fn print_completion<G: Generator>(generator: G) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(generator, &mut command, name, &mut std::io::stdout());
}

/// Logs go to stderr so stdout stays a clean result document.
fn init_tracing(quiet: bool, verbose: u8) {
    let filter = if verbose > 1 {
        EnvFilter::new("trace")
    } else if verbose == 1 {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        std::env::var(ENV_YUBIN_LOG_LEVEL)
            .ok()
            .and_then(|level| EnvFilter::try_new(level).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    };
    let registry = tracing_subscriber::registry().with(filter);
    let initialized = if env_bool(ENV_YUBIN_LOG_JSON, false) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if initialized.is_err() {
        eprintln!("tracing subscriber already installed");
    }
}
