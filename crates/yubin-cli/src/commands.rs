// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use yubin_model::RecordFamily;

#[derive(Parser)]
#[command(name = "yubin")]
#[command(about = "Japan Post postal-code catalog builder and lookup")]
#[command(version)]
pub(crate) struct Cli {
    /// Print results and errors as single-line JSON.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
    #[arg(long, global = true, default_value_t = false)]
    pub quiet: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Normalize a KEN_ALL or JIGYOSYO file and replace its catalog table.
    Ingest {
        #[arg(long, value_parser = parse_family)]
        family: RecordFamily,
        #[arg(long)]
        input: PathBuf,
        /// Defaults to `YUBIN_CATALOG_DB`, then the data directory.
        #[arg(long)]
        db: Option<PathBuf>,
        /// WHATWG label overriding the family default.
        #[arg(long)]
        encoding: Option<String>,
        /// Manifest and debug dump directory; defaults to the db directory.
        #[arg(long)]
        output_root: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        emit_normalized_debug: bool,
        /// Re-read the debug dump and compare counts before swapping tables.
        #[arg(long, default_value_t = false, requires = "emit_normalized_debug")]
        replay: bool,
        #[arg(long, default_value_t = false)]
        no_manifest: bool,
    },
    /// Look up catalog rows by zipcode, address or company.
    Query {
        #[arg(long, value_parser = parse_family, default_value = "ken_all")]
        family: RecordFamily,
        #[arg(long)]
        zipcode: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        cursor: Option<String>,
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Report schema version, tables, metadata and the zipcode query plan.
    InspectDb {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long, default_value_t = 3)]
        sample_rows: usize,
    },
    /// Compare record ids between two normalized debug dumps.
    DiffNormalized {
        #[arg(long)]
        base: PathBuf,
        #[arg(long)]
        target: PathBuf,
    },
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_family(raw: &str) -> Result<RecordFamily, String> {
    RecordFamily::parse(raw).map_err(|e| e.0)
}
