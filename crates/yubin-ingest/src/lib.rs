// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Normalization pipeline for the Japan Post postal-code master files.
//!
//! Bytes flow through decode, width normalization, continuation merge, the
//! town-name rule cascade, bracket expansion, explode/dedup and assembly
//! before a single atomic table replace in the SQLite catalog.

mod assemble;
mod decode;
mod expand;
mod explode;
mod hashing;
mod job;
mod logging;
mod manifest;
mod merge;
mod normalized;
mod pipeline;
mod rules;
mod sqlite;
mod width;
mod write;

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use yubin_model::{
    CatalogManifest, FamilyRecord, JigyosyoAddress, JigyosyoRecord, KenAllAddress, KenAllRecord,
    RecordFamily,
};

pub const CRATE_NAME: &str = "yubin-ingest";
pub const PIPELINE_VERSION: &str = "1";

pub use assemble::{assemble, verify_addresses};
pub use decode::{decode_source, read_records, resolve_encoding};
pub use expand::expand_brackets;
pub use explode::{dedup_exact, explode_towns, TOWN_DELIMITER};
pub use hashing::{hash_file, SourceDigest};
pub use job::{IngestInputs, IngestJob, OutputLayout};
pub use logging::{IngestEvent, IngestLog, IngestStage};
pub use manifest::{read_manifest, write_manifest};
pub use merge::{merge_continuations, paren_balance, step, MergeOutcome, MergeState};
pub use normalized::ReplayCounts;
pub use pipeline::{run_pipeline, PipelineOutput, RuleHits, TownNormalizer};
pub use rules::{RuleCascade, RuleSpec, RewriteSpec, TownRule, TriggerSpec, TOWN_CORRECTIONS};
pub use sqlite::{CatalogMeta, SqliteCatalogRow, SQLITE_SCHEMA_VERSION};
pub use width::{normalize_record, to_narrow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum IngestErrorCode {
    /// Undecodable bytes, short rows or unbalanced parentheses.
    Format,
    Config,
    Io,
    Storage,
    Serialization,
    /// A finished row broke an output guarantee.
    Invariant,
}

impl IngestErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Config => "config",
            Self::Io => "io",
            Self::Storage => "storage",
            Self::Serialization => "serialization",
            Self::Invariant => "invariant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestError {
    pub code: IngestErrorCode,
    pub message: String,
}

impl IngestError {
    #[must_use]
    pub fn new(code: IngestErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(IngestErrorCode::Format, message)
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(IngestErrorCode::Config, message)
    }

    pub(crate) fn io(err: impl Display) -> Self {
        Self::new(IngestErrorCode::Io, err.to_string())
    }

    pub(crate) fn storage(err: impl Display) -> Self {
        Self::new(IngestErrorCode::Storage, err.to_string())
    }

    pub(crate) fn serialization(err: impl Display) -> Self {
        Self::new(IngestErrorCode::Serialization, err.to_string())
    }
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for IngestError {}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub family: RecordFamily,
    pub input_path: PathBuf,
    pub db_path: PathBuf,
    /// Overrides the family default (`shift_jis` or `cp932`).
    pub encoding_label: Option<String>,
    /// Manifest and debug dump directory.
    pub output_root: PathBuf,
    pub emit_normalized_debug: bool,
    pub normalized_replay_mode: bool,
    pub write_manifest: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            family: RecordFamily::KenAll,
            input_path: PathBuf::new(),
            db_path: PathBuf::new(),
            encoding_label: None,
            output_root: PathBuf::new(),
            emit_normalized_debug: false,
            normalized_replay_mode: false,
            write_manifest: true,
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn effective_encoding_label(&self) -> &str {
        self.encoding_label
            .as_deref()
            .unwrap_or_else(|| self.family.default_encoding_label())
    }
}

#[derive(Debug, Clone)]
pub struct IngestResult {
    pub family: RecordFamily,
    pub db_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub normalized_debug_path: Option<PathBuf>,
    pub manifest: CatalogManifest,
    pub events: Vec<IngestEvent>,
}

pub fn ingest_catalog(opts: &IngestOptions) -> Result<IngestResult, IngestError> {
    ingest_catalog_with_events(opts).map(|(result, _)| result)
}

pub fn ingest_catalog_with_events(
    opts: &IngestOptions,
) -> Result<(IngestResult, Vec<IngestEvent>), IngestError> {
    let mut log = IngestLog::default();
    log.emit(
        IngestStage::Prepare,
        "ingest.start",
        logging::fields([
            ("family", opts.family.to_string()),
            ("input", opts.input_path.display().to_string()),
        ]),
    );
    let job = IngestJob::from_options(opts)?;
    let result = match opts.family {
        RecordFamily::KenAll => ingest_family::<KenAllRecord>(&job, &mut log),
        RecordFamily::Jigyosyo => ingest_family::<JigyosyoRecord>(&job, &mut log),
    };
    let mut result = result.map_err(|err| {
        tracing::error!(code = err.code.as_str(), error = %err.message, "ingest failed");
        err
    })?;
    result.events = log.events().to_vec();
    Ok((result, log.into_events()))
}

fn ingest_family<R>(job: &IngestJob, log: &mut IngestLog) -> Result<IngestResult, IngestError>
where
    R: FamilyRecord,
    R::Address: SqliteCatalogRow,
{
    let encoding = resolve_encoding(job.options.effective_encoding_label())?;
    let bytes = hashing::read_source(&job.inputs.source_path)?;
    let digest = SourceDigest::of_bytes(&bytes);
    log.emit(
        IngestStage::Decode,
        "ingest.decode.begin",
        logging::fields([
            ("encoding", encoding.name().to_string()),
            ("bytes", bytes.len().to_string()),
        ]),
    );
    let normalizer = TownNormalizer::compile()?;
    let output = run_pipeline::<R>(&bytes, encoding, &normalizer, log)?;
    log.emit(
        IngestStage::Normalize,
        "ingest.normalize.complete",
        logging::fields([
            ("source_rows", output.counts.source_rows.to_string()),
            ("catalog_rows", output.counts.catalog_rows.to_string()),
            (
                "duplicates_removed",
                output.counts.duplicates_removed.to_string(),
            ),
        ]),
    );
    log.emit(
        IngestStage::Persist,
        "ingest.persist.begin",
        logging::fields([("table", R::FAMILY.table_name().to_string())]),
    );
    let result = write::write_ingest_outputs(job, output, encoding.name(), &digest)?;
    log.emit(
        IngestStage::Finalize,
        "ingest.persist.complete",
        logging::fields([("db", result.db_path.display().to_string())]),
    );
    Ok(result)
}

/// Runs decode through assembly on in-memory KEN_ALL bytes.
pub fn normalize_ken_all(
    bytes: &[u8],
    encoding_label: &str,
) -> Result<PipelineOutput<KenAllAddress>, IngestError> {
    let encoding = resolve_encoding(encoding_label)?;
    let normalizer = TownNormalizer::compile()?;
    run_pipeline::<KenAllRecord>(bytes, encoding, &normalizer, &mut IngestLog::default())
}

/// Runs decode through assembly on in-memory JIGYOSYO bytes.
pub fn normalize_jigyosyo(
    bytes: &[u8],
    encoding_label: &str,
) -> Result<PipelineOutput<JigyosyoAddress>, IngestError> {
    let encoding = resolve_encoding(encoding_label)?;
    let normalizer = TownNormalizer::compile()?;
    run_pipeline::<JigyosyoRecord>(bytes, encoding, &normalizer, &mut IngestLog::default())
}

pub fn explain_zipcode_query_plan(
    db_path: &Path,
    family: RecordFamily,
) -> Result<Vec<String>, IngestError> {
    sqlite::explain_plan_for_zipcode_query(db_path, family)
}

pub fn read_catalog_meta(
    db_path: &Path,
    family: RecordFamily,
) -> Result<Option<CatalogMeta>, IngestError> {
    sqlite::read_catalog_meta(db_path, family)
}

pub fn replay_normalized_counts(path: &Path) -> Result<ReplayCounts, IngestError> {
    normalized::replay_counts_from_normalized(path)
}

pub fn diff_normalized_ids(
    base: &Path,
    target: &Path,
) -> Result<(Vec<String>, Vec<String>), IngestError> {
    normalized::diff_normalized_record_ids(base, target)
}

#[cfg(test)]
mod tests;
