// SPDX-License-Identifier: Apache-2.0

use yubin_model::CatalogManifest;

use crate::hashing::SourceDigest;
use crate::job::IngestJob;
use crate::manifest::write_manifest;
use crate::normalized::{replay_counts_from_normalized, write_normalized_jsonl_zst};
use crate::pipeline::PipelineOutput;
use crate::sqlite::{replace_table, CatalogMeta, SqliteCatalogRow, SQLITE_SCHEMA_VERSION};
use crate::{IngestError, IngestErrorCode, IngestResult, PIPELINE_VERSION};

/// Persists a finished run: debug dump (optional, checked by replay), table
/// replace, then the manifest. No manifest is written unless the swap landed.
pub(crate) fn write_ingest_outputs<A>(
    job: &IngestJob,
    output: PipelineOutput<A>,
    encoding_name: &str,
    digest: &SourceDigest,
) -> Result<IngestResult, IngestError>
where
    A: SqliteCatalogRow,
{
    let family = job.family();
    let layout = &job.output_layout;

    let normalized_debug_path = if job.options.emit_normalized_debug {
        let path = layout.normalized_debug_path.clone();
        write_normalized_jsonl_zst(&path, family, &output.rows)?;
        if job.options.normalized_replay_mode {
            let replay = replay_counts_from_normalized(&path)?;
            if replay.rows != output.counts.catalog_rows {
                return Err(IngestError::new(
                    IngestErrorCode::Invariant,
                    format!(
                        "normalized replay mismatch: dump has {} rows, pipeline produced {}",
                        replay.rows, output.counts.catalog_rows
                    ),
                ));
            }
        }
        Some(path)
    } else {
        None
    };

    replace_table(
        &layout.db_path,
        &output.rows,
        &CatalogMeta {
            schema_version: SQLITE_SCHEMA_VERSION,
            row_count: output.counts.catalog_rows,
            source_sha256: digest.sha256.clone(),
            pipeline_version: PIPELINE_VERSION.to_string(),
            encoding: encoding_name.to_string(),
        },
    )?;

    let manifest = CatalogManifest::new(
        SQLITE_SCHEMA_VERSION.to_string(),
        PIPELINE_VERSION.to_string(),
        family,
        encoding_name.to_string(),
        digest.sha256.clone(),
        output.counts,
    )
    .with_rule_hits(
        output
            .rule_hits
            .iter()
            .map(|(name, hits)| ((*name).to_string(), *hits))
            .collect(),
    );
    let manifest_path = if job.options.write_manifest {
        write_manifest(&layout.manifest_path, &manifest)?;
        Some(layout.manifest_path.clone())
    } else {
        None
    };

    Ok(IngestResult {
        family,
        db_path: layout.db_path.clone(),
        manifest_path,
        normalized_debug_path,
        manifest,
        events: Vec::new(),
    })
}
