// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use serde_json::{json, Value};
use yubin_core::{resolve_catalog_db_path, ENV_YUBIN_CURSOR_SECRET};
use yubin_ingest::{
    diff_normalized_ids, explain_zipcode_query_plan, ingest_catalog, read_catalog_meta,
    IngestOptions,
};
use yubin_model::RecordFamily;
use yubin_query::{
    open_catalog_readonly, query_addresses, AddressFilter, AddressQueryRequest, QueryLimits,
};

use crate::output::{emit_ok, CliError, OutputMode};

const LOCAL_CURSOR_SECRET: &str = "yubin-local-cursor-secret";

pub(crate) struct IngestArgs {
    pub family: RecordFamily,
    pub input: PathBuf,
    pub db: Option<PathBuf>,
    pub encoding: Option<String>,
    pub output_root: Option<PathBuf>,
    pub emit_normalized_debug: bool,
    pub replay: bool,
    pub no_manifest: bool,
}

pub(crate) struct QueryArgs {
    pub family: RecordFamily,
    pub filter: AddressFilter,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
    pub db: Option<PathBuf>,
}

fn db_or_default(db: Option<PathBuf>) -> PathBuf {
    db.unwrap_or_else(resolve_catalog_db_path)
}

pub(crate) fn run_ingest(args: IngestArgs, output_mode: OutputMode) -> Result<(), CliError> {
    let db_path = db_or_default(args.db);
    let output_root = args.output_root.unwrap_or_else(|| {
        db_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    let result = ingest_catalog(&IngestOptions {
        family: args.family,
        input_path: args.input,
        db_path,
        encoding_label: args.encoding,
        output_root,
        emit_normalized_debug: args.emit_normalized_debug,
        normalized_replay_mode: args.replay,
        write_manifest: !args.no_manifest,
    })?;
    let counts = &result.manifest.counts;
    emit_ok(
        output_mode,
        &json!({
            "command": "ingest",
            "family": result.family,
            "table": result.manifest.table,
            "db": result.db_path,
            "manifest": result.manifest_path,
            "normalized_debug": result.normalized_debug_path,
            "encoding": result.manifest.encoding,
            "source_sha256": result.manifest.source_sha256,
            "counts": counts,
        }),
    )
}

fn cursor_secret() -> Vec<u8> {
    match std::env::var(ENV_YUBIN_CURSOR_SECRET) {
        Ok(secret) if !secret.trim().is_empty() => secret.into_bytes(),
        _ => {
            tracing::debug!("{ENV_YUBIN_CURSOR_SECRET} unset; using the local cursor secret");
            LOCAL_CURSOR_SECRET.as_bytes().to_vec()
        }
    }
}

pub(crate) fn run_query(args: QueryArgs, output_mode: OutputMode) -> Result<(), CliError> {
    let db_path = db_or_default(args.db);
    if !db_path.exists() {
        return Err(CliError::dependency(format!(
            "catalog {} does not exist; run `yubin ingest` first",
            db_path.display()
        )));
    }
    let conn = open_catalog_readonly(&db_path)?;
    let mut req = AddressQueryRequest::new(args.family, args.filter);
    req.limit = args.limit;
    req.cursor = args.cursor;
    let page = query_addresses(&conn, &req, &QueryLimits::default(), &cursor_secret())?;
    let payload =
        serde_json::to_value(&page).map_err(|e| CliError::internal(e.to_string()))?;
    emit_ok(output_mode, &payload)
}

pub(crate) fn inspect_db(
    db: Option<PathBuf>,
    sample_rows: usize,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let db_path = db_or_default(db);
    let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| CliError::dependency(format!("{}: {e}", db_path.display())))?;
    let sql_err = |e: rusqlite::Error| CliError::dependency(e.to_string());

    let schema_version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(sql_err)?;
    let mut idx_stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .map_err(sql_err)?;
    let indexes = idx_stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(sql_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sql_err)?;

    let mut families = Vec::new();
    for family in RecordFamily::ALL {
        if !table_exists(&conn, family.table_name()).map_err(sql_err)? {
            continue;
        }
        families.push(inspect_family(&conn, &db_path, family, sample_rows)?);
    }

    emit_ok(
        output_mode,
        &json!({
            "command": "inspect-db",
            "db": db_path,
            "schema_version": schema_version,
            "indexes": indexes,
            "families": families,
        }),
    )
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n > 0)
}

fn inspect_family(
    conn: &Connection,
    db_path: &Path,
    family: RecordFamily,
    sample_rows: usize,
) -> Result<Value, CliError> {
    let sql_err = |e: rusqlite::Error| CliError::dependency(e.to_string());
    let table = family.table_name();
    let row_count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(sql_err)?;
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id, zipcode, address FROM {table} ORDER BY id LIMIT ?1"
        ))
        .map_err(sql_err)?;
    let sample = stmt
        .query_map([sample_rows as i64], |row| {
            Ok(json!({
                "id": row.get::<_, i64>(0)?,
                "zipcode": row.get::<_, String>(1)?,
                "address": row.get::<_, String>(2)?,
            }))
        })
        .map_err(sql_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sql_err)?;
    let meta = read_catalog_meta(db_path, family)?;
    let plan = explain_zipcode_query_plan(db_path, family)?;
    Ok(json!({
        "family": family,
        "table": table,
        "row_count": row_count,
        "meta": meta,
        "zipcode_query_plan": plan,
        "sample_rows": sample,
    }))
}

pub(crate) fn diff_normalized(
    base: &Path,
    target: &Path,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let (removed, added) = diff_normalized_ids(base, target)?;
    emit_ok(
        output_mode,
        &json!({
            "command": "diff-normalized",
            "removed": removed,
            "added": added,
        }),
    )
}
