// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, ToSql};
use yubin_model::{AddressRow, JigyosyoAddress, KenAllAddress, RecordFamily};

use crate::IngestError;

pub const SQLITE_SCHEMA_VERSION: i64 = 1;

/// A finished row that knows its table layout. Every column after `id` is
/// `TEXT NOT NULL`; empty source fields are stored as empty strings.
pub trait SqliteCatalogRow: AddressRow {
    const FAMILY: RecordFamily;
    const COLUMNS: &'static [&'static str];

    /// Values in `COLUMNS` order.
    fn text_values(&self) -> Vec<&str>;
}

impl SqliteCatalogRow for KenAllAddress {
    const FAMILY: RecordFamily = RecordFamily::KenAll;
    const COLUMNS: &'static [&'static str] = &["zipcode", "prefecture", "city", "town", "address"];

    fn text_values(&self) -> Vec<&str> {
        vec![
            self.zipcode.as_str(),
            self.prefecture.as_str(),
            self.city.as_str(),
            self.town.as_str(),
            self.address.as_str(),
        ]
    }
}

impl SqliteCatalogRow for JigyosyoAddress {
    const FAMILY: RecordFamily = RecordFamily::Jigyosyo;
    const COLUMNS: &'static [&'static str] = &[
        "company",
        "zipcode",
        "prefecture",
        "city",
        "town",
        "chome",
        "address",
    ];

    fn text_values(&self) -> Vec<&str> {
        vec![
            self.company.as_str(),
            self.zipcode.as_str(),
            self.prefecture.as_str(),
            self.city.as_str(),
            self.town.as_str(),
            self.chome.as_str(),
            self.address.as_str(),
        ]
    }
}

/// Bookkeeping stored in `catalog_meta` next to each family's table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CatalogMeta {
    pub schema_version: i64,
    pub row_count: u64,
    pub source_sha256: String,
    pub pipeline_version: String,
    pub encoding: String,
}

fn open_catalog(path: &Path) -> Result<Connection, IngestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(IngestError::io)?;
    }
    let conn = Connection::open(path).map_err(IngestError::storage)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA temp_store=MEMORY;
        CREATE TABLE IF NOT EXISTS catalog_meta (
          family TEXT NOT NULL,
          k TEXT NOT NULL,
          v TEXT NOT NULL,
          PRIMARY KEY (family, k)
        ) WITHOUT ROWID;
        ",
    )
    .map_err(IngestError::storage)?;
    conn.execute_batch(&format!("PRAGMA user_version={SQLITE_SCHEMA_VERSION};"))
        .map_err(IngestError::storage)?;
    Ok(conn)
}

/// Replaces the family's table with `rows`. The rows are first written to
/// `<table>__staging`; the drop, rename, index build and meta update then
/// commit as one transaction, so readers see either the old table or the
/// complete new one.
pub fn replace_table<T: SqliteCatalogRow>(
    path: &Path,
    rows: &[T],
    meta: &CatalogMeta,
) -> Result<(), IngestError> {
    let table = T::FAMILY.table_name();
    let staging = format!("{table}__staging");
    let column_defs = T::COLUMNS
        .iter()
        .map(|c| format!("{c} TEXT NOT NULL"))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=T::COLUMNS.len() + 1)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut conn = open_catalog(path)?;
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {staging};
         CREATE TABLE {staging} (id INTEGER PRIMARY KEY, {column_defs});"
    ))
    .map_err(IngestError::storage)?;

    let tx = conn.transaction().map_err(IngestError::storage)?;
    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {staging} (id, {}) VALUES ({placeholders})",
                T::COLUMNS.join(", ")
            ))
            .map_err(IngestError::storage)?;
        for row in rows {
            let id = i64::try_from(row.id()).map_err(IngestError::storage)?;
            let values = row.text_values();
            let mut bound: Vec<&dyn ToSql> = Vec::with_capacity(values.len() + 1);
            bound.push(&id);
            bound.extend(values.iter().map(|v| v as &dyn ToSql));
            stmt.execute(bound.as_slice())
                .map_err(IngestError::storage)?;
        }
    }
    tx.commit().map_err(IngestError::storage)?;
    tracing::debug!(table, rows = rows.len(), "staging table written");

    let tx = conn.transaction().map_err(IngestError::storage)?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};
         ALTER TABLE {staging} RENAME TO {table};
         CREATE INDEX idx_{table}_zipcode ON {table}(zipcode);"
    ))
    .map_err(IngestError::storage)?;
    let family = T::FAMILY.as_str();
    for (k, v) in [
        ("schema_version", meta.schema_version.to_string()),
        ("row_count", meta.row_count.to_string()),
        ("source_sha256", meta.source_sha256.clone()),
        ("pipeline_version", meta.pipeline_version.clone()),
        ("encoding", meta.encoding.clone()),
    ] {
        tx.execute(
            "INSERT OR REPLACE INTO catalog_meta (family, k, v) VALUES (?1, ?2, ?3)",
            params![family, k, v],
        )
        .map_err(IngestError::storage)?;
    }
    tx.commit().map_err(IngestError::storage)?;
    conn.execute_batch("ANALYZE;")
        .map_err(IngestError::storage)?;
    tracing::info!(table, rows = rows.len(), "catalog table replaced");
    Ok(())
}

pub fn read_catalog_meta(
    path: &Path,
    family: RecordFamily,
) -> Result<Option<CatalogMeta>, IngestError> {
    let conn = Connection::open(path).map_err(IngestError::storage)?;
    let has_meta: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='catalog_meta'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(IngestError::storage)?;
    if has_meta.is_none() {
        return Ok(None);
    }
    let mut stmt = conn
        .prepare("SELECT k, v FROM catalog_meta WHERE family=?1")
        .map_err(IngestError::storage)?;
    let pairs = stmt
        .query_map(params![family.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(IngestError::storage)?
        .collect::<Result<std::collections::BTreeMap<_, _>, _>>()
        .map_err(IngestError::storage)?;
    if pairs.is_empty() {
        return Ok(None);
    }
    let get = |k: &str| {
        pairs
            .get(k)
            .cloned()
            .ok_or_else(|| IngestError::storage(format!("catalog_meta missing {k} for {family}")))
    };
    Ok(Some(CatalogMeta {
        schema_version: get("schema_version")?
            .parse()
            .map_err(IngestError::storage)?,
        row_count: get("row_count")?.parse().map_err(IngestError::storage)?,
        source_sha256: get("source_sha256")?,
        pipeline_version: get("pipeline_version")?,
        encoding: get("encoding")?,
    }))
}

pub fn explain_plan_for_zipcode_query(
    path: &Path,
    family: RecordFamily,
) -> Result<Vec<String>, IngestError> {
    let conn = Connection::open(path).map_err(IngestError::storage)?;
    let mut stmt = conn
        .prepare(&format!(
            "EXPLAIN QUERY PLAN SELECT id FROM {} WHERE zipcode=?1 ORDER BY id LIMIT 10",
            family.table_name()
        ))
        .map_err(IngestError::storage)?;
    let rows = stmt
        .query_map(params!["0600000"], |row| {
            let detail: String = row.get(3)?;
            Ok(detail)
        })
        .map_err(IngestError::storage)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(IngestError::storage)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn meta(rows: u64) -> CatalogMeta {
        CatalogMeta {
            schema_version: SQLITE_SCHEMA_VERSION,
            row_count: rows,
            source_sha256: "0".repeat(64),
            pipeline_version: "1".to_string(),
            encoding: "Shift_JIS".to_string(),
        }
    }

    fn ken(id: u64, zip: &str, town: &str) -> KenAllAddress {
        KenAllAddress {
            id,
            zipcode: zip.to_string(),
            prefecture: "北海道".to_string(),
            city: "札幌市中央区".to_string(),
            town: town.to_string(),
            address: format!("北海道札幌市中央区{town}"),
        }
    }

    fn count(path: &Path, table: &str) -> i64 {
        let conn = Connection::open(path).expect("open");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .expect("count")
    }

    #[test]
    fn replace_swaps_table_and_leaves_no_staging() {
        let dir = tempdir().expect("tempdir");
        let db = dir.path().join("zipcode.db");
        replace_table(&db, &[ken(1, "0600000", ""), ken(2, "0640941", "旭ケ丘")], &meta(2))
            .expect("first");
        assert_eq!(count(&db, "ken_all"), 2);
        replace_table(&db, &[ken(1, "0600001", "北一条西")], &meta(1)).expect("second");
        assert_eq!(count(&db, "ken_all"), 1);

        let conn = Connection::open(&db).expect("open");
        let staging: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name LIKE '%__staging'",
                [],
                |r| r.get(0),
            )
            .expect("staging");
        assert_eq!(staging, 0);
        assert_eq!(
            read_catalog_meta(&db, RecordFamily::KenAll).expect("meta"),
            Some(meta(1))
        );
        assert_eq!(read_catalog_meta(&db, RecordFamily::Jigyosyo).expect("meta"), None);
    }

    #[test]
    fn families_share_one_catalog_file() {
        let dir = tempdir().expect("tempdir");
        let db = dir.path().join("zipcode.db");
        replace_table(&db, &[ken(1, "0600000", "")], &meta(1)).expect("ken_all");
        let office = JigyosyoAddress {
            id: 1,
            company: "札幌市役所".to_string(),
            zipcode: "0608611".to_string(),
            prefecture: "北海道".to_string(),
            city: "札幌市中央区".to_string(),
            town: "北一条西".to_string(),
            chome: String::new(),
            address: "北海道札幌市中央区北一条西".to_string(),
        };
        replace_table(&db, &[office], &meta(1)).expect("jigyosyo");
        assert_eq!(count(&db, "ken_all"), 1);
        assert_eq!(count(&db, "jigyosyo"), 1);
        let chome: String = Connection::open(&db)
            .expect("open")
            .query_row("SELECT chome FROM jigyosyo", [], |r| r.get(0))
            .expect("chome");
        assert_eq!(chome, "");
    }

    #[test]
    fn zipcode_lookup_uses_index() {
        let dir = tempdir().expect("tempdir");
        let db = dir.path().join("zipcode.db");
        let rows: Vec<_> = (1..=50)
            .map(|i| ken(i, &format!("{:07}", 600_000 + i), "町"))
            .collect();
        replace_table(&db, &rows, &meta(50)).expect("write");
        let plan = explain_plan_for_zipcode_query(&db, RecordFamily::KenAll).expect("plan");
        assert!(
            plan.iter().any(|d| d.contains("idx_ken_all_zipcode")),
            "{plan:?}"
        );
    }
}
