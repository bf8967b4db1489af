// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use yubin_core::canonical;
use yubin_model::{AddressRow, RecordFamily};

use crate::IngestError;

pub const NORMALIZED_SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NormalizedRecord {
    schema_version: u64,
    family: RecordFamily,
    /// Content address: stable across runs even when ids shift.
    record_id: String,
    zipcode: String,
    payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReplayCounts {
    pub rows: u64,
    pub distinct_zipcodes: u64,
}

fn record_id(family: RecordFamily, zipcode: &str, payload: &serde_json::Value) -> Result<String, IngestError> {
    let mut content = payload.clone();
    if let Some(obj) = content.as_object_mut() {
        obj.remove("id");
    }
    let hash = canonical::stable_json_hash_hex(&content).map_err(IngestError::serialization)?;
    Ok(format!("{family}:{zipcode}:{}", &hash[..16]))
}

/// One canonical JSON line per final row, in id order, zstd-compressed.
pub fn write_normalized_jsonl_zst<A: AddressRow>(
    out_path: &Path,
    family: RecordFamily,
    rows: &[A],
) -> Result<(), IngestError> {
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(IngestError::io)?;
    }
    let file = fs::File::create(out_path).map_err(IngestError::io)?;
    let mut encoder = zstd::stream::write::Encoder::new(file, 3).map_err(IngestError::io)?;
    for row in rows {
        let payload = serde_json::to_value(row).map_err(IngestError::serialization)?;
        let item = NormalizedRecord {
            schema_version: NORMALIZED_SCHEMA_VERSION,
            family,
            record_id: record_id(family, row.zipcode(), &payload)?,
            zipcode: row.zipcode().to_string(),
            payload,
        };
        let mut line = canonical::stable_json_bytes(&item).map_err(IngestError::serialization)?;
        line.push(b'\n');
        encoder.write_all(&line).map_err(IngestError::io)?;
    }
    encoder.finish().map_err(IngestError::io)?;
    Ok(())
}

fn read_normalized(path: &Path) -> Result<Vec<NormalizedRecord>, IngestError> {
    let file = fs::File::open(path).map_err(IngestError::io)?;
    let decoder = zstd::stream::read::Decoder::new(file).map_err(IngestError::io)?;
    let mut out = Vec::new();
    for line in BufReader::new(decoder).lines() {
        let line = line.map_err(IngestError::io)?;
        if line.trim().is_empty() {
            continue;
        }
        let rec: NormalizedRecord =
            serde_json::from_str(&line).map_err(IngestError::serialization)?;
        if rec.schema_version != NORMALIZED_SCHEMA_VERSION {
            return Err(IngestError::format(format!(
                "normalized schema version mismatch: expected {NORMALIZED_SCHEMA_VERSION}, got {}",
                rec.schema_version
            )));
        }
        out.push(rec);
    }
    Ok(out)
}

pub fn replay_counts_from_normalized(path: &Path) -> Result<ReplayCounts, IngestError> {
    let records = read_normalized(path)?;
    let zipcodes: BTreeSet<&str> = records.iter().map(|r| r.zipcode.as_str()).collect();
    Ok(ReplayCounts {
        rows: records.len() as u64,
        distinct_zipcodes: zipcodes.len() as u64,
    })
}

/// Record ids present only in `base` (removed) and only in `target` (added).
pub fn diff_normalized_record_ids(
    base_path: &Path,
    target_path: &Path,
) -> Result<(Vec<String>, Vec<String>), IngestError> {
    let ids = |path: &Path| -> Result<BTreeSet<String>, IngestError> {
        Ok(read_normalized(path)?
            .into_iter()
            .map(|r| r.record_id)
            .collect())
    };
    let base = ids(base_path)?;
    let target = ids(target_path)?;
    let removed = base.difference(&target).cloned().collect();
    let added = target.difference(&base).cloned().collect();
    Ok((removed, added))
}
