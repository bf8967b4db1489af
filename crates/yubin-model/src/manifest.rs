use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::family::{RecordFamily, ValidationError};

pub const MANIFEST_VERSION: &str = "1";

/// Row counts at each pipeline boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CatalogRowCounts {
    pub source_rows: u64,
    pub merged_rows: u64,
    pub exploded_rows: u64,
    pub duplicates_removed: u64,
    pub catalog_rows: u64,
}

/// Written next to the catalog after every successful table replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct CatalogManifest {
    pub manifest_version: String,
    pub db_schema_version: String,
    pub pipeline_version: String,
    pub family: RecordFamily,
    pub table: String,
    pub encoding: String,
    pub source_sha256: String,
    pub counts: CatalogRowCounts,
    #[serde(default)]
    pub rule_hits: BTreeMap<String, u64>,
}

impl CatalogManifest {
    #[must_use]
    pub fn new(
        db_schema_version: String,
        pipeline_version: String,
        family: RecordFamily,
        encoding: String,
        source_sha256: String,
        counts: CatalogRowCounts,
    ) -> Self {
        Self {
            manifest_version: MANIFEST_VERSION.to_string(),
            db_schema_version,
            pipeline_version,
            family,
            table: family.table_name().to_string(),
            encoding,
            source_sha256,
            counts,
            rule_hits: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_rule_hits(mut self, rule_hits: BTreeMap<String, u64>) -> Self {
        self.rule_hits = rule_hits;
        self
    }

    pub fn validate_strict(&self) -> Result<(), ValidationError> {
        if self.manifest_version != MANIFEST_VERSION {
            return Err(ValidationError(format!(
                "unsupported manifest_version {} (expected {MANIFEST_VERSION})",
                self.manifest_version
            )));
        }
        if self.db_schema_version.trim().is_empty() {
            return Err(ValidationError(
                "db_schema_version must not be empty".to_string(),
            ));
        }
        if self.table != self.family.table_name() {
            return Err(ValidationError(format!(
                "table {} does not match family {}",
                self.table, self.family
            )));
        }
        if self.source_sha256.len() != 64 {
            return Err(ValidationError(
                "source_sha256 must be a hex sha256 digest".to_string(),
            ));
        }
        let c = &self.counts;
        if c.catalog_rows + c.duplicates_removed != c.exploded_rows {
            return Err(ValidationError(format!(
                "row counts disagree: catalog {} + duplicates {} != exploded {}",
                c.catalog_rows, c.duplicates_removed, c.exploded_rows
            )));
        }
        if c.merged_rows > c.source_rows {
            return Err(ValidationError(
                "merged_rows cannot exceed source_rows".to_string(),
            ));
        }
        Ok(())
    }
}
