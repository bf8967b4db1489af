// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use encoding_rs::Encoding;
use yubin_model::{CatalogRowCounts, FamilyRecord};

use crate::assemble::{assemble, verify_addresses};
use crate::decode::{decode_source, read_records};
use crate::expand::expand_brackets;
use crate::explode::{dedup_exact, explode_towns};
use crate::logging::{fields, IngestLog, IngestStage};
use crate::merge::merge_continuations;
use crate::rules::RuleCascade;
use crate::width::normalize_record;
use crate::IngestError;

/// Times each rule changed a town name over a run, keyed by rule name.
pub type RuleHits = BTreeMap<&'static str, u64>;

const BRACKET_EXPANSION: &str = "bracket_expansion";

/// The town-name half of the pipeline: pre-expansion cascade, bracket
/// expansion, then corrections and hyphen folding. Compiled once per run.
#[derive(Debug, Clone)]
pub struct TownNormalizer {
    pre: RuleCascade,
    finishing: RuleCascade,
}

impl TownNormalizer {
    pub fn compile() -> Result<Self, IngestError> {
        Ok(Self {
            pre: RuleCascade::pre_expansion()?,
            finishing: RuleCascade::finishing()?,
        })
    }

    #[must_use]
    pub fn normalize(&self, town: &str) -> String {
        self.normalize_traced(town, &mut RuleHits::new())
    }

    pub fn normalize_traced(&self, town: &str, hits: &mut RuleHits) -> String {
        let (cleaned, fired) = self.pre.apply_traced(town);
        for name in fired {
            *hits.entry(name).or_default() += 1;
        }
        let expanded = expand_brackets(&cleaned);
        if expanded != cleaned {
            *hits.entry(BRACKET_EXPANSION).or_default() += 1;
        }
        let (finished, fired) = self.finishing.apply_traced(&expanded);
        for name in fired {
            *hits.entry(name).or_default() += 1;
        }
        finished
    }

    /// Every rule name that can appear in a hit histogram.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pre
            .rule_names()
            .chain(std::iter::once(BRACKET_EXPANSION))
            .chain(self.finishing.rule_names())
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput<A> {
    pub rows: Vec<A>,
    pub counts: CatalogRowCounts,
    pub rule_hits: RuleHits,
}

/// Decode through assembly for one family. Nothing is persisted here.
pub fn run_pipeline<R: FamilyRecord>(
    bytes: &[u8],
    encoding: &'static Encoding,
    normalizer: &TownNormalizer,
    log: &mut IngestLog,
) -> Result<PipelineOutput<R::Address>, IngestError> {
    let text = decode_source(bytes, encoding)?;
    let raw: Vec<R> = read_records(&text)?;
    let source_rows = raw.len() as u64;
    log.emit(
        IngestStage::Decode,
        "ingest.decode.complete",
        fields([("source_rows", source_rows.to_string())]),
    );
    let widened: Vec<R> = raw.into_iter().map(normalize_record).collect();

    let mut rule_hits = RuleHits::new();
    let (records, merged_rows, exploded_rows) = if R::FAMILY.normalizes_town_names() {
        let merged = merge_continuations(widened)?;
        log.emit(
            IngestStage::Normalize,
            "ingest.merge.complete",
            fields([
                ("merged_rows", merged.records.len().to_string()),
                ("merged_groups", merged.merged_groups.to_string()),
                ("longest_group", merged.longest_group.to_string()),
            ]),
        );
        let merged_rows = merged.records.len() as u64;
        let normalized: Vec<R> = merged
            .records
            .into_iter()
            .map(|r| {
                let town = normalizer.normalize_traced(r.town(), &mut rule_hits);
                r.with_town(town)
            })
            .collect();
        let exploded = explode_towns(normalized);
        let exploded_rows = exploded.len() as u64;
        (exploded, merged_rows, exploded_rows)
    } else {
        (widened, source_rows, source_rows)
    };
    for name in normalizer.rule_names() {
        let count = rule_hits.get(name).copied().unwrap_or(0);
        tracing::debug!(rule = name, hits = count, "town rule hits");
    }

    let (unique, duplicates_removed) = dedup_exact(records);
    let rows = assemble(unique);
    verify_addresses(&rows)?;
    let counts = CatalogRowCounts {
        source_rows,
        merged_rows,
        exploded_rows,
        duplicates_removed,
        catalog_rows: rows.len() as u64,
    };
    tracing::info!(
        family = %R::FAMILY,
        source_rows,
        merged_rows,
        exploded_rows,
        duplicates_removed,
        catalog_rows = counts.catalog_rows,
        "normalized records"
    );
    Ok(PipelineOutput {
        rows,
        counts,
        rule_hits,
    })
}
