// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use yubin_model::FamilyRecord;

pub const TOWN_DELIMITER: char = '、';

/// One output record per non-empty `、`-separated town segment, all other
/// fields copied. A record whose town is empty, or only delimiters, stays
/// as a single city-level record with an empty town.
#[must_use]
pub fn explode_towns<R: FamilyRecord>(records: Vec<R>) -> Vec<R> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        if !record.town().contains(TOWN_DELIMITER) {
            out.push(record);
            continue;
        }
        let before = out.len();
        out.extend(
            record
                .town()
                .split(TOWN_DELIMITER)
                .filter(|segment| !segment.is_empty())
                .map(|segment| record.with_town(segment.to_string())),
        );
        if out.len() == before {
            out.push(record.with_town(String::new()));
        }
    }
    out
}

/// Drops records equal field-for-field to an earlier one, keeping the first
/// occurrence and the original order. Returns the survivors and the number
/// removed.
#[must_use]
pub fn dedup_exact<R: FamilyRecord>(records: Vec<R>) -> (Vec<R>, u64) {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<R> = records
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect();
    let removed = (total - kept.len()) as u64;
    (kept, removed)
}
