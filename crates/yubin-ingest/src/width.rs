// SPDX-License-Identifier: Apache-2.0

use unicode_normalization::UnicodeNormalization;
use yubin_model::FamilyRecord;

/// NFKC compatibility folding: full-width ASCII becomes narrow, half-width
/// katakana becomes full-width, ideographs are untouched. Idempotent.
#[must_use]
pub fn to_narrow(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    text.nfkc().collect()
}

#[must_use]
pub fn normalize_record<R: FamilyRecord>(record: R) -> R {
    record.map_fields(to_narrow)
}
