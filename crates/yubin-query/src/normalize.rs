// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use yubin_core::canonical;
use yubin_model::RecordFamily;

use crate::filters::NormalizedFilter;
use crate::query_error::QueryError;

#[derive(Serialize)]
struct QueryIdentity<'a> {
    family: RecordFamily,
    filter: &'a NormalizedFilter,
}

/// Hash of the normalized filters a cursor is bound to. Page size and the
/// cursor itself are excluded.
pub fn normalized_query_hash(
    family: RecordFamily,
    filter: &NormalizedFilter,
) -> Result<String, QueryError> {
    canonical::stable_json_hash_hex(&QueryIdentity { family, filter })
        .map_err(|e| QueryError::validation(e.to_string()))
}
