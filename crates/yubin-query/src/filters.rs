// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use yubin_model::{RecordFamily, ZipCode};

use crate::limits::QueryLimits;
use crate::query_error::QueryError;

/// Raw filter text as it arrives from a caller, possibly percent-encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AddressFilter {
    pub zipcode: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
}

/// Filters after decoding, width folding and validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NormalizedFilter {
    pub zipcode: Option<ZipCode>,
    pub address: Option<String>,
    pub company: Option<String>,
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decodes `%XX` escapes; malformed escapes pass through literally. The
/// decoded bytes must be UTF-8.
pub fn percent_decode(input: &str) -> Result<String, QueryError> {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(a), Some(b)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((a << 4) | b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out)
        .map_err(|_| QueryError::validation("filter is not valid UTF-8 after percent-decoding"))
}

/// Percent-decode, NFKC fold and trim. Returns `None` for blank input.
pub fn normalize_text_input(
    field: &str,
    raw: &str,
    limits: &QueryLimits,
) -> Result<Option<String>, QueryError> {
    let decoded = percent_decode(raw)?;
    let folded: String = decoded.nfkc().collect();
    let trimmed = folded.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > limits.max_text_len {
        return Err(QueryError::validation(format!(
            "{field} exceeds {} characters",
            limits.max_text_len
        )));
    }
    Ok(Some(trimmed.to_string()))
}

pub fn normalize_filter(
    family: RecordFamily,
    filter: &AddressFilter,
    limits: &QueryLimits,
) -> Result<NormalizedFilter, QueryError> {
    let text = |field: &str, raw: &Option<String>| match raw {
        Some(raw) => normalize_text_input(field, raw, limits),
        None => Ok(None),
    };
    let zipcode = text("zipcode", &filter.zipcode)?
        .map(|z| ZipCode::parse(&z.replace('−', "-")).map_err(|e| QueryError::validation(e.0)))
        .transpose()?;
    let company = text("company", &filter.company)?;
    if company.is_some() && family != RecordFamily::Jigyosyo {
        return Err(QueryError::validation(format!(
            "company filter applies to jigyosyo only, not {family}"
        )));
    }
    Ok(NormalizedFilter {
        zipcode,
        address: text("address", &filter.address)?,
        company,
    })
}

/// `%text%` with LIKE metacharacters escaped by `!`.
#[must_use]
pub fn like_contains_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for c in text.chars() {
        match c {
            '!' | '%' | '_' => {
                out.push('!');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('%');
    out
}
