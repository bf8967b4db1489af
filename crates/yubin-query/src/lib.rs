// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Read side of the catalog: exact zipcode and contains-match address or
//! company lookups, ordered by id and paged with signed keyset cursors.

mod cursor;
mod filters;
mod limits;
mod normalize;
mod query_error;
mod row_decode;

use std::path::Path;

use rusqlite::{params_from_iter, types::Value, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use yubin_model::RecordFamily;

pub const CRATE_NAME: &str = "yubin-query";

pub use cursor::{
    decode_cursor, encode_cursor, CursorError, CursorErrorCode, CursorPayload,
};
pub use filters::{
    like_contains_pattern, normalize_filter, normalize_text_input, percent_decode, AddressFilter,
    NormalizedFilter,
};
pub use limits::QueryLimits;
pub use normalize::normalized_query_hash;
pub use query_error::{QueryError, QueryErrorCode};
pub use row_decode::AddressRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressQueryRequest {
    pub family: RecordFamily,
    pub filter: AddressFilter,
    /// Falls back to `QueryLimits::default_limit`.
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl AddressQueryRequest {
    #[must_use]
    pub fn new(family: RecordFamily, filter: AddressFilter) -> Self {
        Self {
            family,
            filter,
            limit: None,
            cursor: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AddressPage {
    pub family: RecordFamily,
    pub rows: Vec<AddressRecord>,
    pub next_cursor: Option<String>,
}

pub fn open_catalog_readonly(path: &Path) -> Result<Connection, QueryError> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(QueryError::sql)
}

/// Runs one page of a lookup. All present filters must match. An empty page
/// is reported as `NotFound`.
pub fn query_addresses(
    conn: &Connection,
    req: &AddressQueryRequest,
    limits: &QueryLimits,
    cursor_secret: &[u8],
) -> Result<AddressPage, QueryError> {
    let limit = limits
        .effective_limit(req.limit)
        .map_err(QueryError::validation)?;
    let filter = normalize_filter(req.family, &req.filter, limits)?;
    let query_hash = normalized_query_hash(req.family, &filter)?;
    let cursor = req
        .cursor
        .as_deref()
        .map(|token| decode_cursor(token, cursor_secret, req.family, &query_hash))
        .transpose()?;

    let mut where_parts: Vec<&str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    if let Some(zipcode) = &filter.zipcode {
        where_parts.push("zipcode = ?");
        params.push(Value::Text(zipcode.as_str().to_string()));
    }
    if let Some(address) = &filter.address {
        where_parts.push("address LIKE ? ESCAPE '!'");
        params.push(Value::Text(like_contains_pattern(address)));
    }
    if let Some(company) = &filter.company {
        where_parts.push("company LIKE ? ESCAPE '!'");
        params.push(Value::Text(like_contains_pattern(company)));
    }
    if let Some(c) = &cursor {
        let last_id = i64::try_from(c.last_id).map_err(|_| {
            QueryError::new(QueryErrorCode::Cursor, "cursor position out of range")
        })?;
        where_parts.push("id > ?");
        params.push(Value::Integer(last_id));
    }
    let where_sql = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let sql = format!(
        "SELECT {} FROM {}{where_sql} ORDER BY id LIMIT ?",
        row_decode::select_columns(req.family),
        req.family.table_name()
    );
    params.push(Value::Integer(limit as i64 + 1));

    let mut stmt = conn.prepare(&sql).map_err(QueryError::sql)?;
    let mut rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            row_decode::decode_row(req.family, row)
        })
        .map_err(QueryError::sql)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(QueryError::sql)?;

    let has_more = rows.len() > limit;
    rows.truncate(limit);
    let Some(last) = rows.last() else {
        return Err(QueryError::new(
            QueryErrorCode::NotFound,
            format!("no {} rows match the filter", req.family),
        ));
    };
    let next_cursor = if has_more {
        let depth = cursor.as_ref().map_or(0, |c| c.depth) + 1;
        let payload = CursorPayload::new(req.family, query_hash, last.id(), depth);
        Some(encode_cursor(&payload, cursor_secret)?)
    } else {
        None
    };
    tracing::debug!(
        family = %req.family,
        rows = rows.len(),
        has_more,
        "address query page"
    );
    Ok(AddressPage {
        family: req.family,
        rows,
        next_cursor,
    })
}

/// Shorthand for an exact zipcode lookup returning the first page.
pub fn lookup_zipcode(
    conn: &Connection,
    family: RecordFamily,
    zipcode: &str,
    limits: &QueryLimits,
    cursor_secret: &[u8],
) -> Result<AddressPage, QueryError> {
    let req = AddressQueryRequest::new(
        family,
        AddressFilter {
            zipcode: Some(zipcode.to_string()),
            ..AddressFilter::default()
        },
    );
    query_addresses(conn, &req, limits, cursor_secret)
}
