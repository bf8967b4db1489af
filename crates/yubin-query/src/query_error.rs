// SPDX-License-Identifier: Apache-2.0

use crate::cursor::CursorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryErrorCode {
    Validation,
    Cursor,
    Sql,
    /// No rows matched.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub code: QueryErrorCode,
    pub message: String,
}

impl QueryError {
    #[must_use]
    pub fn new(code: QueryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::Validation, message)
    }

    pub(crate) fn sql(err: rusqlite::Error) -> Self {
        Self::new(QueryErrorCode::Sql, err.to_string())
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for QueryError {}

impl From<CursorError> for QueryError {
    fn from(value: CursorError) -> Self {
        Self::new(QueryErrorCode::Cursor, value.to_string())
    }
}
