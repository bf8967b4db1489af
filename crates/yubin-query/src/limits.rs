// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryLimits {
    /// Page size when the request names none.
    pub default_limit: usize,
    pub max_limit: usize,
    /// Longest accepted filter text, in characters after decoding.
    pub max_text_len: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
            max_text_len: 128,
        }
    }
}

impl QueryLimits {
    /// Resolves the requested page size, rejecting zero and values above
    /// `max_limit`.
    pub fn effective_limit(&self, requested: Option<usize>) -> Result<usize, String> {
        match requested {
            None => Ok(self.default_limit),
            Some(0) => Err("limit must be at least 1".to_string()),
            Some(n) if n > self.max_limit => Err(format!(
                "limit {n} exceeds max_limit {}",
                self.max_limit
            )),
            Some(n) => Ok(n),
        }
    }
}
