// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use yubin_core::{sha256_hex, ResultExt};

use crate::IngestError;

/// Checksum of the source file bytes as they were read, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDigest {
    pub sha256: String,
    pub byte_len: u64,
}

impl SourceDigest {
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self {
            sha256: sha256_hex(bytes),
            byte_len: bytes.len() as u64,
        }
    }
}

/// Reads the whole source table; the error names the path and the step.
pub(crate) fn read_source(path: &Path) -> Result<Vec<u8>, IngestError> {
    fs::read(path)
        .with_context("read source table")
        .map_err(|e| IngestError::io(format!("{}: {e}", path.display())))
}

pub fn hash_file(path: &Path) -> Result<SourceDigest, IngestError> {
    let bytes = read_source(path)?;
    Ok(SourceDigest::of_bytes(&bytes))
}
