// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use yubin_core::canonical;
use yubin_model::CatalogManifest;

use crate::{IngestError, IngestErrorCode};

/// Writes canonical pretty JSON through a temp file and rename.
pub fn write_manifest(path: &Path, manifest: &CatalogManifest) -> Result<(), IngestError> {
    manifest
        .validate_strict()
        .map_err(|e| IngestError::new(IngestErrorCode::Invariant, e.0))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(IngestError::io)?;
    }
    let bytes = canonical::stable_json_pretty_bytes(manifest).map_err(IngestError::serialization)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(IngestError::io)?;
    fs::rename(&tmp, path).map_err(IngestError::io)?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<CatalogManifest, IngestError> {
    let bytes = fs::read(path).map_err(IngestError::io)?;
    let manifest: CatalogManifest =
        serde_json::from_slice(&bytes).map_err(IngestError::serialization)?;
    manifest
        .validate_strict()
        .map_err(|e| IngestError::format(e.0))?;
    Ok(manifest)
}
