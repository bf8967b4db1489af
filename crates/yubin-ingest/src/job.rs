// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use yubin_model::RecordFamily;

use crate::{IngestError, IngestOptions};

#[derive(Debug, Clone)]
pub struct IngestInputs {
    pub source_path: PathBuf,
}

/// Where a run writes. The catalog path is shared across families; the
/// manifest and debug dump are per table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub db_path: PathBuf,
    pub manifest_path: PathBuf,
    pub normalized_debug_path: PathBuf,
}

impl OutputLayout {
    #[must_use]
    pub fn new(db_path: &Path, output_root: &Path, family: RecordFamily) -> Self {
        let table = family.table_name();
        Self {
            db_path: db_path.to_path_buf(),
            manifest_path: output_root.join(format!("{table}.manifest.json")),
            normalized_debug_path: output_root.join(format!("{table}.normalized.jsonl.zst")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestJob {
    pub inputs: IngestInputs,
    pub output_layout: OutputLayout,
    pub options: IngestOptions,
}

impl IngestJob {
    pub fn from_options(options: &IngestOptions) -> Result<Self, IngestError> {
        if options.input_path.as_os_str().is_empty() {
            return Err(IngestError::config("input path is required"));
        }
        if options.db_path.as_os_str().is_empty() {
            return Err(IngestError::config("catalog database path is required"));
        }
        if options.normalized_replay_mode && !options.emit_normalized_debug {
            return Err(IngestError::config(
                "normalized replay mode requires the normalized debug dump",
            ));
        }
        let output_root = if options.output_root.as_os_str().is_empty() {
            options
                .db_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        } else {
            options.output_root.clone()
        };
        Ok(Self {
            inputs: IngestInputs {
                source_path: options.input_path.clone(),
            },
            output_layout: OutputLayout::new(&options.db_path, &output_root, options.family),
            options: options.clone(),
        })
    }

    #[must_use]
    pub fn family(&self) -> RecordFamily {
        self.options.family
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_root_defaults_to_catalog_directory() {
        let opts = IngestOptions {
            input_path: PathBuf::from("KEN_ALL.CSV"),
            db_path: PathBuf::from("/data/zipcode.db"),
            ..IngestOptions::default()
        };
        let job = IngestJob::from_options(&opts).expect("job");
        assert_eq!(
            job.output_layout.manifest_path,
            PathBuf::from("/data/ken_all.manifest.json")
        );
    }

    #[test]
    fn replay_without_debug_dump_is_rejected() {
        let opts = IngestOptions {
            input_path: PathBuf::from("KEN_ALL.CSV"),
            db_path: PathBuf::from("zipcode.db"),
            normalized_replay_mode: true,
            ..IngestOptions::default()
        };
        let err = IngestJob::from_options(&opts).expect_err("config error");
        assert_eq!(err.code, crate::IngestErrorCode::Config);
    }
}
