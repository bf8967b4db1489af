// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod canonical;
mod errors;

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub use errors::{ErrorContext, ResultExt};

pub const CRATE_NAME: &str = "yubin-core";

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Usage = 2,
    Validation = 3,
    DependencyFailure = 4,
    Internal = 10,
}

impl ExitCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Usage => "usage",
            Self::Validation => "validation",
            Self::DependencyFailure => "dependency_failure",
            Self::Internal => "internal",
        }
    }
}

pub const ENV_YUBIN_LOG_LEVEL: &str = "YUBIN_LOG_LEVEL";
pub const ENV_YUBIN_LOG_JSON: &str = "YUBIN_LOG_JSON";
pub const ENV_YUBIN_CATALOG_DB: &str = "YUBIN_CATALOG_DB";
pub const ENV_YUBIN_DATA_DIR: &str = "YUBIN_DATA_DIR";
pub const ENV_YUBIN_CURSOR_SECRET: &str = "YUBIN_CURSOR_SECRET";

pub const CATALOG_DB_FILE_NAME: &str = "zipcode.db";

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Directory holding the catalog database and its manifests.
///
/// Resolution order: `YUBIN_DATA_DIR`, `$XDG_DATA_HOME/yubin`,
/// `$HOME/.local/share/yubin`, then `.yubin` relative to the working directory.
#[must_use]
pub fn resolve_data_dir() -> PathBuf {
    if let Some(explicit) = non_empty_env(ENV_YUBIN_DATA_DIR) {
        return PathBuf::from(explicit);
    }
    if let Some(xdg_data_home) = non_empty_env("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home).join("yubin");
    }
    if let Some(home) = non_empty_env("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("yubin");
    }
    PathBuf::from(".yubin")
}

#[must_use]
pub fn resolve_catalog_db_path() -> PathBuf {
    if let Some(explicit) = non_empty_env(ENV_YUBIN_CATALOG_DB) {
        return PathBuf::from(explicit);
    }
    resolve_data_dir().join(CATALOG_DB_FILE_NAME)
}

/// Interprets `1/true/yes/on` (any case) as true; anything else falls back.
#[must_use]
pub fn env_bool(name: &str, default: bool) -> bool {
    match non_empty_env(name) {
        Some(raw) => matches!(
            raw.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        None => default,
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl MachineError {
    #[must_use]
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for MachineError {}
