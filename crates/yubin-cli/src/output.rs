// SPDX-License-Identifier: Apache-2.0

use serde_json::Value;
use yubin_core::{ExitCode, MachineError};
use yubin_ingest::{IngestError, IngestErrorCode};
use yubin_query::{QueryError, QueryErrorCode};

#[derive(Clone, Copy)]
pub(crate) struct OutputMode {
    pub json: bool,
}

#[derive(Debug)]
pub(crate) struct CliError {
    pub exit_code: ExitCode,
    pub machine: MachineError,
}

impl CliError {
    pub(crate) fn usage(message: &str) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("usage_error", message),
        }
    }

    pub(crate) fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }

    pub(crate) fn dependency(message: String) -> Self {
        Self {
            exit_code: ExitCode::DependencyFailure,
            machine: MachineError::new("dependency_failure", &message),
        }
    }
}

impl From<IngestError> for CliError {
    fn from(err: IngestError) -> Self {
        let exit_code = match err.code {
            IngestErrorCode::Format | IngestErrorCode::Config => ExitCode::Validation,
            IngestErrorCode::Io | IngestErrorCode::Storage => ExitCode::DependencyFailure,
            _ => ExitCode::Internal,
        };
        Self {
            exit_code,
            machine: MachineError::new(&format!("{}_error", err.code.as_str()), &err.message)
                .with_detail("stage", "ingest"),
        }
    }
}

impl From<QueryError> for CliError {
    fn from(err: QueryError) -> Self {
        let (exit_code, code) = match err.code {
            QueryErrorCode::Validation => (ExitCode::Validation, "validation_error"),
            QueryErrorCode::Cursor => (ExitCode::Validation, "invalid_cursor"),
            QueryErrorCode::NotFound => (ExitCode::Validation, "not_found"),
            QueryErrorCode::Sql => (ExitCode::DependencyFailure, "dependency_failure"),
            _ => (ExitCode::Internal, "internal_error"),
        };
        Self {
            exit_code,
            machine: MachineError::new(code, &err.message).with_detail("stage", "query"),
        }
    }
}

pub(crate) fn emit_ok(output_mode: OutputMode, payload: &Value) -> Result<(), CliError> {
    let text = if output_mode.json {
        serde_json::to_string(payload)
    } else {
        serde_json::to_string_pretty(payload)
    }
    .map_err(|e| CliError::internal(e.to_string()))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
    }
}
