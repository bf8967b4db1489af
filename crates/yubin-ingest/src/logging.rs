// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    Prepare,
    Decode,
    Normalize,
    Persist,
    Finalize,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestEvent {
    pub stage: IngestStage,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

/// Ordered record of what a run did, returned to the caller alongside the
/// result. Every event is mirrored to `tracing` at info level.
#[derive(Debug, Default, Clone)]
pub struct IngestLog {
    events: Vec<IngestEvent>,
}

impl IngestLog {
    pub fn emit(
        &mut self,
        stage: IngestStage,
        name: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) {
        let name = name.into();
        tracing::info!(stage = ?stage, event = %name, fields = ?fields, "ingest event");
        self.events.push(IngestEvent {
            stage,
            name,
            fields,
        });
    }

    #[must_use]
    pub fn events(&self) -> &[IngestEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<IngestEvent> {
        self.events
    }
}

/// Builds an event field map from `(key, value)` pairs.
pub(crate) fn fields<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
