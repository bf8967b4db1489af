// SPDX-License-Identifier: Apache-2.0

use yubin_model::FamilyRecord;

use crate::IngestError;

/// Opens minus closes over ASCII parentheses. Width folding has already run,
/// so full-width forms do not occur here.
#[must_use]
pub fn paren_balance(text: &str) -> i64 {
    text.chars().fold(0, |acc, c| match c {
        '(' => acc + 1,
        ')' => acc - 1,
        _ => acc,
    })
}

/// Merge progress carried from one source row to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeState<R> {
    Closed,
    Open {
        head: R,
        town: String,
        balance: i64,
        first_row: usize,
        rows: usize,
    },
}

impl<R> Default for MergeState<R> {
    fn default() -> Self {
        Self::Closed
    }
}

/// Feeds one row (1-based `row` number) into the merger. Returns the next
/// state and, when a logical record completes, that record. The completed
/// record keeps every non-town field of the first row of its group.
pub fn step<R: FamilyRecord>(
    state: MergeState<R>,
    record: R,
    row: usize,
) -> Result<(MergeState<R>, Option<R>), IngestError> {
    match state {
        MergeState::Closed => {
            let balance = paren_balance(record.town());
            if balance == 0 {
                return Ok((MergeState::Closed, Some(record)));
            }
            if balance < 0 {
                return Err(unmatched_close(row, record.town()));
            }
            Ok((
                MergeState::Open {
                    town: record.town().to_string(),
                    head: record,
                    balance,
                    first_row: row,
                    rows: 1,
                },
                None,
            ))
        }
        MergeState::Open {
            head,
            mut town,
            balance,
            first_row,
            rows,
        } => {
            town.push_str(record.town());
            let balance = balance + paren_balance(record.town());
            match balance {
                b if b > 0 => Ok((
                    MergeState::Open {
                        head,
                        town,
                        balance: b,
                        first_row,
                        rows: rows + 1,
                    },
                    None,
                )),
                0 => {
                    tracing::debug!(first_row, rows = rows + 1, town = %town, "merged continuation rows");
                    Ok((MergeState::Closed, Some(head.with_town(town))))
                }
                _ => Err(unmatched_close(row, &town)),
            }
        }
    }
}

fn unmatched_close(row: usize, town: &str) -> IngestError {
    tracing::warn!(row, town, "closing parenthesis without an opener");
    IngestError::format(format!(
        "row {row}: closing parenthesis without an opener in `{town}`"
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome<R> {
    pub records: Vec<R>,
    /// Logical records assembled from more than one source row.
    pub merged_groups: u64,
    pub longest_group: usize,
}

/// Reassembles town names that the publisher split across rows.
pub fn merge_continuations<R: FamilyRecord>(
    records: Vec<R>,
) -> Result<MergeOutcome<R>, IngestError> {
    let mut state = MergeState::default();
    let mut out = Vec::with_capacity(records.len());
    let mut merged_groups = 0_u64;
    let mut longest_group = 1_usize;
    for (idx, record) in records.into_iter().enumerate() {
        let group_rows = match &state {
            MergeState::Open { rows, .. } => rows + 1,
            MergeState::Closed => 1,
        };
        let (next, done) = step(state, record, idx + 1)?;
        if let Some(done) = done {
            if group_rows > 1 {
                merged_groups += 1;
                longest_group = longest_group.max(group_rows);
            }
            out.push(done);
        }
        state = next;
    }
    if let MergeState::Open {
        first_row, rows, ..
    } = state
    {
        tracing::warn!(first_row, rows, "parenthesis never closed before end of input");
        return Err(IngestError::format(format!(
            "row {first_row}: parenthesis opened here is never closed ({rows} rows to end of input)"
        )));
    }
    Ok(MergeOutcome {
        records: out,
        merged_groups,
        longest_group,
    })
}
