// SPDX-License-Identifier: Apache-2.0

use yubin_model::{AddressRow, FamilyRecord};

use crate::{IngestError, IngestErrorCode};

/// Numbers records 1..=N in order and concatenates the address.
#[must_use]
pub fn assemble<R: FamilyRecord>(records: Vec<R>) -> Vec<R::Address> {
    records
        .into_iter()
        .zip(1_u64..)
        .map(|(record, id)| record.into_address(id))
        .collect()
}

/// Checks dense ids and the address concatenation before anything is
/// persisted.
pub fn verify_addresses<A: AddressRow>(rows: &[A]) -> Result<(), IngestError> {
    for (row, expected) in rows.iter().zip(1_u64..) {
        if row.id() != expected {
            return Err(IngestError::new(
                IngestErrorCode::Invariant,
                format!("row id {} out of sequence, expected {expected}", row.id()),
            ));
        }
        if row.address() != row.concatenated_parts() {
            return Err(IngestError::new(
                IngestErrorCode::Invariant,
                format!("row {expected}: address does not match its parts"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yubin_model::KenAllRecord;

    #[test]
    fn ids_are_dense_and_one_based() {
        let rows = assemble(vec![
            KenAllRecord::new("0600000", "北海道", "札幌市中央区", ""),
            KenAllRecord::new("0640941", "北海道", "札幌市中央区", "旭ケ丘"),
        ]);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(rows[0].address, "北海道札幌市中央区");
        assert_eq!(rows[1].address, "北海道札幌市中央区旭ケ丘");
        verify_addresses(&rows).expect("valid");
    }

    #[test]
    fn gaps_fail_verification() {
        let mut rows = assemble(vec![KenAllRecord::new("1", "a", "b", "c")]);
        rows[0].id = 2;
        let err = verify_addresses(&rows).expect_err("gap");
        assert_eq!(err.code, crate::IngestErrorCode::Invariant);
    }
}
