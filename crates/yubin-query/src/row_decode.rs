// SPDX-License-Identifier: Apache-2.0

use rusqlite::Row;
use serde::Serialize;
use yubin_model::{AddressRow, JigyosyoAddress, KenAllAddress, RecordFamily};

/// A catalog row of either family, serialized as the plain row object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AddressRecord {
    KenAll(KenAllAddress),
    Jigyosyo(JigyosyoAddress),
}

impl AddressRecord {
    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            Self::KenAll(r) => r.id(),
            Self::Jigyosyo(r) => r.id(),
        }
    }

    #[must_use]
    pub fn zipcode(&self) -> &str {
        match self {
            Self::KenAll(r) => r.zipcode(),
            Self::Jigyosyo(r) => r.zipcode(),
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::KenAll(r) => r.address(),
            Self::Jigyosyo(r) => r.address(),
        }
    }
}

pub(crate) fn select_columns(family: RecordFamily) -> &'static str {
    match family {
        RecordFamily::KenAll => "id, zipcode, prefecture, city, town, address",
        RecordFamily::Jigyosyo => "id, company, zipcode, prefecture, city, town, chome, address",
    }
}

pub(crate) fn decode_row(family: RecordFamily, row: &Row<'_>) -> rusqlite::Result<AddressRecord> {
    Ok(match family {
        RecordFamily::KenAll => AddressRecord::KenAll(KenAllAddress {
            id: row.get(0)?,
            zipcode: row.get(1)?,
            prefecture: row.get(2)?,
            city: row.get(3)?,
            town: row.get(4)?,
            address: row.get(5)?,
        }),
        RecordFamily::Jigyosyo => AddressRecord::Jigyosyo(JigyosyoAddress {
            id: row.get(0)?,
            company: row.get(1)?,
            zipcode: row.get(2)?,
            prefecture: row.get(3)?,
            city: row.get(4)?,
            town: row.get(5)?,
            chome: row.get(6)?,
            address: row.get(7)?,
        }),
    })
}
