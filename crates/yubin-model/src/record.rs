use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

use crate::family::RecordFamily;

/// A projected source row of one family, carried through the pipeline.
///
/// Every stage works on owned values and returns new ones; the reader's
/// output is never mutated in place.
pub trait FamilyRecord: Clone + Debug + PartialEq + Eq + Hash {
    const FAMILY: RecordFamily;
    type Address: AddressRow;

    /// Builds the record from the full source column list. `None` when the
    /// row is shorter than the family schema.
    fn project(fields: &[&str]) -> Option<Self>;

    fn town(&self) -> &str;

    #[must_use]
    fn with_town(&self, town: String) -> Self;

    /// Rewrites every text field through `f`.
    #[must_use]
    fn map_fields<F: FnMut(&str) -> String>(self, f: F) -> Self;

    fn into_address(self, id: u64) -> Self::Address;
}

/// A finished catalog row.
pub trait AddressRow: Clone + Debug + Serialize {
    fn id(&self) -> u64;
    fn zipcode(&self) -> &str;
    fn address(&self) -> &str;
    /// The concatenation the address field must equal.
    fn concatenated_parts(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KenAllRecord {
    pub zipcode: String,
    pub prefecture: String,
    pub city: String,
    pub town: String,
}

impl KenAllRecord {
    const ZIPCODE: usize = 2;
    const PREFECTURE: usize = 6;
    const CITY: usize = 7;
    const TOWN: usize = 8;

    #[must_use]
    pub fn new(zipcode: &str, prefecture: &str, city: &str, town: &str) -> Self {
        Self {
            zipcode: zipcode.to_string(),
            prefecture: prefecture.to_string(),
            city: city.to_string(),
            town: town.to_string(),
        }
    }
}

impl FamilyRecord for KenAllRecord {
    const FAMILY: RecordFamily = RecordFamily::KenAll;
    type Address = KenAllAddress;

    fn project(fields: &[&str]) -> Option<Self> {
        if fields.len() < Self::FAMILY.source_column_count() {
            return None;
        }
        Some(Self::new(
            fields[Self::ZIPCODE],
            fields[Self::PREFECTURE],
            fields[Self::CITY],
            fields[Self::TOWN],
        ))
    }

    fn town(&self) -> &str {
        &self.town
    }

    fn with_town(&self, town: String) -> Self {
        Self {
            town,
            ..self.clone()
        }
    }

    fn map_fields<F: FnMut(&str) -> String>(self, mut f: F) -> Self {
        Self {
            zipcode: f(&self.zipcode),
            prefecture: f(&self.prefecture),
            city: f(&self.city),
            town: f(&self.town),
        }
    }

    fn into_address(self, id: u64) -> KenAllAddress {
        let address = format!("{}{}{}", self.prefecture, self.city, self.town);
        KenAllAddress {
            id,
            zipcode: self.zipcode,
            prefecture: self.prefecture,
            city: self.city,
            town: self.town,
            address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KenAllAddress {
    pub id: u64,
    pub zipcode: String,
    pub prefecture: String,
    pub city: String,
    pub town: String,
    pub address: String,
}

impl AddressRow for KenAllAddress {
    fn id(&self) -> u64 {
        self.id
    }

    fn zipcode(&self) -> &str {
        &self.zipcode
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn concatenated_parts(&self) -> String {
        format!("{}{}{}", self.prefecture, self.city, self.town)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JigyosyoRecord {
    pub company: String,
    pub zipcode: String,
    pub prefecture: String,
    pub city: String,
    pub town: String,
    /// Sub-block text: koaza, chome and banchi.
    pub chome: String,
}

impl JigyosyoRecord {
    const COMPANY: usize = 2;
    const PREFECTURE: usize = 3;
    const CITY: usize = 4;
    const TOWN: usize = 5;
    const CHOME: usize = 6;
    const ZIPCODE: usize = 7;

    #[must_use]
    pub fn new(
        company: &str,
        zipcode: &str,
        prefecture: &str,
        city: &str,
        town: &str,
        chome: &str,
    ) -> Self {
        Self {
            company: company.to_string(),
            zipcode: zipcode.to_string(),
            prefecture: prefecture.to_string(),
            city: city.to_string(),
            town: town.to_string(),
            chome: chome.to_string(),
        }
    }
}

impl FamilyRecord for JigyosyoRecord {
    const FAMILY: RecordFamily = RecordFamily::Jigyosyo;
    type Address = JigyosyoAddress;

    fn project(fields: &[&str]) -> Option<Self> {
        if fields.len() < Self::FAMILY.source_column_count() {
            return None;
        }
        Some(Self::new(
            fields[Self::COMPANY],
            fields[Self::ZIPCODE],
            fields[Self::PREFECTURE],
            fields[Self::CITY],
            fields[Self::TOWN],
            fields[Self::CHOME],
        ))
    }

    fn town(&self) -> &str {
        &self.town
    }

    fn with_town(&self, town: String) -> Self {
        Self {
            town,
            ..self.clone()
        }
    }

    fn map_fields<F: FnMut(&str) -> String>(self, mut f: F) -> Self {
        Self {
            company: f(&self.company),
            zipcode: f(&self.zipcode),
            prefecture: f(&self.prefecture),
            city: f(&self.city),
            town: f(&self.town),
            chome: f(&self.chome),
        }
    }

    fn into_address(self, id: u64) -> JigyosyoAddress {
        let address = format!(
            "{}{}{}{}",
            self.prefecture, self.city, self.town, self.chome
        );
        JigyosyoAddress {
            id,
            company: self.company,
            zipcode: self.zipcode,
            prefecture: self.prefecture,
            city: self.city,
            town: self.town,
            chome: self.chome,
            address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JigyosyoAddress {
    pub id: u64,
    pub company: String,
    pub zipcode: String,
    pub prefecture: String,
    pub city: String,
    pub town: String,
    pub chome: String,
    pub address: String,
}

impl AddressRow for JigyosyoAddress {
    fn id(&self) -> u64 {
        self.id
    }

    fn zipcode(&self) -> &str {
        &self.zipcode
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn concatenated_parts(&self) -> String {
        format!(
            "{}{}{}{}",
            self.prefecture, self.city, self.town, self.chome
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ken_all_projection_picks_catalog_columns() {
        let fields = [
            "01101", "060  ", "0600000", "ﾎｯｶｲﾄﾞｳ", "ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ", "ｲｶﾆｹｲｻｲｶﾞﾅｲﾊﾞｱｲ",
            "北海道", "札幌市中央区", "以下に掲載がない場合", "0", "0", "0", "0", "0", "0",
        ];
        let rec = KenAllRecord::project(&fields).expect("projection");
        assert_eq!(
            rec,
            KenAllRecord::new("0600000", "北海道", "札幌市中央区", "以下に掲載がない場合")
        );
        assert!(KenAllRecord::project(&fields[..14]).is_none());
    }

    #[test]
    fn jigyosyo_projection_and_address_include_chome() {
        let fields = [
            "01101", "ｻｯﾎﾟﾛｼ", "札幌市役所", "北海道", "札幌市中央区", "北一条西",
            "2丁目", "0608611", "060  ", "札幌中央", "0", "0", "0",
        ];
        let rec = JigyosyoRecord::project(&fields).expect("projection");
        let row = rec.into_address(7);
        assert_eq!(row.id, 7);
        assert_eq!(row.zipcode, "0608611");
        assert_eq!(row.company, "札幌市役所");
        assert_eq!(row.address, "北海道札幌市中央区北一条西2丁目");
        assert_eq!(row.address(), row.concatenated_parts());
    }

    #[test]
    fn with_town_keeps_other_fields() {
        let rec = KenAllRecord::new("0580343", "北海道", "様似郡様似町", "東洋");
        let next = rec.with_town("東洋油駒".to_string());
        assert_eq!(next.zipcode, rec.zipcode);
        assert_eq!(next.town, "東洋油駒");
        assert_eq!(rec.town, "東洋");
    }
}
