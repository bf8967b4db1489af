#![forbid(unsafe_code)]
//! Record shapes shared by the ingest pipeline and the query library.
//!
//! Each source family has a projected raw shape (`KenAllRecord`,
//! `JigyosyoRecord`) fixed at ingestion and a final catalog shape
//! (`KenAllAddress`, `JigyosyoAddress`). Nothing downstream of the reader
//! looks fields up by column name.

mod family;
mod manifest;
mod record;
mod zipcode;

pub use family::{RecordFamily, ValidationError};
pub use manifest::{CatalogManifest, CatalogRowCounts, MANIFEST_VERSION};
pub use record::{
    AddressRow, FamilyRecord, JigyosyoAddress, JigyosyoRecord, KenAllAddress, KenAllRecord,
};
pub use zipcode::{ZipCode, ZIPCODE_LEN};

pub const CRATE_NAME: &str = "yubin-model";
