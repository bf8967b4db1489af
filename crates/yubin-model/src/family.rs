use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

/// The two Japan Post master files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFamily {
    /// General address records (KEN_ALL.CSV).
    KenAll,
    /// Large-establishment records (JIGYOSYO.CSV).
    Jigyosyo,
}

impl RecordFamily {
    pub const ALL: [RecordFamily; 2] = [RecordFamily::KenAll, RecordFamily::Jigyosyo];

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ken_all" => Ok(Self::KenAll),
            "jigyosyo" => Ok(Self::Jigyosyo),
            other => Err(ValidationError(format!(
                "unknown record family `{other}` (expected ken_all or jigyosyo)"
            ))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KenAll => "ken_all",
            Self::Jigyosyo => "jigyosyo",
        }
    }

    /// Destination table in the catalog database.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        self.as_str()
    }

    /// Column count of the source file, including columns the catalog drops.
    #[must_use]
    pub const fn source_column_count(self) -> usize {
        match self {
            Self::KenAll => 15,
            Self::Jigyosyo => 13,
        }
    }

    /// WHATWG encoding label the agency publishes the file in.
    #[must_use]
    pub const fn default_encoding_label(self) -> &'static str {
        match self {
            Self::KenAll => "shift_jis",
            Self::Jigyosyo => "cp932",
        }
    }

    #[must_use]
    pub const fn output_columns(self) -> &'static [&'static str] {
        match self {
            Self::KenAll => &["id", "zipcode", "prefecture", "city", "town", "address"],
            Self::Jigyosyo => &[
                "id",
                "company",
                "zipcode",
                "prefecture",
                "city",
                "town",
                "chome",
                "address",
            ],
        }
    }

    /// Whether town names go through line merging, the rule cascade and
    /// bracket expansion. Establishment rows carry no postal idioms.
    #[must_use]
    pub const fn normalizes_town_names(self) -> bool {
        matches!(self, Self::KenAll)
    }
}

impl Display for RecordFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
