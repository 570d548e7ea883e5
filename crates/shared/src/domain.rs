use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ParseFilterError;

/// Identifier assigned to a listing by the remote service.
///
/// The service has shipped both string and integer ids, so decoding accepts
/// either and normalizes to the textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ListingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for ListingId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// Narrows which listings the service returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingFilter {
    #[default]
    All,
    ForRent,
    ForSale,
}

impl ListingFilter {
    pub const ALL: [ListingFilter; 3] = [Self::All, Self::ForRent, Self::ForSale];

    /// Value of the `filter` query parameter understood by the service.
    pub fn query_value(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ForRent => "rent",
            Self::ForSale => "buy",
        }
    }
}

impl fmt::Display for ListingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.query_value())
    }
}

impl FromStr for ListingFilter {
    type Err = ParseFilterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "rent" | "for-rent" | "for_rent" => Ok(Self::ForRent),
            "buy" | "for-sale" | "for_sale" => Ok(Self::ForSale),
            _ => Err(ParseFilterError::new(raw)),
        }
    }
}

/// Load state of the most recent fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    Loading,
    Error,
    Done,
}

impl ApiStatus {
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Loading)
    }
}
