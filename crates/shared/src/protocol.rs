use serde::{Deserialize, Serialize};

use crate::{domain::ListingId, error::ListingDecodeError};

/// One element of the JSON array returned by the listings endpoint.
///
/// Field names follow the service (`img_src`, `type`); the normalized
/// spellings are accepted as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "img_src", alias = "imgSrcUrl")]
    pub image_url: String,
    pub price: serde_json::Number,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, alias = "isRental", skip_serializing_if = "Option::is_none")]
    pub is_rental: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    id: ListingId,
    name: String,
    price: u64,
    image_url: String,
    is_rental: bool,
}

impl Listing {
    pub fn new(
        id: impl Into<ListingId>,
        name: impl Into<String>,
        price: u64,
        image_url: impl Into<String>,
        is_rental: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image_url: image_url.into(),
            is_rental,
        }
    }

    pub fn id(&self) -> &ListingId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn is_rental(&self) -> bool {
        self.is_rental
    }

    /// True when both values describe the same underlying record, even if
    /// their contents differ. Use `==` to detect changed contents.
    pub fn is_same_listing(&self, other: &Listing) -> bool {
        self.id == other.id
    }
}

impl TryFrom<ListingRecord> for Listing {
    type Error = ListingDecodeError;

    fn try_from(record: ListingRecord) -> Result<Self, Self::Error> {
        let price = price_units(&record.price).ok_or_else(|| ListingDecodeError::InvalidPrice {
            id: record.id.clone(),
            price: record.price.to_string(),
        })?;
        let is_rental = record
            .is_rental
            .unwrap_or_else(|| record.kind.as_deref() == Some("rent"));

        Ok(Self {
            id: record.id,
            name: record.name,
            price,
            image_url: record.image_url,
            is_rental,
        })
    }
}

fn price_units(price: &serde_json::Number) -> Option<u64> {
    if let Some(units) = price.as_u64() {
        return Some(units);
    }
    let value = price.as_f64()?;
    if !value.is_finite() || value < 0.0 || value > u64::MAX as f64 {
        return None;
    }
    Some(value.round() as u64)
}

/// Decodes a full response body. Any malformed element fails the whole
/// payload; there is no partial result.
pub fn decode_listings(body: &[u8]) -> Result<Vec<Listing>, ListingDecodeError> {
    let records: Vec<ListingRecord> = serde_json::from_slice(body)?;
    records.into_iter().map(Listing::try_from).collect()
}
