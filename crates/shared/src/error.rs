use thiserror::Error;

use crate::domain::ListingId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown listing filter '{value}', expected one of: all, rent, buy")]
pub struct ParseFilterError {
    value: String,
}

impl ParseFilterError {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Error)]
pub enum ListingDecodeError {
    #[error("listing payload is not a JSON array of listings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("listing {id} has invalid price {price}")]
    InvalidPrice { id: ListingId, price: String },
}
