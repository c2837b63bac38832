//! Asking price attached to a marketplace listing.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Currency used when a seller does not name one.
pub const DEFAULT_CURRENCY: &str = "Empowers";

/// Amount used when a seller does not name one.
pub const DEFAULT_AMOUNT: u32 = 50;

const MAX_AMOUNT: u32 = 1_000_000;
const MAX_CURRENCY_LENGTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPrice {
    currency: String,
    amount: u32,
}

impl ListingPrice {
    pub fn new(currency: impl AsRef<str>, amount: u32) -> Result<Self, DomainError> {
        let currency = currency.as_ref().trim();
        if currency.is_empty() {
            return Err(DomainError::validation("price.currency", "cannot be empty"));
        }
        if currency.chars().count() > MAX_CURRENCY_LENGTH {
            return Err(DomainError::validation(
                "price.currency",
                format!("cannot exceed {} characters", MAX_CURRENCY_LENGTH),
            ));
        }
        if amount > MAX_AMOUNT {
            return Err(DomainError::validation(
                "price.amount",
                format!("cannot exceed {}", MAX_AMOUNT),
            ));
        }
        Ok(Self {
            currency: currency.to_string(),
            amount,
        })
    }

    /// Fills in defaults for whatever the seller left out.
    pub fn from_parts(currency: Option<&str>, amount: Option<u32>) -> Result<Self, DomainError> {
        Self::new(
            currency.unwrap_or(DEFAULT_CURRENCY),
            amount.unwrap_or(DEFAULT_AMOUNT),
        )
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }
}

impl Default for ListingPrice {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            amount: DEFAULT_AMOUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_per_field() {
        let price = ListingPrice::from_parts(None, Some(120)).unwrap();
        assert_eq!(price.currency(), "Empowers");
        assert_eq!(price.amount(), 120);
        assert_eq!(ListingPrice::from_parts(None, None).unwrap(), ListingPrice::default());
    }

    #[test]
    fn rejects_blank_currency_and_huge_amounts() {
        assert_eq!(
            ListingPrice::new(" ", 1).unwrap_err().field(),
            Some("price.currency")
        );
        assert_eq!(
            ListingPrice::new("Gold", 2_000_000).unwrap_err().field(),
            Some("price.amount")
        );
    }
}
