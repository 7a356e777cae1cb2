//! Type-safe price representation using decimal arithmetic.
//!
//! Prices cross three boundaries: the catalog document, the persisted cart and
//! the arithmetic behind cart totals. Older persisted carts carry prices as
//! strings (`"10.90"`), so deserialization accepts either a JSON number or a
//! numeric string and always normalizes to a [`Decimal`]. Serialization always
//! writes a JSON number.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price is not a number: {0:?}")]
    NotANumber(String),
    /// The input is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The input is above [`Price::MAX_UNITS`].
    #[error("price is too large: {0}")]
    TooLarge(Decimal),
}

/// A non-negative product price in the store currency's standard unit.
///
/// ```
/// use vitrine_core::Price;
///
/// let price: Price = "10.9".parse().unwrap();
/// assert_eq!(price.to_string(), "10.90");
/// assert_eq!(price.times(2).to_string(), "21.80");
/// assert!("-1".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest accepted unit price. A full cart of such lines still fits in a
    /// `Decimal` and in an `f64` on the wire.
    pub const MAX_UNITS: u64 = 1_000_000_000;

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX_UNITS`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount > Decimal::from(Self::MAX_UNITS) {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount.normalize()))
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2).normalize())
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units. Saturates instead of overflowing.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Format with a currency symbol, e.g. `R$ 10.90`.
    #[must_use]
    pub fn display_with(&self, symbol: &str) -> String {
        format!("{symbol} {self}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| PriceError::NotANumber(s.to_owned()))?;
        Self::new(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole amounts stay integers so `10` round-trips as `10`, not `10.0`.
        if self.0.fract().is_zero() {
            if let Some(whole) = self.0.to_u64() {
                return serializer.serialize_u64(whole);
            }
        }
        let value = self
            .0
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("price out of range"))?;
        serializer.serialize_f64(value)
    }
}

/// Wire forms a price may arrive in.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(serde_json::Number),
    Text(String),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RawPrice::deserialize(deserializer)? {
            RawPrice::Number(number) => number.to_string(),
            RawPrice::Text(text) => text,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_always_has_two_decimals() {
        assert_eq!(Price::from_cents(1090).to_string(), "10.90");
        assert_eq!(Price::from_cents(2000).to_string(), "20.00");
        assert_eq!("0.005".parse::<Price>().unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_deserialize_from_number() {
        let price: Price = serde_json::from_str("10.9").unwrap();
        assert_eq!(price, Price::from_cents(1090));
    }

    #[test]
    fn test_deserialize_coerces_numeric_string() {
        let price: Price = serde_json::from_str("\"15.90\"").unwrap();
        assert_eq!(price, Price::from_cents(1590));

        let padded: Price = serde_json::from_str("\" 29.9 \"").unwrap();
        assert_eq!(padded, Price::from_cents(2990));
    }

    #[test]
    fn test_deserialize_rejects_garbage_and_negatives() {
        assert!(serde_json::from_str::<Price>("\"R$ 10\"").is_err());
        assert!(serde_json::from_str::<Price>("-3").is_err());
        assert!(serde_json::from_str::<Price>("null").is_err());
        assert!(serde_json::from_str::<Price>("true").is_err());
    }

    #[test]
    fn test_serialize_writes_json_number() {
        assert_eq!(serde_json::to_string(&Price::from_cents(1090)).unwrap(), "10.9");
        assert_eq!(serde_json::to_string(&Price::from_cents(1000)).unwrap(), "10");
    }

    #[test]
    fn test_times_and_sum() {
        let line = Price::from_cents(1090).times(2);
        assert_eq!(line.to_string(), "21.80");

        let total: Price = [Price::from_cents(1090), Price::from_cents(1590)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(2680));
    }

    #[test]
    fn test_rejects_amounts_above_bound() {
        assert!("1000000000".parse::<Price>().is_ok());
        assert!(matches!(
            "1000000000.01".parse::<Price>(),
            Err(PriceError::TooLarge(_))
        ));
        assert!(matches!(
            "50000000000000000000000000000".parse::<Price>(),
            Err(PriceError::TooLarge(_))
        ));
        assert!(serde_json::from_str::<Price>("\"1e30\"").is_err());
    }

    #[test]
    fn test_arithmetic_saturates() {
        // `new` rejects it; build the extreme directly.
        let huge = Price(Decimal::MAX);
        assert_eq!(huge.times(3), huge);
        assert_eq!(huge + huge, huge);

        let top = Price::new(Decimal::from(Price::MAX_UNITS)).unwrap();
        assert_eq!(
            top.times(u32::MAX).amount(),
            Decimal::from(Price::MAX_UNITS) * Decimal::from(u32::MAX)
        );
    }

    #[test]
    fn test_negative_zero_is_accepted() {
        assert_eq!("-0".parse::<Price>().unwrap(), Price::ZERO);
    }

    #[test]
    fn test_display_with_symbol() {
        assert_eq!(Price::from_cents(990).display_with("R$"), "R$ 9.90");
    }
}
