//! Fixed-point prices with two decimal places, stored as minor units.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest representable price: 9999.99.
const MAX_MINOR_UNITS: i64 = 999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price {
    minor_units: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,
    #[error("price `{0}` is not a decimal amount")]
    Malformed(String),
    #[error("price `{0}` has more than two decimal places")]
    TooPrecise(String),
    #[error("price must be between 0.00 and 9999.99")]
    OutOfRange,
}

impl Price {
    pub fn from_minor_units(minor_units: i64) -> Result<Self, PriceError> {
        if !(0..=MAX_MINOR_UNITS).contains(&minor_units) {
            return Err(PriceError::OutOfRange);
        }
        Ok(Self { minor_units })
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        let all_digits = |part: &str| part.chars().all(|ch| ch.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(PriceError::Malformed(trimmed.to_string()));
        }
        if fraction.len() > 2 {
            return Err(PriceError::TooPrecise(trimmed.to_string()));
        }

        let whole: i64 = whole.parse().map_err(|_| PriceError::OutOfRange)?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction
                .parse::<i64>()
                .map_err(|_| PriceError::Malformed(trimmed.to_string()))?
                * 10,
            _ => fraction
                .parse()
                .map_err(|_| PriceError::Malformed(trimmed.to_string()))?,
        };

        let minor_units = whole
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction))
            .ok_or(PriceError::OutOfRange)?;
        Self::from_minor_units(minor_units)
    }
}

impl TryFrom<String> for Price {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.minor_units / 100, self.minor_units % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!("10".parse::<Price>().unwrap().minor_units(), 1000);
        assert_eq!("10.5".parse::<Price>().unwrap().minor_units(), 1050);
        assert_eq!("0.07".parse::<Price>().unwrap().minor_units(), 7);
        assert_eq!(" 25.00 ".parse::<Price>().unwrap().minor_units(), 2500);
    }

    #[test]
    fn formats_with_two_decimals() {
        let price = Price::from_minor_units(805).unwrap();
        assert_eq!(price.to_string(), "8.05");
        assert_eq!(Price::from_minor_units(0).unwrap().to_string(), "0.00");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<Price>(), Err(PriceError::Empty));
        assert!(matches!("-1".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert!(matches!("1.234".parse::<Price>(), Err(PriceError::TooPrecise(_))));
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert_eq!("10000".parse::<Price>(), Err(PriceError::OutOfRange));
    }
}
