//! Currency codes and minor-unit conversion.
//!
//! Plan prices are quoted in whole currency units (e.g. 10 rupees). Payment
//! gateways expect amounts in the currency's minor unit (paise, cents), so
//! conversion lives next to the currency itself.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a currency code is not supported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct CurrencyError(pub String);

/// ISO 4217 currency codes accepted by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    SGD,
    AED,
}

impl CurrencyCode {
    /// Returns the ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::SGD => "SGD",
            Self::AED => "AED",
        }
    }

    /// Number of minor units per major unit.
    ///
    /// Every supported currency uses two decimal places.
    #[must_use]
    pub const fn minor_unit_factor(self) -> i64 {
        100
    }

    /// Convert an amount in whole units into minor units.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub const fn to_minor_units(self, amount: i64) -> Option<i64> {
        amount.checked_mul(self.minor_unit_factor())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "SGD" => Ok(Self::SGD),
            "AED" => Ok(Self::AED),
            other => Err(CurrencyError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("inr".parse::<CurrencyCode>().unwrap(), CurrencyCode::INR);
        assert_eq!(" USD ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "XYZ".parse::<CurrencyCode>().unwrap_err();
        assert_eq!(err, CurrencyError("XYZ".to_owned()));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(CurrencyCode::INR.to_minor_units(250), Some(25_000));
        assert_eq!(CurrencyCode::USD.to_minor_units(i64::MAX), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CurrencyCode::EUR.to_string(), "EUR");
    }
}
