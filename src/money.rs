//! Money helpers
//!
//! Parsing and formatting of `"AMOUNT CODE"` price strings, percentage parsing and the
//! minor-unit percentage arithmetic shared by the pricing engine.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Errors raised while parsing amounts, currencies and percentages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// Price string was not of the form `AMOUNT CODE`.
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Percentage string could not be parsed.
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Currency code is not a known ISO 4217 code.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Percentage calculation overflowed or could not be represented in minor units.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Zero in the given currency.
pub fn zero(currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_minor(0, currency)
}

/// Look up an ISO 4217 currency by its alpha code (e.g. `"USD"`).
///
/// # Errors
///
/// Returns [`AmountError::UnknownCurrency`] if the code is not recognised.
pub fn find_currency(code: &str) -> Result<&'static Currency, AmountError> {
    iso::find(code.trim()).ok_or_else(|| AmountError::UnknownCurrency(code.to_string()))
}

/// Parse a price string (e.g. `"12.50 USD"`) into money.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognised.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, AmountError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, code] = parts.as_slice() else {
        return Err(AmountError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| AmountError::InvalidPrice(s.to_string()))?;

    let currency = find_currency(code)?;

    let minor_units = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .ok_or_else(|| AmountError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Format money as a price string that [`parse_price`] reads back (e.g. `"12.50 USD"`).
pub fn format_price(money: &Money<'_, Currency>) -> String {
    let currency = money.currency();

    format!(
        "{} {}",
        Decimal::new(money.to_minor_units(), currency.exponent),
        currency.iso_alpha_code
    )
}

/// Parse a percentage string (e.g. `"15%"` or `"0.15"`) into a [`Percentage`].
///
/// # Errors
///
/// Returns [`AmountError::InvalidPercentage`] if the string is not a number.
pub fn parse_percentage(s: &str) -> Result<Percentage, AmountError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| AmountError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / Decimal::ONE_HUNDRED))
    } else {
        let value = trimmed
            .parse::<Decimal>()
            .map_err(|_err| AmountError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

/// The fraction a percentage represents (`0.15` for 15%).
pub fn percent_fraction(percent: &Percentage) -> Decimal {
    // decimal_percentage doesn't expose the underlying Decimal
    (*percent) * Decimal::ONE
}

/// Calculate a percentage of a minor unit amount, rounded half away from zero.
///
/// # Errors
///
/// Returns [`AmountError::PercentConversion`] if the result overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, AmountError> {
    let minor = Decimal::from_i64(minor).ok_or(AmountError::PercentConversion)?;

    percent_fraction(percent)
        .checked_mul(minor)
        .ok_or(AmountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AmountError::PercentConversion)
}

/// Serde adapter storing money as a price string.
pub mod serde_price {
    use rusty_money::{Money, iso::Currency};
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{format_price, parse_price};

    /// Serialize money as `"AMOUNT CODE"`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        money: &Money<'static, Currency>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_price(money))
    }

    /// Deserialize money from `"AMOUNT CODE"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid price.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Money<'static, Currency>, D::Error> {
        let raw = String::deserialize(deserializer)?;

        parse_price(&raw).map_err(de::Error::custom)
    }
}

/// Serde adapter storing a currency as its ISO alpha code.
pub mod serde_currency {
    use rusty_money::iso::Currency;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::find_currency;

    /// Serialize a currency as its ISO alpha code.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        currency: &&'static Currency,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(currency.iso_alpha_code)
    }

    /// Deserialize a currency from its ISO alpha code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is unknown.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<&'static Currency, D::Error> {
        let raw = String::deserialize(deserializer)?;

        find_currency(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, JPY, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_reads_amount_and_currency() -> TestResult {
        assert_eq!(parse_price("12.50 USD")?, Money::from_minor(1250, USD));
        assert_eq!(parse_price("100 GBP")?, Money::from_minor(10_000, GBP));

        Ok(())
    }

    #[test]
    fn parse_price_respects_currency_exponent() -> TestResult {
        assert_eq!(parse_price("500 JPY")?, Money::from_minor(500, JPY));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        assert!(matches!(
            parse_price("2.99USD"),
            Err(AmountError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("abc USD"),
            Err(AmountError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        assert_eq!(
            parse_price("1.00 XYZ"),
            Err(AmountError::UnknownCurrency("XYZ".to_string()))
        );
    }

    #[test]
    fn format_price_reads_back() -> TestResult {
        let money = Money::from_minor(1999, USD);

        assert_eq!(format_price(&money), "19.99 USD");
        assert_eq!(parse_price(&format_price(&money))?, money);

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_forms() -> TestResult {
        assert_eq!(
            percent_fraction(&parse_percentage("15%")?),
            Decimal::new(15, 2)
        );
        assert_eq!(
            percent_fraction(&parse_percentage("0.25")?),
            Decimal::new(25, 2)
        );

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_text() {
        assert!(matches!(
            parse_percentage("ten percent"),
            Err(AmountError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        let percent = Percentage::from(Decimal::new(1, 1));

        assert_eq!(percent_of_minor(&percent, 20_000)?, 2000);
        assert_eq!(percent_of_minor(&percent, 5)?, 1);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(Decimal::TWO);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(AmountError::PercentConversion)));
    }
}
