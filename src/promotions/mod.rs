//! Promotions
//!
//! Promo codes shoppers type at the cart or checkout. A code carries a percentage or fixed
//! discount and may be constrained by a minimum purchase and an expiry date. Codes are matched
//! case-insensitively and at most one is applied to a cart at a time.

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    money::{format_price, percent_fraction, percent_of_minor},
    pricing::PricingError,
};

pub mod catalog;

pub use catalog::PromoCatalog;

/// Reasons a submitted promo code was not applied.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PromoError {
    /// The code does not match any catalog entry.
    #[error("Promo code {0} not found")]
    NotFound(String),

    /// The code matched, but its validity window has passed.
    #[error("Promo code {code} expired on {valid_until}")]
    Expired {
        /// Matched code
        code: String,

        /// Last day the code was valid
        valid_until: Date,
    },

    /// The code matched, but the subtotal is below its minimum purchase.
    #[error("Promo code {code} requires a minimum purchase of {minimum}")]
    MinimumNotMet {
        /// Matched code
        code: String,

        /// Required minimum subtotal
        minimum: Money<'static, Currency>,

        /// Subtotal the code was checked against
        subtotal: Money<'static, Currency>,
    },

    /// The code's minimum purchase is in another currency from the subtotal.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// How a promo code discounts an order.
#[derive(Debug, Clone, Copy)]
pub enum DiscountKind {
    /// A percentage of the subtotal (e.g. "10% off").
    Percentage(Percentage),

    /// A fixed amount off the order (e.g. "$10 off").
    Fixed(Money<'static, Currency>),
}

impl DiscountKind {
    /// Short label for display, e.g. `"10%"` or `"10.00 USD"`.
    pub fn label(&self) -> String {
        match self {
            DiscountKind::Percentage(percent) => format!(
                "{}%",
                (percent_fraction(percent) * rust_decimal::Decimal::ONE_HUNDRED).normalize()
            ),
            DiscountKind::Fixed(amount) => format_price(amount),
        }
    }
}

/// A discount rule identified by a text code.
#[derive(Debug, Clone)]
pub struct PromoCode {
    code: String,
    discount: DiscountKind,
    minimum_purchase: Option<Money<'static, Currency>>,
    valid_until: Option<Date>,
    description: Option<String>,
}

impl PromoCode {
    /// Create an unconstrained promo code.
    pub fn new(code: impl Into<String>, discount: DiscountKind) -> Self {
        Self {
            code: code.into(),
            discount,
            minimum_purchase: None,
            valid_until: None,
            description: None,
        }
    }

    /// Require a minimum subtotal.
    #[must_use]
    pub fn with_minimum_purchase(mut self, minimum: Money<'static, Currency>) -> Self {
        self.minimum_purchase = Some(minimum);
        self
    }

    /// Make the code valid up to and including `date`.
    #[must_use]
    pub fn valid_until(mut self, date: Date) -> Self {
        self.valid_until = Some(date);
        self
    }

    /// Attach a shopper-facing description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Return the code as defined in the catalog
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Return the discount
    pub fn discount(&self) -> &DiscountKind {
        &self.discount
    }

    /// Return the minimum purchase, if any
    pub fn minimum_purchase(&self) -> Option<&Money<'static, Currency>> {
        self.minimum_purchase.as_ref()
    }

    /// Return the last valid day, if any
    pub fn expiry(&self) -> Option<Date> {
        self.valid_until
    }

    /// Return the description, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the code has expired as of `today`.
    pub fn is_expired(&self, today: Date) -> bool {
        self.valid_until.is_some_and(|valid_until| today > valid_until)
    }
}

/// Look up `code` in `catalog` and check it applies to `subtotal` on `today`.
///
/// # Errors
///
/// Checked in order:
/// - [`PromoError::NotFound`]: no catalog entry matches, ignoring case and surrounding whitespace.
/// - [`PromoError::Expired`]: `today` is after the code's last valid day.
/// - [`PromoError::MinimumNotMet`]: `subtotal` is below the code's minimum purchase.
/// - [`PromoError::Money`]: the minimum purchase is in another currency from `subtotal`.
pub fn resolve_promo_code<'c>(
    code: &str,
    subtotal: &Money<'static, Currency>,
    catalog: &'c PromoCatalog,
    today: Date,
) -> Result<&'c PromoCode, PromoError> {
    let promo = catalog
        .get(code)
        .ok_or_else(|| PromoError::NotFound(code.trim().to_string()))?;

    if let Some(valid_until) = promo.valid_until
        && today > valid_until
    {
        return Err(PromoError::Expired {
            code: promo.code.clone(),
            valid_until,
        });
    }

    if let Some(minimum) = promo.minimum_purchase
        && subtotal.lt(&minimum)?
    {
        return Err(PromoError::MinimumNotMet {
            code: promo.code.clone(),
            minimum,
            subtotal: *subtotal,
        });
    }

    Ok(promo)
}

/// The amount `promo` takes off an order with the given subtotal.
///
/// Percentage discounts are rounded to minor units. Fixed discounts are returned as defined and
/// are not capped to the subtotal; [`crate::pricing::compute_total`] clamps the total instead.
///
/// # Errors
///
/// Returns a [`PricingError`] if the percentage calculation overflows.
pub fn compute_discount(
    promo: &PromoCode,
    subtotal: &Money<'static, Currency>,
) -> Result<Money<'static, Currency>, PricingError> {
    match promo.discount {
        DiscountKind::Percentage(percent) => {
            let minor = percent_of_minor(&percent, subtotal.to_minor_units())?;

            Ok(Money::from_minor(minor, subtotal.currency()))
        }
        DiscountKind::Fixed(amount) => Ok(amount),
    }
}
