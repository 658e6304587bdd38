//! Pricing
//!
//! The cart pricing engine: subtotal, shipping, payment fee, promotional discount and total.
//! Every function here is pure; callers own persistence of the cart being priced.

use jiff::civil::Date;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::CartState,
    catalog::Catalog,
    items::LineItem,
    money::{AmountError, zero},
    payments::compute_payment_fee,
    promotions::{PromoError, compute_discount, resolve_promo_code},
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line total (unit price times quantity) does not fit in minor units.
    #[error("line total for {0} overflowed")]
    Overflow(String),

    /// Percentage discount could not be represented in minor units.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Flat-rate shipping that becomes free above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy {
    free_threshold: Money<'static, Currency>,
    flat_rate: Money<'static, Currency>,
}

impl ShippingPolicy {
    /// Create a shipping policy.
    pub fn new(
        free_threshold: Money<'static, Currency>,
        flat_rate: Money<'static, Currency>,
    ) -> Self {
        Self {
            free_threshold,
            flat_rate,
        }
    }

    /// Free shipping over 100, otherwise a flat 10, in whole units of `currency`.
    pub fn standard(currency: &'static Currency) -> Self {
        let unit = 10_i64.pow(currency.exponent);

        Self::new(
            Money::from_minor(100 * unit, currency),
            Money::from_minor(10 * unit, currency),
        )
    }

    /// Subtotals strictly greater than this ship free.
    pub fn free_threshold(&self) -> Money<'static, Currency> {
        self.free_threshold
    }

    /// Shipping charged at or below the threshold.
    pub fn flat_rate(&self) -> Money<'static, Currency> {
        self.flat_rate
    }
}

/// A promo code that was applied while pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromo {
    /// Code as defined in the catalog
    pub code: String,

    /// Amount taken off the order
    pub discount: Money<'static, Currency>,
}

/// Price breakdown of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    subtotal: Money<'static, Currency>,
    shipping: Money<'static, Currency>,
    fee: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    total: Money<'static, Currency>,
    promo: Option<AppliedPromo>,
    promo_rejection: Option<PromoError>,
}

impl PriceBreakdown {
    /// Sum of line totals before shipping, fees or discounts
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Shipping quoted for the subtotal
    pub fn shipping(&self) -> Money<'static, Currency> {
        self.shipping
    }

    /// Payment method surcharge
    pub fn fee(&self) -> Money<'static, Currency> {
        self.fee
    }

    /// Promotional discount
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    /// Amount due
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// The promo code that was applied, if any.
    pub fn promo(&self) -> Option<&AppliedPromo> {
        self.promo.as_ref()
    }

    /// Why the cart's stored promo code no longer applies, if it doesn't.
    pub fn promo_rejection(&self) -> Option<&PromoError> {
        self.promo_rejection.as_ref()
    }

    /// Whether shipping is free at this subtotal.
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.to_minor_units() == 0
    }
}

/// Sum of unit price times quantity over `items`; zero in `currency` when empty.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line total does not fit in minor units.
/// - [`PricingError::Money`]: an item is priced in another currency, or the sum overflows.
pub fn compute_subtotal(
    items: &[LineItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    items.iter().try_fold(zero(currency), |acc, item| {
        let line_total = item
            .line_total_minor()
            .ok_or_else(|| PricingError::Overflow(item.product().to_string()))?;

        Ok(acc.add(Money::from_minor(
            line_total,
            item.unit_price().currency(),
        ))?)
    })
}

/// Shipping for a subtotal: free when strictly greater than the policy threshold, otherwise the
/// flat rate.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if the policy is in another currency from `subtotal`.
pub fn compute_shipping(
    subtotal: &Money<'static, Currency>,
    policy: &ShippingPolicy,
) -> Result<Money<'static, Currency>, PricingError> {
    let free = zero(subtotal.currency());

    if subtotal.gt(&policy.free_threshold)? {
        Ok(free)
    } else {
        Ok(free.add(policy.flat_rate)?)
    }
}

/// `subtotal + shipping + fee - discount`, clamped at zero.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if the amounts are in different currencies.
pub fn compute_total(
    subtotal: &Money<'static, Currency>,
    shipping: &Money<'static, Currency>,
    fee: &Money<'static, Currency>,
    discount: &Money<'static, Currency>,
) -> Result<Money<'static, Currency>, PricingError> {
    let total = subtotal.add(*shipping)?.add(*fee)?.sub(*discount)?;

    if total.to_minor_units() < 0 {
        return Ok(zero(total.currency()));
    }

    Ok(total)
}

/// Price a cart against a catalog.
///
/// The cart's promo code is re-resolved against the current subtotal every time, so a code
/// whose minimum is no longer met stops applying; the reason is kept in
/// [`PriceBreakdown::promo_rejection`]. An empty cart carries no discount and is not charged
/// shipping, so its total is the payment fee alone.
///
/// # Errors
///
/// Returns a [`PricingError`] if money arithmetic fails.
pub fn price_cart(
    cart: &CartState,
    catalog: &Catalog,
    today: Date,
) -> Result<PriceBreakdown, PricingError> {
    let currency = cart.currency();

    let subtotal = compute_subtotal(cart.items(), currency)?;
    let shipping = compute_shipping(&subtotal, catalog.shipping())?;
    let fee = compute_payment_fee(cart.payment_method(), catalog.payment_methods(), currency);

    let (promo, promo_rejection) = match cart.promo_code() {
        Some(code) if !cart.is_empty() => {
            match resolve_promo_code(code, &subtotal, catalog.promo_codes(), today) {
                Ok(promo) => (
                    Some(AppliedPromo {
                        code: promo.code().to_string(),
                        discount: compute_discount(promo, &subtotal)?,
                    }),
                    None,
                ),
                Err(rejection) => (None, Some(rejection)),
            }
        }
        _ => (None, None),
    };

    let discount = promo
        .as_ref()
        .map_or_else(|| zero(currency), |applied| applied.discount);

    let charged_shipping = if cart.is_empty() {
        zero(currency)
    } else {
        shipping
    };

    let total = compute_total(&subtotal, &charged_shipping, &fee, &discount)?;

    Ok(PriceBreakdown {
        subtotal,
        shipping,
        fee,
        discount,
        total,
        promo,
        promo_rejection,
    })
}
