//! Payment methods

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::money::zero;

/// Payment method identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodId(String);

impl PaymentMethodId {
    /// Create a payment method identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaymentMethodId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A way to pay, with an optional flat surcharge.
#[derive(Clone, Debug, PartialEq)]
pub struct PaymentMethod {
    id: PaymentMethodId,
    name: String,
    enabled: bool,
    fee: Money<'static, Currency>,
}

impl PaymentMethod {
    /// Create a payment method.
    pub fn new(
        id: impl Into<PaymentMethodId>,
        name: impl Into<String>,
        enabled: bool,
        fee: Money<'static, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled,
            fee,
        }
    }

    /// Return the identifier
    pub fn id(&self) -> &PaymentMethodId {
        &self.id
    }

    /// Return the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether shoppers may select this method.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Return the flat fee
    pub fn fee(&self) -> Money<'static, Currency> {
        self.fee
    }
}

/// Find an enabled payment method by id.
pub fn find_enabled<'m>(
    id: &PaymentMethodId,
    methods: &'m [PaymentMethod],
) -> Option<&'m PaymentMethod> {
    methods
        .iter()
        .find(|method| method.id() == id && method.is_enabled())
}

/// Flat fee of the selected method, or zero when no enabled method matches.
pub fn compute_payment_fee(
    selected: Option<&PaymentMethodId>,
    methods: &[PaymentMethod],
    currency: &'static Currency,
) -> Money<'static, Currency> {
    selected
        .and_then(|id| find_enabled(id, methods))
        .map_or_else(|| zero(currency), PaymentMethod::fee)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    fn methods() -> Vec<PaymentMethod> {
        vec![
            PaymentMethod::new("card", "Credit Card", true, Money::from_minor(0, USD)),
            PaymentMethod::new(
                "cod",
                "Cash on Delivery",
                true,
                Money::from_minor(500, USD),
            ),
            PaymentMethod::new("crypto", "Crypto", false, Money::from_minor(100, USD)),
        ]
    }

    #[test]
    fn fee_of_selected_method() {
        let id = PaymentMethodId::new("cod");

        assert_eq!(
            compute_payment_fee(Some(&id), &methods(), USD),
            Money::from_minor(500, USD)
        );
    }

    #[test]
    fn fee_is_zero_when_nothing_selected() {
        assert_eq!(
            compute_payment_fee(None, &methods(), USD),
            Money::from_minor(0, USD)
        );
    }

    #[test]
    fn fee_is_zero_for_unknown_or_disabled_method() {
        for id in ["cheque", "crypto"] {
            let id = PaymentMethodId::new(id);

            assert_eq!(
                compute_payment_fee(Some(&id), &methods(), USD),
                Money::from_minor(0, USD)
            );
        }
    }

    #[test]
    fn find_enabled_skips_disabled() {
        let methods = methods();

        assert!(find_enabled(&PaymentMethodId::new("card"), &methods).is_some());
        assert!(find_enabled(&PaymentMethodId::new("crypto"), &methods).is_none());
    }
}
