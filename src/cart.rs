//! Cart

use std::num::NonZeroU32;

use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    items::{LineItem, LineItemKey},
    money::serde_currency,
    payments::{PaymentMethod, PaymentMethodId, find_enabled},
};

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The requested quantity is not positive.
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    /// The requested quantity exceeds the known stock for the item.
    #[error("Requested quantity {requested} exceeds available stock of {available}")]
    InsufficientStock {
        /// Quantity the cart would hold
        requested: u64,

        /// Quantity available
        available: u32,
    },

    /// No line item with the given identity is in the cart.
    #[error("Item {0:?} not found")]
    ItemNotFound(LineItemKey),

    /// An item's unit price is negative.
    #[error("Item {0:?} has a negative unit price")]
    InvalidPrice(LineItemKey),

    /// An item's currency differs from the cart currency (item currency, cart currency).
    #[error("Item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The payment method is unknown or disabled.
    #[error("Payment method {0} is not available")]
    PaymentMethodUnavailable(PaymentMethodId),
}

/// A shopper's cart: line items, at most one applied promo code and the selected payment method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    #[serde(with = "serde_currency")]
    currency: &'static Currency,

    #[serde(default)]
    items: Vec<LineItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    promo_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    payment_method: Option<PaymentMethodId>,
}

impl CartState {
    /// Create an empty cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            items: Vec::new(),
            promo_code: None,
            payment_method: None,
        }
    }

    /// Add an item, merging it into an existing line with the same identity.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidPrice`]: the unit price is negative.
    /// - [`CartError::CurrencyMismatch`]: the item is priced in another currency.
    /// - [`CartError::InsufficientStock`]: the merged quantity exceeds the stock limit.
    pub fn add_item(&mut self, item: LineItem) -> Result<(), CartError> {
        if item.unit_price().to_minor_units() < 0 {
            return Err(CartError::InvalidPrice(item.key().clone()));
        }

        let item_currency = item.unit_price().currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let Some(existing) = self.items.iter_mut().find(|line| line.key() == item.key()) else {
            check_stock(u64::from(item.quantity().get()), item.stock())?;

            self.items.push(item);

            return Ok(());
        };

        // The latest known stock limit wins.
        let stock = item.stock().or(existing.stock());
        let requested = u64::from(existing.quantity().get()) + u64::from(item.quantity().get());

        check_stock(requested, stock)?;

        let quantity = u32::try_from(requested)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(CartError::InsufficientStock {
                requested,
                available: u32::MAX,
            })?;

        existing.set_quantity(quantity);
        existing.set_stock(stock);

        Ok(())
    }

    /// Set the quantity of a line item.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::InsufficientStock`]: `quantity` exceeds the stock limit.
    /// - [`CartError::ItemNotFound`]: no line with `key` exists.
    pub fn set_quantity(&mut self, key: &LineItemKey, quantity: u32) -> Result<(), CartError> {
        let quantity =
            NonZeroU32::new(quantity).ok_or(CartError::InvalidQuantity(i64::from(quantity)))?;

        let line = self.line_mut(key)?;

        check_stock(u64::from(quantity.get()), line.stock())?;

        line.set_quantity(quantity);

        Ok(())
    }

    /// Change the quantity of a line item by `delta`, removing it when it reaches zero.
    ///
    /// Returns the remaining quantity, or `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// - [`CartError::InsufficientStock`]: the new quantity exceeds the stock limit.
    /// - [`CartError::ItemNotFound`]: no line with `key` exists.
    pub fn adjust_quantity(
        &mut self,
        key: &LineItemKey,
        delta: i64,
    ) -> Result<Option<NonZeroU32>, CartError> {
        let line = self.line_mut(key)?;
        let requested = i64::from(line.quantity().get()).saturating_add(delta);

        if requested <= 0 {
            self.remove_item(key)?;

            return Ok(None);
        }

        let requested = requested.unsigned_abs();

        check_stock(requested, line.stock())?;

        let quantity = u32::try_from(requested)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(CartError::InsufficientStock {
                requested,
                available: u32::MAX,
            })?;

        line.set_quantity(quantity);

        Ok(Some(quantity))
    }

    /// Remove a line item.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if no line with `key` exists.
    pub fn remove_item(&mut self, key: &LineItemKey) -> Result<LineItem, CartError> {
        let idx = self
            .items
            .iter()
            .position(|line| line.key() == key)
            .ok_or_else(|| CartError::ItemNotFound(key.clone()))?;

        Ok(self.items.remove(idx))
    }

    /// Remove every line item and the applied promo code.
    ///
    /// The selected payment method is kept.
    pub fn clear(&mut self) {
        self.items.clear();
        self.promo_code = None;
    }

    /// Store a promo code, replacing any previously applied code.
    ///
    /// The code is validated at pricing time, see [`crate::pricing::price_cart`].
    pub fn apply_promo(&mut self, code: impl Into<String>) -> Option<String> {
        self.promo_code.replace(code.into())
    }

    /// Remove the applied promo code, returning it.
    pub fn remove_promo(&mut self) -> Option<String> {
        self.promo_code.take()
    }

    /// Select a payment method from `methods`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::PaymentMethodUnavailable`] if the method is unknown or disabled.
    pub fn select_payment_method(
        &mut self,
        id: &PaymentMethodId,
        methods: &[PaymentMethod],
    ) -> Result<(), CartError> {
        if find_enabled(id, methods).is_none() {
            return Err(CartError::PaymentMethodUnavailable(id.clone()));
        }

        self.payment_method = Some(id.clone());

        Ok(())
    }

    /// Get a line item by identity.
    pub fn get_item(&self, key: &LineItemKey) -> Option<&LineItem> {
        self.items.iter().find(|line| line.key() == key)
    }

    /// Iterate over the line items in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// The line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity().get()))
            .sum()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// The applied promo code, as entered.
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    /// The selected payment method.
    pub fn payment_method(&self) -> Option<&PaymentMethodId> {
        self.payment_method.as_ref()
    }

    fn line_mut(&mut self, key: &LineItemKey) -> Result<&mut LineItem, CartError> {
        self.items
            .iter_mut()
            .find(|line| line.key() == key)
            .ok_or_else(|| CartError::ItemNotFound(key.clone()))
    }
}

fn check_stock(requested: u64, stock: Option<u32>) -> Result<(), CartError> {
    match stock {
        Some(available) if requested > u64::from(available) => Err(CartError::InsufficientStock {
            requested,
            available,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{EUR, USD},
    };
    use testresult::TestResult;

    use super::*;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("non-zero quantity")
    }

    fn tee(size: &str, quantity: u32) -> LineItem {
        LineItem::new(
            LineItemKey::product("tee").with_size(size),
            "Classic Tee",
            Money::from_minor(2500, USD),
            qty(quantity),
        )
    }

    fn methods() -> Vec<PaymentMethod> {
        vec![
            PaymentMethod::new("card", "Credit Card", true, Money::from_minor(0, USD)),
            PaymentMethod::new("crypto", "Crypto", false, Money::from_minor(100, USD)),
        ]
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = CartState::new(USD);

        assert!(cart.is_empty());
        assert_eq!(cart.currency(), USD);
        assert_eq!(cart.promo_code(), None);
        assert_eq!(cart.payment_method(), None);
    }

    #[test]
    fn add_item_merges_same_identity() -> TestResult {
        let mut cart = CartState::new(USD);

        cart.add_item(tee("M", 1))?;
        cart.add_item(tee("M", 2))?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.unit_count(), 3);

        Ok(())
    }

    #[test]
    fn add_item_keeps_variants_apart() -> TestResult {
        let mut cart = CartState::new(USD);

        cart.add_item(tee("M", 1))?;
        cart.add_item(tee("L", 1))?;

        assert_eq!(cart.len(), 2);

        Ok(())
    }

    #[test]
    fn add_item_rejects_currency_mismatch() {
        let mut cart = CartState::new(USD);
        let item = LineItem::new(
            LineItemKey::product("mug"),
            "Mug",
            Money::from_minor(900, EUR),
            qty(1),
        );

        assert_eq!(
            cart.add_item(item),
            Err(CartError::CurrencyMismatch("EUR", "USD"))
        );
    }

    #[test]
    fn add_item_rejects_negative_price() -> TestResult {
        let mut cart = CartState::new(USD);
        let refund = LineItem::new(
            LineItemKey::product("refund"),
            "Refund",
            Money::from_minor(-5000, USD),
            qty(1),
        );

        cart.add_item(tee("M", 1))?;

        assert_eq!(
            cart.add_item(refund),
            Err(CartError::InvalidPrice(LineItemKey::product("refund")))
        );
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn add_item_accepts_free_item() -> TestResult {
        let mut cart = CartState::new(USD);

        cart.add_item(LineItem::new(
            LineItemKey::product("sticker"),
            "Sticker",
            Money::from_minor(0, USD),
            qty(1),
        ))?;

        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn add_item_respects_stock_when_merging() -> TestResult {
        let mut cart = CartState::new(USD);

        cart.add_item(tee("M", 2).with_stock(3))?;

        assert_eq!(
            cart.add_item(tee("M", 2)),
            Err(CartError::InsufficientStock {
                requested: 4,
                available: 3
            })
        );
        assert_eq!(cart.unit_count(), 2);

        Ok(())
    }

    #[test]
    fn set_quantity_rejects_zero() -> TestResult {
        let mut cart = CartState::new(USD);
        cart.add_item(tee("M", 1))?;

        let key = LineItemKey::product("tee").with_size("M");

        assert_eq!(
            cart.set_quantity(&key, 0),
            Err(CartError::InvalidQuantity(0))
        );

        cart.set_quantity(&key, 5)?;
        assert_eq!(cart.unit_count(), 5);

        Ok(())
    }

    #[test]
    fn set_quantity_unknown_item() {
        let mut cart = CartState::new(USD);
        let key = LineItemKey::product("ghost");

        assert_eq!(
            cart.set_quantity(&key, 1),
            Err(CartError::ItemNotFound(key.clone()))
        );
    }

    #[test]
    fn adjust_quantity_removes_line_at_zero() -> TestResult {
        let mut cart = CartState::new(USD);
        cart.add_item(tee("M", 2))?;

        let key = LineItemKey::product("tee").with_size("M");

        assert_eq!(cart.adjust_quantity(&key, 1)?, Some(qty(3)));
        assert_eq!(cart.adjust_quantity(&key, -3)?, None);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn adjust_quantity_respects_stock() -> TestResult {
        let mut cart = CartState::new(USD);
        cart.add_item(tee("M", 1).with_stock(1))?;

        let key = LineItemKey::product("tee").with_size("M");

        assert!(matches!(
            cart.adjust_quantity(&key, 1),
            Err(CartError::InsufficientStock { available: 1, .. })
        ));

        Ok(())
    }

    #[test]
    fn remove_item_returns_line() -> TestResult {
        let mut cart = CartState::new(USD);
        cart.add_item(tee("M", 1))?;

        let removed = cart.remove_item(&LineItemKey::product("tee").with_size("M"))?;

        assert_eq!(removed.name(), "Classic Tee");
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn apply_promo_replaces_previous_code() {
        let mut cart = CartState::new(USD);

        assert_eq!(cart.apply_promo("WELCOME10"), None);
        assert_eq!(cart.apply_promo("SUMMER20"), Some("WELCOME10".to_string()));
        assert_eq!(cart.promo_code(), Some("SUMMER20"));
        assert_eq!(cart.remove_promo(), Some("SUMMER20".to_string()));
        assert_eq!(cart.promo_code(), None);
    }

    #[test]
    fn clear_drops_items_and_promo_but_keeps_payment() -> TestResult {
        let mut cart = CartState::new(USD);
        cart.add_item(tee("M", 1))?;
        cart.apply_promo("WELCOME10");
        cart.select_payment_method(&PaymentMethodId::new("card"), &methods())?;

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.promo_code(), None);
        assert_eq!(cart.payment_method(), Some(&PaymentMethodId::new("card")));

        Ok(())
    }

    #[test]
    fn select_payment_method_rejects_disabled_and_unknown() {
        let mut cart = CartState::new(USD);

        for id in ["crypto", "cheque"] {
            let id = PaymentMethodId::new(id);

            assert_eq!(
                cart.select_payment_method(&id, &methods()),
                Err(CartError::PaymentMethodUnavailable(id.clone()))
            );
        }

        assert_eq!(cart.payment_method(), None);
    }

    #[test]
    fn cart_round_trips_through_json() -> TestResult {
        let mut cart = CartState::new(USD);
        cart.add_item(tee("M", 2).with_stock(10))?;
        cart.apply_promo("welcome10");

        let json = serde_json::to_string(&cart)?;
        let back: CartState = serde_json::from_str(&json)?;

        assert_eq!(back, cart);

        Ok(())
    }
}
