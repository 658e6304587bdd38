//! Orders
//!
//! An order is a priced snapshot of a cart at the moment it was placed. Orders can be re-priced
//! later against a (possibly different) catalog, which is how back-office order recompute reuses
//! the same pricing engine as the storefront.

use std::fmt;

use jiff::{Timestamp, civil::Date};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cart::CartState,
    catalog::Catalog,
    items::LineItem,
    payments::PaymentMethodId,
    pricing::{PriceBreakdown, PricingError, price_cart},
    storage::SessionId,
};

/// Reasons an order cannot be placed.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// There is nothing in the cart.
    #[error("Cannot place an order for an empty cart")]
    EmptyCart,

    /// No payment method has been selected.
    #[error("No payment method selected")]
    NoPaymentMethod,

    /// The selected payment method is unknown to, or disabled in, the catalog.
    #[error("Payment method {0} is not available")]
    PaymentMethodUnavailable(PaymentMethodId),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Order identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a new, time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// The underlying UUID
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    session: SessionId,
    cart: CartState,
    breakdown: PriceBreakdown,
    placed_at: Timestamp,
}

impl Order {
    /// Price `cart` and snapshot it as an order.
    ///
    /// A stored promo code that no longer applies is dropped from the snapshot, so the order
    /// records exactly what was charged.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: the cart has no lines.
    /// - [`OrderError::NoPaymentMethod`]: no payment method is selected.
    /// - [`OrderError::PaymentMethodUnavailable`]: the selected method is unknown or disabled.
    /// - [`OrderError::Pricing`]: the cart could not be priced.
    pub fn place(
        session: SessionId,
        cart: &CartState,
        catalog: &Catalog,
        today: Date,
        placed_at: Timestamp,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let method = cart.payment_method().ok_or(OrderError::NoPaymentMethod)?;

        if catalog.payment_method(method).is_none() {
            return Err(OrderError::PaymentMethodUnavailable(method.clone()));
        }

        let breakdown = price_cart(cart, catalog, today)?;

        let mut cart = cart.clone();

        if breakdown.promo().is_none() {
            cart.remove_promo();
        }

        Ok(Self {
            id: OrderId::generate(),
            session,
            cart,
            breakdown,
            placed_at,
        })
    }

    /// Re-price the order's lines against `catalog` as of `today`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if money arithmetic fails.
    pub fn recompute(
        &self,
        catalog: &Catalog,
        today: Date,
    ) -> Result<PriceBreakdown, PricingError> {
        price_cart(&self.cart, catalog, today)
    }

    /// Order identifier
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Session the order was placed from
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Ordered lines
    pub fn lines(&self) -> &[LineItem] {
        self.cart.items()
    }

    /// Promo code that was charged, if any
    pub fn promo_code(&self) -> Option<&str> {
        self.cart.promo_code()
    }

    /// Payment method used
    pub fn payment_method(&self) -> Option<&PaymentMethodId> {
        self.cart.payment_method()
    }

    /// The cart as ordered
    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Price breakdown at the time of placement
    pub fn breakdown(&self) -> &PriceBreakdown {
        &self.breakdown
    }

    /// When the order was placed
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use jiff::civil::date;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::items::LineItemKey;

    use super::*;

    fn today() -> Date {
        date(2025, 6, 1)
    }

    fn session() -> SessionId {
        SessionId::new("order-test").expect("valid session id")
    }

    fn cart_with(price_minor: i64, catalog: &Catalog) -> CartState {
        let mut cart = CartState::new(USD);

        cart.add_item(LineItem::new(
            LineItemKey::product("jacket"),
            "Rain Jacket",
            Money::from_minor(price_minor, USD),
            NonZeroU32::MIN,
        ))
        .expect("add item");

        cart.select_payment_method(
            &PaymentMethodId::new("credit-card"),
            catalog.payment_methods(),
        )
        .expect("select card");

        cart
    }

    #[test]
    fn place_snapshots_breakdown() -> TestResult {
        let catalog = Catalog::storefront()?;
        let mut cart = cart_with(20_000, &catalog);
        cart.apply_promo("welcome10");

        let order = Order::place(session(), &cart, &catalog, today(), Timestamp::UNIX_EPOCH)?;

        assert_eq!(order.breakdown().total(), Money::from_minor(18_000, USD));
        assert_eq!(order.promo_code(), Some("welcome10"));
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.session(), &session());
        assert_eq!(order.placed_at(), Timestamp::UNIX_EPOCH);

        Ok(())
    }

    #[test]
    fn place_drops_promo_that_no_longer_applies() -> TestResult {
        let catalog = Catalog::storefront()?;
        let mut cart = cart_with(8000, &catalog);
        cart.apply_promo("SUMMER20");

        let order = Order::place(session(), &cart, &catalog, today(), Timestamp::UNIX_EPOCH)?;

        assert_eq!(order.promo_code(), None);
        assert_eq!(order.breakdown().discount(), Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn place_requires_items_and_payment() -> TestResult {
        let catalog = Catalog::storefront()?;

        let empty = CartState::new(USD);
        assert_eq!(
            Order::place(session(), &empty, &catalog, today(), Timestamp::UNIX_EPOCH).err(),
            Some(OrderError::EmptyCart)
        );

        let mut unpaid = CartState::new(USD);
        unpaid.add_item(LineItem::new(
            LineItemKey::product("jacket"),
            "Rain Jacket",
            Money::from_minor(5000, USD),
            NonZeroU32::MIN,
        ))?;
        assert_eq!(
            Order::place(session(), &unpaid, &catalog, today(), Timestamp::UNIX_EPOCH).err(),
            Some(OrderError::NoPaymentMethod)
        );

        Ok(())
    }

    #[test]
    fn place_rejects_method_disabled_after_selection() -> TestResult {
        let storefront = Catalog::storefront()?;
        let cart = cart_with(5000, &storefront);

        let disabled = Catalog::from_yaml_str(
            r"
currency: USD
payment_methods:
  - id: credit-card
    name: Card
    enabled: false
",
        )?;
        let card = PaymentMethodId::new("credit-card");
        let placed = Order::place(session(), &cart, &disabled, today(), Timestamp::UNIX_EPOCH);

        assert_eq!(placed.err(), Some(OrderError::PaymentMethodUnavailable(card)));

        Ok(())
    }

    #[test]
    fn recompute_uses_the_given_catalog() -> TestResult {
        let storefront = Catalog::storefront()?;
        let cart = cart_with(5000, &storefront);
        let order = Order::place(session(), &cart, &storefront, today(), Timestamp::UNIX_EPOCH)?;

        assert_eq!(order.breakdown().total(), Money::from_minor(6000, USD));

        let cheaper_shipping = Catalog::from_yaml_str(
            r#"
currency: USD
shipping:
  free_threshold: "25.00 USD"
  flat_rate: "5.00 USD"
payment_methods:
  - id: credit-card
    name: Card
"#,
        )?;

        let recomputed = order.recompute(&cheaper_shipping, today())?;

        assert_eq!(recomputed.shipping(), Money::from_minor(0, USD));
        assert_eq!(recomputed.total(), Money::from_minor(5000, USD));

        Ok(())
    }
}
