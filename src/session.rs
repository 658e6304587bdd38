//! Checkout sessions
//!
//! A [`CheckoutSession`] owns one shopper's [`CartState`] and writes it back to a [`CartStore`]
//! after every successful change. Changes are made on a copy and only committed once the store
//! has accepted them, so a failed save leaves the session as it was.

use jiff::{Timestamp, civil::Date};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::{CartError, CartState},
    catalog::Catalog,
    items::{LineItem, LineItemKey},
    orders::{Order, OrderError},
    payments::PaymentMethodId,
    pricing::{AppliedPromo, PriceBreakdown, PricingError, compute_subtotal, price_cart},
    promotions::{PromoError, compute_discount, resolve_promo_code},
    storage::{CartStore, SessionId, StorageError},
};

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The cart rejected the change.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// A promo code could not be applied.
    #[error(transparent)]
    Promo(#[from] PromoError),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The cart could not be loaded or saved.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The order could not be placed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The stored cart is priced in a different currency from the catalog (cart, catalog).
    #[error("Stored cart uses {0} but the catalog uses {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// One shopper's cart, bound to a store and a catalog.
#[derive(Debug)]
pub struct CheckoutSession<'c, S: CartStore> {
    id: SessionId,
    cart: CartState,
    store: S,
    catalog: &'c Catalog,
}

impl<'c, S: CartStore> CheckoutSession<'c, S> {
    /// Open a session, restoring its stored cart or starting an empty one in the catalog
    /// currency.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Storage`]: the stored cart could not be read.
    /// - [`SessionError::CurrencyMismatch`]: the stored cart uses another currency.
    pub fn open(id: SessionId, store: S, catalog: &'c Catalog) -> Result<Self, SessionError> {
        let cart = match store.load(&id)? {
            Some(cart) => {
                if cart.currency() != catalog.currency() {
                    return Err(SessionError::CurrencyMismatch(
                        cart.currency().iso_alpha_code,
                        catalog.currency().iso_alpha_code,
                    ));
                }

                debug!(session = %id, lines = cart.len(), "restored cart");

                cart
            }
            None => {
                debug!(session = %id, "starting new cart");

                CartState::new(catalog.currency())
            }
        };

        Ok(Self {
            id,
            cart,
            store,
            catalog,
        })
    }

    /// Session identifier
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current cart
    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Catalog the session prices against
    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Add a line, merging with an existing line of the same product and variant.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the cart rejects the item or the cart cannot be saved.
    pub fn add_item(&mut self, item: LineItem) -> Result<(), SessionError> {
        let key = item.key().clone();
        let quantity = item.quantity();

        self.commit(|cart| cart.add_item(item))?;

        info!(session = %self.id, product = %key.product, quantity = quantity.get(), "added item");

        Ok(())
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the quantity is zero, exceeds stock, the line is unknown, or
    /// the cart cannot be saved.
    pub fn set_quantity(&mut self, key: &LineItemKey, quantity: u32) -> Result<(), SessionError> {
        self.commit(|cart| cart.set_quantity(key, quantity))?;

        debug!(session = %self.id, product = %key.product, quantity, "set quantity");

        Ok(())
    }

    /// Change a line's quantity by `delta`, removing it when nothing is left. Returns the new
    /// quantity, or `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the result exceeds stock, the line is unknown, or the cart
    /// cannot be saved.
    pub fn adjust_quantity(
        &mut self,
        key: &LineItemKey,
        delta: i64,
    ) -> Result<Option<u32>, SessionError> {
        let quantity = self.commit(|cart| cart.adjust_quantity(key, delta))?;

        debug!(session = %self.id, product = %key.product, delta, ?quantity, "adjusted quantity");

        Ok(quantity.map(std::num::NonZeroU32::get))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the line is unknown or the cart cannot be saved.
    pub fn remove_item(&mut self, key: &LineItemKey) -> Result<LineItem, SessionError> {
        let removed = self.commit(|cart| cart.remove_item(key))?;

        info!(session = %self.id, product = %key.product, "removed item");

        Ok(removed)
    }

    /// Empty the cart and drop its promo code. The payment method is kept.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the cart cannot be saved.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.commit(|cart| {
            cart.clear();

            Ok(())
        })?;

        info!(session = %self.id, "cleared cart");

        Ok(())
    }

    /// Validate `code` against the current subtotal and store it on the cart.
    ///
    /// On failure the previously applied code, if any, stays in place.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Promo`]: the code is unknown, expired, or its minimum is not met.
    /// - [`SessionError::Pricing`]: the subtotal or discount could not be computed.
    /// - [`SessionError::Storage`]: the cart could not be saved.
    pub fn apply_promo(&mut self, code: &str, today: Date) -> Result<AppliedPromo, SessionError> {
        let subtotal = compute_subtotal(self.cart.items(), self.cart.currency())?;

        let promo = match resolve_promo_code(code, &subtotal, self.catalog.promo_codes(), today) {
            Ok(promo) => promo,
            Err(err) => {
                warn!(session = %self.id, code, %err, "promo code rejected");

                return Err(err.into());
            }
        };

        let applied = AppliedPromo {
            code: promo.code().to_string(),
            discount: compute_discount(promo, &subtotal)?,
        };

        self.commit(|cart| {
            cart.apply_promo(applied.code.clone());

            Ok(())
        })?;

        info!(
            session = %self.id,
            code = %applied.code,
            discount = %applied.discount,
            "applied promo code"
        );

        Ok(applied)
    }

    /// Drop the applied promo code, returning it.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the cart cannot be saved.
    pub fn remove_promo(&mut self) -> Result<Option<String>, SessionError> {
        let removed = self.commit(|cart| Ok(cart.remove_promo()))?;

        debug!(session = %self.id, code = ?removed, "removed promo code");

        Ok(removed)
    }

    /// Select one of the catalog's enabled payment methods.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the method is unknown or disabled, or the cart cannot be
    /// saved.
    pub fn select_payment_method(&mut self, id: &PaymentMethodId) -> Result<(), SessionError> {
        let methods = self.catalog.payment_methods();

        self.commit(|cart| cart.select_payment_method(id, methods))?;

        info!(session = %self.id, method = %id, "selected payment method");

        Ok(())
    }

    /// Price the cart as of `today`.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the cart could not be priced.
    pub fn breakdown(&self, today: Date) -> Result<PriceBreakdown, SessionError> {
        let breakdown = price_cart(&self.cart, self.catalog, today)?;

        if let Some(rejection) = breakdown.promo_rejection() {
            debug!(session = %self.id, %rejection, "stored promo code does not apply");
        }

        Ok(breakdown)
    }

    /// Place an order for the cart and empty it.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Order`]: the cart is empty, has no usable payment method, or could not
    ///   be priced.
    /// - [`SessionError::Storage`]: the emptied cart could not be saved.
    pub fn place_order(&mut self, today: Date) -> Result<Order, SessionError> {
        let order = Order::place(
            self.id.clone(),
            &self.cart,
            self.catalog,
            today,
            Timestamp::now(),
        )?;

        self.commit(|cart| {
            cart.clear();

            Ok(())
        })?;

        info!(
            session = %self.id,
            order = %order.id(),
            total = %order.breakdown().total(),
            "placed order"
        );

        Ok(order)
    }

    /// Forget the stored cart and start over with an empty one.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the stored cart could not be removed.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        self.store.remove(&self.id)?;
        self.cart = CartState::new(self.catalog.currency());

        info!(session = %self.id, "discarded cart");

        Ok(())
    }

    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut CartState) -> Result<T, CartError>,
    ) -> Result<T, SessionError> {
        let mut next = self.cart.clone();
        let out = change(&mut next)?;

        self.store.save(&self.id, &next)?;
        self.cart = next;

        Ok(out)
    }
}
