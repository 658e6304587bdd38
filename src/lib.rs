//! Trolley
//!
//! Trolley is a shopping cart pricing, promotion and checkout engine. It prices carts of line
//! items against a catalog of payment methods, promo codes and a shipping policy, keeps each
//! shopper's cart in an injected store, and turns carts into orders.
//!
//! ```
//! use std::num::NonZeroU32;
//!
//! use jiff::civil::date;
//! use rusty_money::{Money, iso::USD};
//! use trolley::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::storefront()?;
//! let mut cart = CartState::new(USD);
//!
//! cart.add_item(LineItem::new(
//!     LineItemKey::product("tee"),
//!     "Logo Tee",
//!     Money::from_minor(2500, USD),
//!     NonZeroU32::MIN,
//! ))?;
//!
//! let breakdown = price_cart(&cart, &catalog, date(2025, 6, 1))?;
//!
//! assert_eq!(breakdown.total(), Money::from_minor(3500, USD));
//! # Ok(())
//! # }
//! ```

pub mod cart;
pub mod catalog;
pub mod items;
pub mod money;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod receipt;
pub mod session;
pub mod storage;
