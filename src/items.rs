//! Items

use std::{fmt, num::NonZeroU32};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::money::serde_price;

/// Product identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identity of a line item for merge purposes: the same product in the same variant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItemKey {
    /// Product identifier
    pub product: ProductId,

    /// Selected size, if the product comes in sizes
    pub size: Option<String>,

    /// Selected color, if the product comes in colors
    pub color: Option<String>,
}

impl LineItemKey {
    /// Key for a product with no variant selected.
    pub fn product(product: impl Into<ProductId>) -> Self {
        Self {
            product: product.into(),
            size: None,
            color: None,
        }
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Set the color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Human readable variant label, e.g. `"M / Black"`.
    pub fn variant_label(&self) -> String {
        match (&self.size, &self.color) {
            (Some(size), Some(color)) => format!("{size} / {color}"),
            (Some(size), None) => size.clone(),
            (None, Some(color)) => color.clone(),
            (None, None) => String::new(),
        }
    }
}

/// One product/size/color/quantity entry in a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(flatten)]
    key: LineItemKey,

    name: String,

    #[serde(with = "serde_price")]
    unit_price: Money<'static, Currency>,

    quantity: NonZeroU32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    stock: Option<u32>,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(
        key: LineItemKey,
        name: impl Into<String>,
        unit_price: Money<'static, Currency>,
        quantity: NonZeroU32,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            unit_price,
            quantity,
            stock: None,
        }
    }

    /// Limit the quantity that may be held in a cart to the available stock.
    #[must_use]
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Returns the merge identity of the item
    pub fn key(&self) -> &LineItemKey {
        &self.key
    }

    /// Returns the product identifier
    pub fn product(&self) -> &ProductId {
        &self.key.product
    }

    /// Returns the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> NonZeroU32 {
        self.quantity
    }

    /// Returns the known stock limit, if any.
    pub fn stock(&self) -> Option<u32> {
        self.stock
    }

    /// Unit price times quantity, in minor units.
    ///
    /// Returns `None` on overflow.
    pub fn line_total_minor(&self) -> Option<i64> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity.get()))
    }

    pub(crate) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_stock(&mut self, stock: Option<u32>) {
        self.stock = stock;
    }
}
