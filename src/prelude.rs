//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartError, CartState},
    catalog::{Catalog, CatalogError},
    items::{LineItem, LineItemKey, ProductId},
    money::{AmountError, format_price, parse_price},
    orders::{Order, OrderError, OrderId},
    payments::{PaymentMethod, PaymentMethodId, compute_payment_fee},
    pricing::{
        AppliedPromo, PriceBreakdown, PricingError, ShippingPolicy, compute_shipping,
        compute_subtotal, compute_total, price_cart,
    },
    promotions::{
        DiscountKind, PromoCatalog, PromoCode, PromoError, compute_discount, resolve_promo_code,
    },
    receipt::{Receipt, ReceiptError},
    session::{CheckoutSession, SessionError},
    storage::{CartStore, FileCartStore, MemoryCartStore, SessionId, StorageError},
};
