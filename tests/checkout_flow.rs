//! End-to-end checkout against a file-backed cart store.
//!
//! A shopper fills a cart across several sessions (each one reopening the cart from disk),
//! applies and replaces promo codes, picks a payment method and places an order.

use std::num::NonZeroU32;

use jiff::civil::{Date, date};
use rusty_money::{
    Money,
    iso::{Currency, EUR, USD},
};
use testresult::TestResult;

use trolley::prelude::*;

fn usd(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, USD)
}

fn today() -> Date {
    date(2025, 6, 1)
}

fn tee(size: &str) -> LineItemKey {
    LineItemKey::product("tee").with_size(size).with_color("navy")
}

#[test]
fn cart_survives_reopening_and_checks_out() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = FileCartStore::new(dir.path());
    let catalog = Catalog::storefront()?;
    let shopper = SessionId::new("shopper-42")?;

    {
        let mut session = CheckoutSession::open(shopper.clone(), &store, &catalog)?;

        session.add_item(
            LineItem::new(tee("M"), "Logo Tee", usd(2500), NonZeroU32::MIN).with_stock(5),
        )?;
        session.add_item(LineItem::new(
            tee("M"),
            "Logo Tee",
            usd(2500),
            NonZeroU32::new(2).ok_or("quantity")?,
        ))?;
        session.add_item(LineItem::new(
            tee("L"),
            "Logo Tee",
            usd(2500),
            NonZeroU32::MIN,
        ))?;

        assert_eq!(session.cart().len(), 2, "variants stay on separate lines");
        assert_eq!(session.cart().unit_count(), 4);
    }

    let mut session = CheckoutSession::open(shopper.clone(), &store, &catalog)?;

    assert_eq!(session.cart().unit_count(), 4);
    assert_eq!(
        session.cart().get_item(&tee("M")).map(|line| line.quantity().get()),
        Some(3)
    );

    let applied = session.apply_promo("welcome10", today())?;
    assert_eq!(applied.discount, usd(1000));

    let replaced = session.apply_promo("FREESHIP", today())?;
    assert_eq!(replaced.code, "FREESHIP");
    assert_eq!(session.cart().promo_code(), Some("FREESHIP"));

    assert!(matches!(
        session.select_payment_method(&PaymentMethodId::new("bank-transfer")),
        Err(SessionError::Cart(CartError::PaymentMethodUnavailable(_)))
    ));
    session.select_payment_method(&PaymentMethodId::new("cash-on-delivery"))?;

    let breakdown = session.breakdown(today())?;
    assert_eq!(breakdown.subtotal(), usd(10_000));
    assert_eq!(breakdown.shipping(), usd(1000));
    assert_eq!(breakdown.fee(), usd(500));
    assert_eq!(breakdown.discount(), usd(1000));
    assert_eq!(breakdown.total(), usd(10_500));

    let order = session.place_order(today())?;

    assert_eq!(order.breakdown(), &breakdown);
    assert_eq!(order.lines().len(), 2);
    assert_eq!(order.promo_code(), Some("FREESHIP"));
    assert!(session.cart().is_empty());

    let reopened = CheckoutSession::open(shopper, &store, &catalog)?;
    assert!(reopened.cart().is_empty());
    assert_eq!(reopened.cart().promo_code(), None);

    Ok(())
}

#[test]
fn stock_limits_and_quantity_rules_are_enforced() -> TestResult {
    let store = MemoryCartStore::new();
    let catalog = Catalog::storefront()?;
    let mut session = CheckoutSession::open(SessionId::new("limits")?, &store, &catalog)?;

    session.add_item(
        LineItem::new(tee("S"), "Logo Tee", usd(2500), NonZeroU32::MIN).with_stock(2),
    )?;

    assert!(matches!(
        session.set_quantity(&tee("S"), 3),
        Err(SessionError::Cart(CartError::InsufficientStock { .. }))
    ));
    assert!(matches!(
        session.set_quantity(&tee("S"), 0),
        Err(SessionError::Cart(CartError::InvalidQuantity(0)))
    ));

    assert_eq!(session.adjust_quantity(&tee("S"), 1)?, Some(2));
    assert_eq!(session.adjust_quantity(&tee("S"), -5)?, None);
    assert!(session.cart().is_empty());

    Ok(())
}

#[test]
fn other_catalogs_price_in_their_own_currency() -> TestResult {
    let catalog = Catalog::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/fixtures/catalogs/outlet.yml"
    ))?;
    let store = MemoryCartStore::new();
    let mut session = CheckoutSession::open(SessionId::new("outlet")?, &store, &catalog)?;

    let priced_in_usd = LineItem::new(tee("M"), "Logo Tee", usd(2500), NonZeroU32::MIN);

    assert!(matches!(
        session.add_item(priced_in_usd),
        Err(SessionError::Cart(CartError::CurrencyMismatch("USD", "EUR")))
    ));

    session.add_item(LineItem::new(
        tee("M"),
        "Logo Tee",
        Money::from_minor(2000, EUR),
        NonZeroU32::MIN,
    ))?;
    session.apply_promo("outlet5", today())?;

    let breakdown = session.breakdown(today())?;

    assert_eq!(breakdown.shipping(), Money::from_minor(495, EUR));
    assert_eq!(breakdown.total(), Money::from_minor(1995, EUR));

    Ok(())
}

#[test]
fn receipt_renders_placed_order() -> TestResult {
    let store = MemoryCartStore::new();
    let catalog = Catalog::storefront()?;
    let mut session = CheckoutSession::open(SessionId::new("receipt")?, &store, &catalog)?;

    session.add_item(LineItem::new(
        tee("M"),
        "Logo Tee",
        usd(2500),
        NonZeroU32::MIN,
    ))?;
    session.select_payment_method(&PaymentMethodId::new("credit-card"))?;

    let order = session.place_order(today())?;

    let mut out = Vec::new();
    Receipt::for_order(&order).write_to(&mut out)?;
    let text = String::from_utf8(out)?;

    assert!(text.contains("Logo Tee"));
    assert!(text.contains("M / navy"));
    assert!(text.contains("$35.00"));

    Ok(())
}
