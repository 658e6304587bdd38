//! Checkout Example
//!
//! This example fills a cart from the bundled storefront catalog, tries a few promo codes and
//! prints the receipt for the resulting order.
//!
//! Use `--catalog` to price against another catalog file
//! Use `--promo` to choose the promo code to finish with

use std::{io, num::NonZeroU32, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use jiff::civil::date;
use rusty_money::Money;

use trolley::prelude::*;

/// Checkout Example
#[derive(Debug, Parser)]
struct Args {
    /// Catalog YAML file; the bundled storefront catalog when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Promo code applied before checkout
    #[arg(long, default_value = "SUMMER20")]
    promo: String,
}

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::storefront()?,
    };

    let currency = catalog.currency();
    let unit = 10_i64.pow(currency.exponent);
    let today = date(2025, 6, 1);

    let store = MemoryCartStore::new();
    let mut session = CheckoutSession::open(SessionId::new("demo")?, &store, &catalog)?;

    session.add_item(LineItem::new(
        LineItemKey::product("tee").with_size("M").with_color("navy"),
        "Logo Tee",
        Money::from_minor(25 * unit, currency),
        NonZeroU32::new(2).unwrap_or(NonZeroU32::MIN),
    ))?;

    session.add_item(LineItem::new(
        LineItemKey::product("jacket").with_size("L"),
        "Rain Jacket",
        Money::from_minor(60 * unit, currency),
        NonZeroU32::MIN,
    ))?;

    for code in ["BOGUS", "flash25", args.promo.as_str()] {
        match session.apply_promo(code, today) {
            Ok(applied) => println!("{code}: {} off", applied.discount),
            Err(error) => println!("{code}: {error}"),
        }
    }

    if let Some(method) = catalog.enabled_payment_methods().next() {
        session.select_payment_method(method.id())?;
    }

    let order = session.place_order(today)?;
    let method = order
        .payment_method()
        .and_then(|id| catalog.payment_method(id));

    println!("\nOrder {}", order.id());

    Receipt::for_order(&order)
        .with_payment_method(method)
        .write_to(io::stdout())?;

    Ok(())
}
