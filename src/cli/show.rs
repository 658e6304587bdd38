use std::io::Write;

use jiff::civil::Date;
use trolley::receipt::Receipt;

use super::{Session, write_line};

pub(crate) fn show(
    session: &Session<'_>,
    today: Date,
    out: &mut impl Write,
) -> Result<(), String> {
    let breakdown = session
        .breakdown(today)
        .map_err(|error| format!("failed to price cart: {error}"))?;

    let method = session
        .cart()
        .payment_method()
        .and_then(|id| session.catalog().payment_method(id));

    Receipt::new(session.cart(), &breakdown)
        .with_payment_method(method)
        .write_to(out)
        .map_err(|error| format!("failed to write receipt: {error}"))
}

pub(crate) fn checkout(
    session: &mut Session<'_>,
    today: Date,
    out: &mut impl Write,
) -> Result<(), String> {
    let order = session
        .place_order(today)
        .map_err(|error| format!("failed to place order: {error}"))?;

    let method = order
        .payment_method()
        .and_then(|id| session.catalog().payment_method(id));

    write_line(out, &format!("Order {} placed at {}", order.id(), order.placed_at()))?;

    Receipt::for_order(&order)
        .with_payment_method(method)
        .write_to(out)
        .map_err(|error| format!("failed to write receipt: {error}"))
}
