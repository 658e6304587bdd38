use std::{io::Write, num::NonZeroU32};

use clap::Args;
use trolley::{items::LineItem, money::parse_price};

use super::{ItemKeyArgs, Session, write_line};

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    #[command(flatten)]
    item: ItemKeyArgs,

    /// Display name; the product identifier when omitted
    #[arg(long)]
    name: Option<String>,

    /// Unit price (e.g., "25.00 USD")
    #[arg(long)]
    price: String,

    /// Quantity to add
    #[arg(long, default_value_t = NonZeroU32::MIN)]
    quantity: NonZeroU32,

    /// Units in stock; unlimited when omitted
    #[arg(long)]
    stock: Option<u32>,
}

#[derive(Debug, Args)]
pub(crate) struct SetArgs {
    #[command(flatten)]
    item: ItemKeyArgs,

    /// New quantity
    quantity: u32,
}

#[derive(Debug, Args)]
pub(crate) struct AdjustArgs {
    #[command(flatten)]
    item: ItemKeyArgs,

    /// Signed change (e.g., 2 or -1)
    #[arg(allow_negative_numbers = true)]
    delta: i64,
}

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    #[command(flatten)]
    item: ItemKeyArgs,
}

pub(crate) fn add(
    args: AddArgs,
    session: &mut Session<'_>,
    out: &mut impl Write,
) -> Result<(), String> {
    let price = parse_price(&args.price).map_err(|error| format!("invalid price: {error}"))?;
    let key = args.item.key();
    let name = args.name.unwrap_or_else(|| args.item.product.clone());

    let mut line = LineItem::new(key.clone(), name, price, args.quantity);

    if let Some(stock) = args.stock {
        line = line.with_stock(stock);
    }

    session
        .add_item(line)
        .map_err(|error| format!("failed to add item: {error}"))?;

    let quantity = session
        .cart()
        .get_item(&key)
        .map_or(0, |line| line.quantity().get());

    write_line(out, &format!("{} x {quantity} in cart", key.product))
}

pub(crate) fn set(
    args: &SetArgs,
    session: &mut Session<'_>,
    out: &mut impl Write,
) -> Result<(), String> {
    let key = args.item.key();

    session
        .set_quantity(&key, args.quantity)
        .map_err(|error| format!("failed to set quantity: {error}"))?;

    write_line(out, &format!("{} x {} in cart", key.product, args.quantity))
}

pub(crate) fn adjust(
    args: &AdjustArgs,
    session: &mut Session<'_>,
    out: &mut impl Write,
) -> Result<(), String> {
    let key = args.item.key();

    let quantity = session
        .adjust_quantity(&key, args.delta)
        .map_err(|error| format!("failed to adjust quantity: {error}"))?;

    match quantity {
        Some(quantity) => write_line(out, &format!("{} x {quantity} in cart", key.product)),
        None => write_line(out, &format!("{} removed from cart", key.product)),
    }
}

pub(crate) fn remove(
    args: &RemoveArgs,
    session: &mut Session<'_>,
    out: &mut impl Write,
) -> Result<(), String> {
    let removed = session
        .remove_item(&args.item.key())
        .map_err(|error| format!("failed to remove item: {error}"))?;

    write_line(out, &format!("{} removed from cart", removed.name()))
}

pub(crate) fn clear(session: &mut Session<'_>, out: &mut impl Write) -> Result<(), String> {
    session
        .clear()
        .map_err(|error| format!("failed to clear cart: {error}"))?;

    write_line(out, "Cart cleared")
}
