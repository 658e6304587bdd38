//! Receipt

use std::io;

use rusty_money::Money;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartState, items::LineItem, money::zero, orders::Order, payments::PaymentMethod,
    pricing::PriceBreakdown,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A line total does not fit in minor units.
    #[error("line total for {0} overflowed")]
    LineOverflow(String),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A printable summary of a priced cart.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'a> {
    cart: &'a CartState,
    breakdown: &'a PriceBreakdown,
    payment_method: Option<&'a PaymentMethod>,
}

impl<'a> Receipt<'a> {
    /// Receipt for a cart and its price breakdown.
    pub fn new(cart: &'a CartState, breakdown: &'a PriceBreakdown) -> Self {
        Self {
            cart,
            breakdown,
            payment_method: None,
        }
    }

    /// Receipt for a placed order.
    pub fn for_order(order: &'a Order) -> Self {
        Self::new(order.cart(), order.breakdown())
    }

    /// Name the payment method next to its fee.
    #[must_use]
    pub fn with_payment_method(mut self, method: Option<&'a PaymentMethod>) -> Self {
        self.payment_method = method;
        self
    }

    /// Write the receipt as a table of lines followed by the price summary.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line total overflows or writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.cart.is_empty() {
            writeln!(out, "\n  Cart is empty\n").map_err(|_err| ReceiptError::IO)?;
        } else {
            let mut builder = Builder::default();

            builder.push_record(["", "Item", "Variant", "Qty", "Unit Price", "Line Total"]);

            for (idx, line) in self.cart.iter().enumerate() {
                push_line_row(&mut builder, idx, line)?;
            }

            write_receipt_table(&mut out, builder)?;
        }

        write_receipt_summary(&mut out, self)
    }
}

fn push_line_row(builder: &mut Builder, idx: usize, line: &LineItem) -> Result<(), ReceiptError> {
    let line_total = line
        .line_total_minor()
        .ok_or_else(|| ReceiptError::LineOverflow(line.product().to_string()))?;

    builder.push_record([
        format!("#{}", idx + 1),
        line.name().to_string(),
        line.key().variant_label(),
        line.quantity().to_string(),
        line.unit_price().to_string(),
        Money::from_minor(line_total, line.unit_price().currency()).to_string(),
    ]);

    Ok(())
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());
    table.modify(Columns::first(), Color::new(DARK_GREY, RESET));

    let table_str = dim_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let breakdown = receipt.breakdown;

    let mut lines = vec![(
        " Subtotal:".to_string(),
        format!("{}  ", breakdown.subtotal()),
    )];

    let shipping = if receipt.cart.is_empty() {
        format!(
            "({}) {}  ",
            breakdown.shipping(),
            zero(breakdown.subtotal().currency())
        )
    } else if breakdown.has_free_shipping() {
        "Free  ".to_string()
    } else {
        format!("{}  ", breakdown.shipping())
    };

    lines.push((" Shipping:".to_string(), shipping));

    if let Some(method) = receipt.payment_method {
        lines.push((
            format!(" Payment fee ({}):", method.name()),
            format!("{}  ", breakdown.fee()),
        ));
    } else if !breakdown.fee().is_zero() {
        lines.push((
            " Payment fee:".to_string(),
            format!("{}  ", breakdown.fee()),
        ));
    }

    if let Some(promo) = breakdown.promo() {
        lines.push((
            format!(" Discount ({}):", promo.code),
            format!("\x1b[32m-{}\x1b[0m  ", promo.discount),
        ));
    }

    lines.push((
        " \x1b[1mTotal:\x1b[0m".to_string(),
        format!("\x1b[1m{}\x1b[0m  ", breakdown.total()),
    ));

    let label_width = lines
        .iter()
        .map(|(label, _)| printed_width(label))
        .max()
        .unwrap_or_default();

    let value_width = lines
        .iter()
        .map(|(_, value)| printed_width(value))
        .max()
        .unwrap_or_default();

    for line in &lines {
        write_summary_line(out, line, label_width, value_width)?;
    }

    if let Some(rejection) = breakdown.promo_rejection() {
        writeln!(out, "\n \x1b[33mPromo code not applied: {rejection}\x1b[0m")
            .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

const DARK_GREY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

/// Dims every run of box-drawing characters in a rendered table.
fn dim_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut dimmed = false;

    for ch in table.chars() {
        let border = ('\u{2500}'..='\u{257F}').contains(&ch);

        if border != dimmed {
            out.push_str(if border { DARK_GREY } else { RESET });
            dimmed = border;
        }

        out.push(ch);
    }

    if dimmed {
        out.push_str(RESET);
    }

    out
}

/// Printed width of `text`, not counting ANSI escape sequences.
fn printed_width(text: &str) -> usize {
    text.split('\x1b')
        .enumerate()
        .map(|(idx, segment)| {
            if idx == 0 {
                segment.chars().count()
            } else {
                // An escape sequence ends at its first letter.
                segment
                    .chars()
                    .skip_while(|ch| !ch.is_ascii_alphabetic())
                    .skip(1)
                    .count()
            }
        })
        .sum()
}

fn write_summary_line(
    out: &mut impl io::Write,
    (label, value): &(String, String),
    label_width: usize,
    value_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = " ".repeat(label_width.saturating_sub(printed_width(label)));
    let value_pad = " ".repeat(value_width.saturating_sub(printed_width(value)));

    writeln!(out, "{label_pad}{label}  {value_pad}{value}").map_err(|_err| ReceiptError::IO)
}
