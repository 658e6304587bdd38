use std::io::Write;

use clap::Args;
use tabled::{builder::Builder, settings::Style};
use trolley::payments::PaymentMethodId;

use super::{Session, write_line};

#[derive(Debug, Args)]
pub(crate) struct PayArgs {
    /// Payment method identifier (see `methods`)
    method: String,
}

pub(crate) fn pay(
    args: &PayArgs,
    session: &mut Session<'_>,
    out: &mut impl Write,
) -> Result<(), String> {
    let id = PaymentMethodId::new(args.method.as_str());

    session
        .select_payment_method(&id)
        .map_err(|error| format!("failed to select payment method: {error}"))?;

    let name = session
        .catalog()
        .payment_method(&id)
        .map_or(args.method.as_str(), |method| method.name());

    write_line(out, &format!("Paying with {name}"))
}

pub(crate) fn methods(session: &Session<'_>, out: &mut impl Write) -> Result<(), String> {
    let selected = session.cart().payment_method();
    let mut builder = Builder::default();

    builder.push_record(["", "Method", "Name", "Fee"]);

    for method in session.catalog().enabled_payment_methods() {
        let marker = if selected == Some(method.id()) { "*" } else { "" };

        builder.push_record([
            marker.to_string(),
            method.id().to_string(),
            method.name().to_string(),
            method.fee().to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());

    write_line(out, &table.to_string())
}
