use std::io::Write;

use clap::{Args, Subcommand};
use jiff::civil::Date;

use super::{Session, write_line};

#[derive(Debug, Args)]
pub(crate) struct PromoCommand {
    #[command(subcommand)]
    command: PromoSubcommand,
}

#[derive(Debug, Subcommand)]
enum PromoSubcommand {
    /// Apply a promo code, replacing any applied code
    Apply {
        /// Code to apply (case-insensitive)
        code: String,
    },

    /// Remove the applied promo code
    Remove,
}

pub(crate) fn run(
    command: PromoCommand,
    session: &mut Session<'_>,
    today: Date,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        PromoSubcommand::Apply { code } => {
            let applied = session
                .apply_promo(&code, today)
                .map_err(|error| format!("promo code not applied: {error}"))?;

            write_line(
                out,
                &format!("{} applied: -{}", applied.code, applied.discount),
            )
        }
        PromoSubcommand::Remove => {
            let removed = session
                .remove_promo()
                .map_err(|error| format!("failed to remove promo code: {error}"))?;

            match removed {
                Some(code) => write_line(out, &format!("{code} removed")),
                None => write_line(out, "No promo code applied"),
            }
        }
    }
}
