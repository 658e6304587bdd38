use std::io::Write;

use clap::{Args, Parser, Subcommand};
use trolley::{items::LineItemKey, session::CheckoutSession, storage::FileCartStore};

use crate::config::{LoggingConfig, SessionConfig};

mod items;
mod payment;
mod promo;
mod show;

#[derive(Debug, Parser)]
#[command(name = "trolley", about = "Cart pricing and checkout", long_about = None)]
pub(crate) struct Cli {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Session, storage and catalog settings.
    #[command(flatten)]
    pub session: SessionConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a product to the cart
    Add(items::AddArgs),

    /// Set a line's quantity
    Set(items::SetArgs),

    /// Change a line's quantity by a signed amount
    Adjust(items::AdjustArgs),

    /// Remove a line from the cart
    Remove(items::RemoveArgs),

    /// Empty the cart
    Clear,

    /// Apply or remove a promo code
    Promo(promo::PromoCommand),

    /// Select a payment method
    Pay(payment::PayArgs),

    /// List the payment methods on offer
    Methods,

    /// Print the cart and its price breakdown
    Show,

    /// Place an order for the cart
    Checkout,
}

/// Product and variant selecting a cart line.
#[derive(Debug, Args)]
struct ItemKeyArgs {
    /// Product identifier
    product: String,

    /// Size variant
    #[arg(long)]
    size: Option<String>,

    /// Color variant
    #[arg(long)]
    color: Option<String>,
}

impl ItemKeyArgs {
    fn key(&self) -> LineItemKey {
        let mut key = LineItemKey::product(self.product.as_str());

        if let Some(size) = &self.size {
            key = key.with_size(size.as_str());
        }

        if let Some(color) = &self.color {
            key = key.with_color(color.as_str());
        }

        key
    }
}

impl Cli {
    /// Load configuration from `.env`, environment and CLI arguments
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) fn run(self, out: &mut impl Write) -> Result<(), String> {
        let catalog = self
            .session
            .load_catalog()
            .map_err(|error| format!("failed to load catalog: {error}"))?;

        let today = self.session.today();

        let mut session = CheckoutSession::open(
            self.session.session.clone(),
            self.session.store(),
            &catalog,
        )
        .map_err(|error| format!("failed to open session: {error}"))?;

        match self.command {
            Commands::Add(args) => items::add(args, &mut session, out),
            Commands::Set(args) => items::set(&args, &mut session, out),
            Commands::Adjust(args) => items::adjust(&args, &mut session, out),
            Commands::Remove(args) => items::remove(&args, &mut session, out),
            Commands::Clear => items::clear(&mut session, out),
            Commands::Promo(command) => promo::run(command, &mut session, today, out),
            Commands::Pay(args) => payment::pay(&args, &mut session, out),
            Commands::Methods => payment::methods(&session, out),
            Commands::Show => show::show(&session, today, out),
            Commands::Checkout => show::checkout(&mut session, today, out),
        }
    }
}

type Session<'c> = CheckoutSession<'c, FileCartStore>;

fn write_line(out: &mut impl Write, line: &str) -> Result<(), String> {
    writeln!(out, "{line}").map_err(|error| format!("failed to write output: {error}"))
}
