//! Command-line configuration

use std::path::PathBuf;

use clap::Args;
use jiff::{Zoned, civil::Date};
use trolley::{
    catalog::{Catalog, CatalogError},
    storage::{FileCartStore, SessionId},
};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Where the cart lives and what it is priced against.
#[derive(Debug, Args)]
pub(crate) struct SessionConfig {
    /// Session whose cart to operate on
    #[arg(long, env = "CART_SESSION", default_value = "default", global = true)]
    pub session: SessionId,

    /// Directory carts are stored in
    #[arg(long, env = "CART_STORE_DIR", default_value = ".carts", global = true)]
    pub store_dir: PathBuf,

    /// Catalog YAML file; the bundled storefront catalog when omitted
    #[arg(long, env = "CART_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Date promo code expiry is checked against; the local date when omitted
    #[arg(long, env = "CART_TODAY", global = true)]
    pub today: Option<Date>,
}

impl SessionConfig {
    /// Load the configured catalog.
    pub(crate) fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog {
            Some(path) => Catalog::load(path),
            None => Catalog::storefront(),
        }
    }

    /// The cart store for the configured directory.
    pub(crate) fn store(&self) -> FileCartStore {
        FileCartStore::new(self.store_dir.clone())
    }

    /// The pricing date.
    pub(crate) fn today(&self) -> Date {
        self.today.unwrap_or_else(|| Zoned::now().date())
    }
}
