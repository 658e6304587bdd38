//! Catalog
//!
//! Externally configured business rules: the payment methods a storefront offers, the promo codes
//! it accepts and its shipping policy. Catalogs are authored as YAML fixtures and validated when
//! loaded, so pricing never has to second-guess them.

use std::{fs, path::Path};

use rusty_money::iso::Currency;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    catalog::fixtures::CatalogFixture,
    money::{AmountError, find_currency},
    payments::{PaymentMethod, PaymentMethodId, find_enabled},
    pricing::ShippingPolicy,
    promotions::{DiscountKind, PromoCatalog, PromoCode},
};

pub mod fixtures;

const STOREFRONT_CATALOG_YAML: &str = include_str!("../../fixtures/catalogs/storefront.yml");

/// Catalog loading and validation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Malformed price, percentage or currency
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// An amount is not in the catalog currency (expected, found)
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Two promo codes only differ by case
    #[error("Duplicate promo code: {0}")]
    DuplicatePromoCode(String),

    /// A promo code definition is unusable
    #[error("Invalid promo code {code}: {reason}")]
    InvalidPromoCode {
        /// Offending code
        code: String,

        /// What is wrong with it
        reason: String,
    },

    /// Two payment methods share an identifier
    #[error("Duplicate payment method: {0}")]
    DuplicatePaymentMethod(String),

    /// A payment method definition is unusable
    #[error("Invalid payment method {id}: {reason}")]
    InvalidPaymentMethod {
        /// Offending identifier
        id: String,

        /// What is wrong with it
        reason: String,
    },

    /// The shipping policy is unusable
    #[error("Invalid shipping policy: {0}")]
    InvalidShipping(String),
}

/// Payment methods, promo codes and shipping policy for one storefront.
#[derive(Debug, Clone)]
pub struct Catalog {
    currency: &'static Currency,
    shipping: ShippingPolicy,
    payment_methods: Vec<PaymentMethod>,
    promo_codes: PromoCatalog,
}

impl Catalog {
    /// Build a catalog, validating every definition.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if an amount is in another currency, a shipping amount or fee is
    /// negative, a payment method id repeats, or a promo code is invalid or duplicated.
    pub fn new(
        currency: &'static Currency,
        shipping: ShippingPolicy,
        payment_methods: Vec<PaymentMethod>,
        promo_codes: impl IntoIterator<Item = PromoCode>,
    ) -> Result<Self, CatalogError> {
        ensure_currency(shipping.free_threshold().currency(), currency)?;
        ensure_currency(shipping.flat_rate().currency(), currency)?;

        if shipping.free_threshold().is_negative() || shipping.flat_rate().is_negative() {
            return Err(CatalogError::InvalidShipping(
                "shipping amounts must not be negative".to_string(),
            ));
        }

        let mut seen = FxHashSet::default();

        for method in &payment_methods {
            ensure_currency(method.fee().currency(), currency)?;

            if method.fee().to_minor_units() < 0 {
                return Err(CatalogError::InvalidPaymentMethod {
                    id: method.id().to_string(),
                    reason: "fee must not be negative".to_string(),
                });
            }

            if !seen.insert(method.id().clone()) {
                return Err(CatalogError::DuplicatePaymentMethod(method.id().to_string()));
            }
        }

        let promo_codes: Vec<PromoCode> = promo_codes.into_iter().collect();

        for promo in &promo_codes {
            if let DiscountKind::Fixed(amount) = promo.discount() {
                ensure_currency(amount.currency(), currency)?;
            }

            if let Some(minimum) = promo.minimum_purchase() {
                ensure_currency(minimum.currency(), currency)?;
            }
        }

        Ok(Self {
            currency,
            shipping,
            payment_methods,
            promo_codes: PromoCatalog::from_codes(promo_codes)?,
        })
    }

    /// Parse a catalog from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or the catalog is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

        Self::try_from(fixture)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the catalog is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// The storefront catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled fixture is invalid.
    pub fn storefront() -> Result<Self, CatalogError> {
        Self::from_yaml_str(STOREFRONT_CATALOG_YAML)
    }

    /// Currency every amount in the catalog uses
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Shipping policy
    pub fn shipping(&self) -> &ShippingPolicy {
        &self.shipping
    }

    /// All payment methods, including disabled ones, in display order
    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    /// Payment methods shoppers may select
    pub fn enabled_payment_methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.payment_methods
            .iter()
            .filter(|method| method.is_enabled())
    }

    /// Look up an enabled payment method.
    pub fn payment_method(&self, id: &PaymentMethodId) -> Option<&PaymentMethod> {
        find_enabled(id, &self.payment_methods)
    }

    /// Promo codes
    pub fn promo_codes(&self) -> &PromoCatalog {
        &self.promo_codes
    }
}

impl TryFrom<CatalogFixture> for Catalog {
    type Error = CatalogError;

    fn try_from(fixture: CatalogFixture) -> Result<Self, Self::Error> {
        let currency = find_currency(&fixture.currency)?;

        let shipping = match fixture.shipping {
            Some(shipping) => shipping.try_into_policy(currency)?,
            None => ShippingPolicy::standard(currency),
        };

        let payment_methods = fixture
            .payment_methods
            .into_iter()
            .map(|method| method.try_into_method(currency))
            .collect::<Result<Vec<_>, _>>()?;

        let promo_codes = fixture
            .promo_codes
            .into_iter()
            .map(|promo| promo.try_into_promo(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(currency, shipping, payment_methods, promo_codes)
    }
}

fn ensure_currency(
    found: &'static Currency,
    expected: &'static Currency,
) -> Result<(), CatalogError> {
    if found == expected {
        Ok(())
    } else {
        Err(CatalogError::CurrencyMismatch(
            expected.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        ))
    }
}
