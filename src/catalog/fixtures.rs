//! Catalog Fixtures
//!
//! The YAML shape of a catalog and its conversion into domain types.

use jiff::civil::Date;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    catalog::CatalogError,
    money::{parse_percentage, parse_price, zero},
    payments::PaymentMethod,
    pricing::ShippingPolicy,
    promotions::{DiscountKind, PromoCode},
};

/// Top-level catalog document
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// ISO currency code every amount must use (e.g., "USD")
    pub currency: String,

    /// Shipping policy; the standard 100/10 policy when omitted
    #[serde(default)]
    pub shipping: Option<ShippingFixture>,

    /// Payment methods in display order
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethodFixture>,

    /// Promo codes in definition order
    #[serde(default)]
    pub promo_codes: Vec<PromoCodeFixture>,
}

/// Shipping policy from YAML
#[derive(Debug, Deserialize)]
pub struct ShippingFixture {
    /// Subtotals above this ship free (e.g., "100.00 USD")
    pub free_threshold: String,

    /// Shipping charged otherwise (e.g., "10.00 USD")
    pub flat_rate: String,
}

/// Payment method from YAML
#[derive(Debug, Deserialize)]
pub struct PaymentMethodFixture {
    /// Identifier shoppers select by
    pub id: String,

    /// Display name
    pub name: String,

    /// Whether the method is selectable
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Flat fee (e.g., "2.50 USD"); zero when omitted
    #[serde(default)]
    pub fee: Option<String>,
}

/// Promo code from YAML
#[derive(Debug, Deserialize)]
pub struct PromoCodeFixture {
    /// Code shoppers type
    pub code: String,

    /// Discount configuration
    pub discount: DiscountFixture,

    /// Minimum subtotal (e.g., "100.00 USD")
    #[serde(default)]
    pub minimum_purchase: Option<String>,

    /// Last valid day (e.g., "2024-12-31")
    #[serde(default)]
    pub valid_until: Option<Date>,

    /// Shopper-facing description
    #[serde(default)]
    pub description: Option<String>,
}

/// Discount configuration from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountFixture {
    /// Percentage off the subtotal (e.g., "10%" or "0.10")
    Percentage {
        /// Percentage string
        value: String,
    },

    /// Fixed amount off (e.g., "10.00 USD")
    Fixed {
        /// Price string
        value: String,
    },
}

fn enabled_by_default() -> bool {
    true
}

impl ShippingFixture {
    /// Convert to a [`ShippingPolicy`] in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed or in another currency.
    pub fn try_into_policy(
        self,
        currency: &'static Currency,
    ) -> Result<ShippingPolicy, CatalogError> {
        Ok(ShippingPolicy::new(
            parse_in(&self.free_threshold, currency)?,
            parse_in(&self.flat_rate, currency)?,
        ))
    }
}

impl PaymentMethodFixture {
    /// Convert to a [`PaymentMethod`] in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fee is malformed or in another currency.
    pub fn try_into_method(
        self,
        currency: &'static Currency,
    ) -> Result<PaymentMethod, CatalogError> {
        let fee = match self.fee {
            Some(fee) => parse_in(&fee, currency)?,
            None => zero(currency),
        };

        Ok(PaymentMethod::new(
            self.id.as_str(),
            self.name,
            self.enabled,
            fee,
        ))
    }
}

impl PromoCodeFixture {
    /// Convert to a [`PromoCode`] in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount or percentage is malformed or in another currency.
    pub fn try_into_promo(self, currency: &'static Currency) -> Result<PromoCode, CatalogError> {
        let discount = match self.discount {
            DiscountFixture::Percentage { value } => {
                DiscountKind::Percentage(parse_percentage(&value)?)
            }
            DiscountFixture::Fixed { value } => DiscountKind::Fixed(parse_in(&value, currency)?),
        };

        let mut promo = PromoCode::new(self.code, discount);

        if let Some(minimum) = self.minimum_purchase {
            promo = promo.with_minimum_purchase(parse_in(&minimum, currency)?);
        }

        if let Some(valid_until) = self.valid_until {
            promo = promo.valid_until(valid_until);
        }

        if let Some(description) = self.description {
            promo = promo.with_description(description);
        }

        Ok(promo)
    }
}

/// Parse a price and check it is in the catalog currency.
fn parse_in(
    value: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, CatalogError> {
    let money = parse_price(value)?;

    if money.currency() != currency {
        return Err(CatalogError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            money.currency().iso_alpha_code.to_string(),
        ));
    }

    Ok(money)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::iso::{EUR, USD};

    use super::*;

    #[test]
    fn promo_fixture_parses_percentage_with_constraints() -> Result<(), CatalogError> {
        let yaml = r#"
code: SUMMER20
minimum_purchase: "100.00 USD"
valid_until: "2030-08-31"
discount:
  type: percentage
  value: "20%"
"#;
        let fixture: PromoCodeFixture = serde_norway::from_str(yaml)?;
        let promo = fixture.try_into_promo(USD)?;

        assert_eq!(promo.code(), "SUMMER20");
        assert_eq!(promo.discount().label(), "20%");
        assert_eq!(
            promo.minimum_purchase(),
            Some(&Money::from_minor(10_000, USD))
        );
        assert_eq!(promo.expiry(), Some(date(2030, 8, 31)));

        Ok(())
    }

    #[test]
    fn promo_fixture_parses_fixed_amount() -> Result<(), CatalogError> {
        let fixture = PromoCodeFixture {
            code: "FREESHIP".to_string(),
            discount: DiscountFixture::Fixed {
                value: "10.00 USD".to_string(),
            },
            minimum_purchase: None,
            valid_until: None,
            description: None,
        };

        let promo = fixture.try_into_promo(USD)?;

        assert!(matches!(
            promo.discount(),
            DiscountKind::Fixed(money) if money.to_minor_units() == 1000
        ));

        Ok(())
    }

    #[test]
    fn discount_fixture_rejects_unknown_type() {
        let yaml = r"
type: buy_one_get_one
value: 1
";
        let result: Result<DiscountFixture, _> = serde_norway::from_str(yaml);

        assert!(result.is_err());
    }

    #[test]
    fn amounts_must_use_catalog_currency() {
        let fixture = PaymentMethodFixture {
            id: "invoice".to_string(),
            name: "Invoice".to_string(),
            enabled: true,
            fee: Some("1.50 EUR".to_string()),
        };

        assert!(matches!(
            fixture.try_into_method(USD),
            Err(CatalogError::CurrencyMismatch(expected, found)) if expected == "USD" && found == "EUR"
        ));
    }

    #[test]
    fn payment_method_defaults_to_enabled_and_free() -> Result<(), CatalogError> {
        let fixture: PaymentMethodFixture = serde_norway::from_str("id: card\nname: Card\n")?;
        let method = fixture.try_into_method(EUR)?;

        assert!(method.is_enabled());
        assert_eq!(method.fee(), Money::from_minor(0, EUR));

        Ok(())
    }
}
