//! Promo code catalog

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::{
    catalog::CatalogError,
    money::percent_fraction,
    promotions::{DiscountKind, PromoCode},
};

/// The promo codes a storefront accepts, indexed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct PromoCatalog {
    codes: Vec<PromoCode>,
    index: FxHashMap<String, usize>,
}

impl PromoCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from promo code definitions.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if a definition is invalid or two codes only differ by case.
    pub fn from_codes(codes: impl IntoIterator<Item = PromoCode>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();

        for promo in codes {
            catalog.insert(promo)?;
        }

        Ok(catalog)
    }

    /// Add a promo code.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidPromoCode`]: the code is blank, the percentage is outside
    ///   0-100%, or an amount is negative.
    /// - [`CatalogError::DuplicatePromoCode`]: a code with the same key already exists.
    pub fn insert(&mut self, promo: PromoCode) -> Result<(), CatalogError> {
        validate(&promo)?;

        let key = normalize(promo.code());

        if self.index.contains_key(&key) {
            return Err(CatalogError::DuplicatePromoCode(promo.code().to_string()));
        }

        self.index.insert(key, self.codes.len());
        self.codes.push(promo);

        Ok(())
    }

    /// Look up a code, ignoring case and surrounding whitespace.
    pub fn get(&self, code: &str) -> Option<&PromoCode> {
        self.index
            .get(&normalize(code))
            .and_then(|idx| self.codes.get(*idx))
    }

    /// Iterate over the codes in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &PromoCode> {
        self.codes.iter()
    }

    /// Number of codes in the catalog.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the catalog has no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

fn validate(promo: &PromoCode) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidPromoCode {
        code: promo.code().to_string(),
        reason: reason.to_string(),
    };

    if promo.code().trim().is_empty() {
        return Err(invalid("code is blank"));
    }

    match promo.discount() {
        DiscountKind::Percentage(percent) => {
            let fraction = percent_fraction(percent);

            if fraction < Decimal::ZERO || fraction > Decimal::ONE {
                return Err(invalid("percentage must be between 0% and 100%"));
            }
        }
        DiscountKind::Fixed(amount) => {
            if amount.to_minor_units() < 0 {
                return Err(invalid("fixed discount must not be negative"));
            }
        }
    }

    if promo
        .minimum_purchase()
        .is_some_and(|minimum| minimum.to_minor_units() < 0)
    {
        return Err(invalid("minimum purchase must not be negative"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::{Money, iso::USD};

    use super::*;

    fn percent(value: i64) -> DiscountKind {
        DiscountKind::Percentage(Percentage::from(Decimal::new(value, 2)))
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() -> Result<(), CatalogError> {
        let catalog = PromoCatalog::from_codes([PromoCode::new("Welcome10", percent(10))])?;

        assert!(catalog.get("WELCOME10").is_some());
        assert!(catalog.get("  welcome10 ").is_some());
        assert!(catalog.get("welcome").is_none());

        Ok(())
    }

    #[test]
    fn duplicate_codes_differing_by_case_are_rejected() {
        let result = PromoCatalog::from_codes([
            PromoCode::new("SAVE", percent(5)),
            PromoCode::new("save", percent(10)),
        ]);

        assert!(matches!(
            result,
            Err(CatalogError::DuplicatePromoCode(code)) if code == "save"
        ));
    }

    #[test]
    fn percentage_over_one_hundred_is_rejected() {
        let result = PromoCatalog::from_codes([PromoCode::new("HUGE", percent(150))]);

        assert!(matches!(
            result,
            Err(CatalogError::InvalidPromoCode { code, .. }) if code == "HUGE"
        ));
    }

    #[test]
    fn negative_fixed_discount_is_rejected() {
        let result = PromoCatalog::from_codes([PromoCode::new(
            "BACKWARDS",
            DiscountKind::Fixed(Money::from_minor(-100, USD)),
        )]);

        assert!(matches!(result, Err(CatalogError::InvalidPromoCode { .. })));
    }

    #[test]
    fn blank_code_is_rejected() {
        let result = PromoCatalog::from_codes([PromoCode::new("  ", percent(5))]);

        assert!(matches!(result, Err(CatalogError::InvalidPromoCode { .. })));
    }

    #[test]
    fn iter_keeps_definition_order() -> Result<(), CatalogError> {
        let catalog = PromoCatalog::from_codes([
            PromoCode::new("B", percent(5)),
            PromoCode::new("A", percent(5)),
        ])?;

        let codes: Vec<&str> = catalog.iter().map(PromoCode::code).collect();

        assert_eq!(codes, ["B", "A"]);
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());

        Ok(())
    }
}
