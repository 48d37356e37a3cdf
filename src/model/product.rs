//! Product records reported by the store service.
//!
//! See [`Product::localized_price`] and [`Product::period_label`] for the
//! display helpers used by storefront UIs.
use serde::{Deserialize, Serialize};

use std::fmt::Display;

/// Store-side product identifier (e.g. `com.example.pro.monthly`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unit of a subscription billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodUnit::Day => "day",
            PeriodUnit::Week => "week",
            PeriodUnit::Month => "month",
            PeriodUnit::Year => "year",
        }
    }
}

/// Billing period of an auto-renewable subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPeriod {
    pub unit: PeriodUnit,
    pub number_of_units: u32,
}

/// A purchasable product as reported by the store service.
///
/// # Ownership
/// Products are defined by the store. The adapter only reads the identifier
/// and hands the record back to callers; it never edits one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub currency_code: String,
    pub subscription_period: Option<SubscriptionPeriod>,
}

impl Product {
    /// Creates a non-subscription product.
    ///
    /// # Arguments
    /// * `id` - Store identifier
    /// * `title` - Localized display title
    /// * `price` - Price in major currency units
    /// * `currency_code` - ISO 4217 code of the storefront currency
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        price: f64,
        currency_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            price,
            currency_code: currency_code.into(),
            subscription_period: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_subscription_period(mut self, unit: PeriodUnit, number_of_units: u32) -> Self {
        self.subscription_period = Some(SubscriptionPeriod {
            unit,
            number_of_units,
        });
        self
    }

    /// Price formatted with the storefront currency, e.g. `USD 4.99`.
    pub fn localized_price(&self) -> String {
        format!("{} {:.2}", self.currency_code, self.price)
    }

    /// Human readable billing period, e.g. `1 month` or `3 months`.
    ///
    /// Products without a subscription period render as `"0 "`.
    pub fn period_label(&self) -> String {
        let (units, period) = match self.subscription_period {
            Some(p) => (p.number_of_units, p.unit.as_str()),
            None => (0, ""),
        };
        let plural = if units > 1 { "s" } else { "" };
        format!("{} {}{}", units, period, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_label() {
        let monthly = Product::new("pro.monthly", "Pro", 4.99, "USD")
            .with_subscription_period(PeriodUnit::Month, 1);
        assert_eq!(monthly.period_label(), "1 month");

        let quarterly = Product::new("pro.quarterly", "Pro", 12.99, "USD")
            .with_subscription_period(PeriodUnit::Month, 3);
        assert_eq!(quarterly.period_label(), "3 months");

        let lifetime = Product::new("pro.lifetime", "Pro", 49.0, "USD");
        assert_eq!(lifetime.period_label(), "0 ");
    }

    #[test]
    fn test_localized_price() {
        let product = Product::new("coins.100", "100 Coins", 0.5, "EUR");
        assert_eq!(product.localized_price(), "EUR 0.50");
    }
}
