//! # Outcomes
//!
//! Every adapter operation resolves to exactly one [`Outcome`]. Outcomes are
//! plain values: once built they are only read, cloned or serialized.
//!
//! Besides the variants for successful results, two kinds of outcome describe
//! unmet preconditions ([`Outcome::NeedsProductIds`],
//! [`Outcome::PurchasingDisabled`]) and five describe failures reported by the
//! store ([`Outcome::ProductRequestFailed`], [`Outcome::PurchaseFailed`], [`Outcome::RestoreFailed`],
//! [`Outcome::ReceiptRefreshFailed`], [`Outcome::ReceiptUnavailable`]).

use serde::{Deserialize, Serialize};

use super::product::Product;
use super::transaction::Transaction;

/// Category used to route purchase events to external listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    NewPurchase,
    Restore,
}

impl EventTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventTag::NewPurchase => "new_purchase",
            EventTag::Restore => "restore",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// No product identifiers were set before fetching products.
    NeedsProductIds,
    /// The device or account is not allowed to make payments.
    PurchasingDisabled,
    /// A purchase was restored. `None` marks the end of a restore run.
    Restored { transaction: Option<Transaction> },
    /// A purchase completed. `product` is the product that was pending, if any.
    Purchased {
        product: Option<Product>,
        transaction: Transaction,
    },
    ProductList { products: Vec<Product> },
    EmptyProductList,
    /// The store could not answer the product lookup.
    ProductRequestFailed { reason: String },
    /// Base64 encoded receipt blob.
    ReceiptData { receipt: String },
    /// The store reported the payment as failed or cancelled.
    PurchaseFailed {
        product: Option<Product>,
        transaction: Transaction,
    },
    RestoreFailed { reason: String },
    ReceiptRefreshFailed { reason: String },
    /// The receipt refresh finished but no local receipt exists.
    ReceiptUnavailable,
}

impl Outcome {
    /// Human readable message for UI display.
    pub fn message(&self) -> String {
        match self {
            Outcome::NeedsProductIds => "Product ids not set, call setProductIds method!".into(),
            Outcome::PurchasingDisabled => "Purchases are disabled in your device!".into(),
            Outcome::Restored { .. } => "You've successfully restored your purchase!".into(),
            Outcome::Purchased { .. } => "You've successfully bought this purchase!".into(),
            Outcome::EmptyProductList => "There are no products listed.".into(),
            Outcome::PurchaseFailed { transaction, .. } => match &transaction.state {
                crate::model::TransactionState::Failed { reason } => {
                    format!("The purchase could not be completed: {}", reason)
                }
                _ => "The purchase could not be completed.".into(),
            },
            Outcome::ProductRequestFailed { reason } => {
                format!("Products could not be loaded: {}", reason)
            }
            Outcome::RestoreFailed { reason } => {
                format!("Your purchases could not be restored: {}", reason)
            }
            Outcome::ReceiptRefreshFailed { reason } => {
                format!("The receipt could not be refreshed: {}", reason)
            }
            Outcome::ReceiptUnavailable => "No receipt is available on this device.".into(),
            Outcome::ProductList { .. } | Outcome::ReceiptData { .. } => String::new(),
        }
    }

    /// Routing tag for external event listeners.
    pub fn event_tag(&self) -> Option<EventTag> {
        match self {
            Outcome::Purchased { .. } => Some(EventTag::NewPurchase),
            Outcome::Restored { .. } => Some(EventTag::Restore),
            _ => None,
        }
    }

    /// Whether this outcome reports a failure rather than a result.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::NeedsProductIds
                | Outcome::PurchasingDisabled
                | Outcome::ProductRequestFailed { .. }
                | Outcome::PurchaseFailed { .. }
                | Outcome::RestoreFailed { .. }
                | Outcome::ReceiptRefreshFailed { .. }
                | Outcome::ReceiptUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionState;

    #[test]
    fn test_event_tags() {
        let tx = Transaction::new("tx_1", "pro.monthly", TransactionState::Purchased);
        let purchased = Outcome::Purchased {
            product: None,
            transaction: tx.clone(),
        };
        assert_eq!(purchased.event_tag(), Some(EventTag::NewPurchase));
        assert_eq!(purchased.event_tag().map(|t| t.as_str()), Some("new_purchase"));

        let restored = Outcome::Restored { transaction: None };
        assert_eq!(restored.event_tag().map(|t| t.as_str()), Some("restore"));

        assert_eq!(Outcome::EmptyProductList.event_tag(), None);
        assert_eq!(Outcome::PurchasingDisabled.event_tag(), None);

        let failed = Outcome::PurchaseFailed {
            product: None,
            transaction: Transaction::new(
                "tx_3",
                "pro.monthly",
                TransactionState::Failed {
                    reason: "declined".into(),
                },
            ),
        };
        assert_eq!(failed.event_tag(), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Outcome::NeedsProductIds.message(),
            "Product ids not set, call setProductIds method!"
        );
        assert_eq!(Outcome::ReceiptData { receipt: "AAAA".into() }.message(), "");

        let failed = Outcome::PurchaseFailed {
            product: None,
            transaction: Transaction::new(
                "tx_2",
                "coins.100",
                TransactionState::Failed {
                    reason: "cancelled".into(),
                },
            ),
        };
        assert!(failed.message().contains("cancelled"));
        assert!(failed.is_failure());
        assert!(!Outcome::EmptyProductList.is_failure());
    }
}
