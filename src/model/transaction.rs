//! Transaction records issued by the store service.
use serde::{Deserialize, Serialize};

use super::product::ProductId;
use std::fmt::Display;

/// Store-side transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a transaction on the payment queue.
///
/// The set is closed: the dispatcher matches every variant, and the
/// in-flight states (`Purchasing`, `Deferred`) are handled explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransactionState {
    /// The payment is being processed.
    Purchasing,
    /// Payment completed; the product is owned.
    Purchased,
    /// Payment failed or was cancelled by the user.
    Failed { reason: String },
    /// A previously completed purchase was restored.
    Restored,
    /// Awaiting an external action (e.g. parental approval).
    Deferred,
}

impl TransactionState {
    /// Whether the transaction has reached a final state and must be finished.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            TransactionState::Purchased | TransactionState::Failed { .. } | TransactionState::Restored
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub product_id: ProductId,
    pub state: TransactionState,
    /// For restores, the identifier of the transaction being restored.
    pub original_id: Option<TransactionId>,
}

impl Transaction {
    pub fn new(
        id: impl Into<TransactionId>,
        product_id: impl Into<ProductId>,
        state: TransactionState,
    ) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            state,
            original_id: None,
        }
    }

    pub fn with_original(mut self, original_id: impl Into<TransactionId>) -> Self {
        self.original_id = Some(original_id.into());
        self
    }
}

/// A payment request submitted to the store's processing queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl Payment {
    pub fn for_product(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: 1,
        }
    }
}
