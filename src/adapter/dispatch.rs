//! Transaction state dispatch.
//!
//! Maps one transaction update to what the adapter must do with it. The match
//! is exhaustive over [`TransactionState`]; in-flight states get their own
//! disposition instead of falling through a default arm.

use crate::model::{Outcome, Product, Transaction, TransactionState};

#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Final state: finish the transaction with the store, then emit.
    Finish(Outcome),
    /// Still on the payment queue; nothing to finish or emit yet.
    InFlight,
}

/// Decides the disposition of `transaction`. `pending` is the product the
/// adapter recorded when the matching purchase was submitted.
pub fn dispatch(transaction: &Transaction, pending: Option<&Product>) -> Disposition {
    match &transaction.state {
        TransactionState::Purchased => Disposition::Finish(Outcome::Purchased {
            product: pending.cloned(),
            transaction: transaction.clone(),
        }),
        TransactionState::Failed { .. } => Disposition::Finish(Outcome::PurchaseFailed {
            product: pending.cloned(),
            transaction: transaction.clone(),
        }),
        TransactionState::Restored => Disposition::Finish(Outcome::Restored {
            transaction: Some(transaction.clone()),
        }),
        TransactionState::Purchasing | TransactionState::Deferred => Disposition::InFlight,
    }
}
