//! # Sandbox Store
//!
//! An in-process [`StoreService`] with a fixed catalog. Every request is
//! answered from a background task, the same way the platform delivers
//! notifications from its own execution context.
//!
//! Behaviour:
//! - Product lookups return the catalog entries matching the requested ids,
//!   in catalog order; unknown ids are reported as invalid.
//! - Payments for catalog products go `Purchasing` → `Purchased`; products
//!   marked with [`SandboxStore::decline`] go `Purchasing` → `Failed`.
//! - Restores replay every purchased transaction as `Restored`.
//! - Receipt refreshes write a receipt file listing owned products.

use crate::model::{Payment, Product, ProductId, Transaction, TransactionId, TransactionState};
use crate::store::{RequestId, StoreEvent, StoreEventSender, StoreService};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

struct SandboxInner {
    catalog: Vec<Product>,
    declined: HashSet<ProductId>,
    payments_enabled: bool,
    receipt_path: Option<PathBuf>,
    events: OnceLock<StoreEventSender>,
    observing: AtomicBool,
    next_transaction: AtomicU64,
    owned: Mutex<Vec<Transaction>>,
    finished: Mutex<Vec<TransactionId>>,
}

#[derive(Clone)]
pub struct SandboxStore {
    inner: Arc<SandboxInner>,
}

impl SandboxStore {
    pub fn new(catalog: Vec<Product>) -> Self {
        Self {
            inner: Arc::new(SandboxInner {
                catalog,
                declined: HashSet::new(),
                payments_enabled: true,
                receipt_path: None,
                events: OnceLock::new(),
                observing: AtomicBool::new(false),
                next_transaction: AtomicU64::new(1000),
                owned: Mutex::new(Vec::new()),
                finished: Mutex::new(Vec::new()),
            }),
        }
    }

    fn configure(mut self, f: impl FnOnce(&mut SandboxInner)) -> Self {
        // Only valid before the store is shared with an adapter.
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            f(inner);
        } else {
            warn!("Sandbox store already shared; configuration ignored");
        }
        self
    }

    /// Payments for this product will fail.
    pub fn decline(self, product_id: impl Into<ProductId>) -> Self {
        let product_id = product_id.into();
        self.configure(|inner| {
            inner.declined.insert(product_id);
        })
    }

    pub fn with_payments_enabled(self, enabled: bool) -> Self {
        self.configure(|inner| inner.payments_enabled = enabled)
    }

    /// Where refreshed receipts are written.
    pub fn with_receipt_path(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.configure(|inner| inner.receipt_path = Some(path))
    }

    /// Seeds a previously completed purchase, available to restores.
    pub async fn seed_owned(&self, product_id: impl Into<ProductId>) {
        let tx = self.next_transaction(product_id.into(), TransactionState::Purchased);
        self.inner.owned.lock().await.push(tx);
    }

    /// Transactions finished by the adapter so far.
    pub async fn finished(&self) -> Vec<TransactionId> {
        self.inner.finished.lock().await.clone()
    }

    fn next_transaction(&self, product_id: ProductId, state: TransactionState) -> Transaction {
        let n = self.inner.next_transaction.fetch_add(1, Ordering::SeqCst);
        Transaction::new(format!("sandbox_tx_{}", n), product_id, state)
    }

    /// Sends events in order from a background task.
    fn deliver(&self, events: Vec<StoreEvent>) {
        let Some(sender) = self.inner.events.get().cloned() else {
            warn!("Sandbox store not attached; dropping notification");
            return;
        };
        tokio::spawn(async move {
            for event in events {
                if sender.send(event).await.is_err() {
                    debug!("Adapter gone; notification dropped");
                    return;
                }
            }
        });
    }

    async fn write_receipt(&self, path: &Path) -> std::io::Result<()> {
        let owned = self.inner.owned.lock().await;
        let body = owned
            .iter()
            .map(|tx| format!("{}:{}", tx.id, tx.product_id))
            .collect::<Vec<_>>()
            .join("\n");
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, format!("sandbox-receipt\n{}", body)).await
    }
}

#[async_trait]
impl StoreService for SandboxStore {
    fn attach(&self, events: StoreEventSender) {
        if self.inner.events.set(events).is_err() {
            warn!("Sandbox store attached twice; keeping the first adapter");
        }
    }

    fn can_make_payments(&self) -> bool {
        self.inner.payments_enabled
    }

    async fn add_transaction_observer(&self) {
        if !self.inner.observing.swap(true, Ordering::SeqCst) {
            info!("Transaction observer added");
        }
    }

    async fn request_products(&self, request: RequestId, ids: BTreeSet<ProductId>) {
        let products: Vec<Product> = self
            .inner
            .catalog
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        let invalid_identifiers = ids
            .into_iter()
            .filter(|id| !products.iter().any(|p| &p.id == id))
            .collect();
        debug!(%request, found = products.len(), "Product lookup");
        self.deliver(vec![StoreEvent::ProductsResponse {
            request,
            products,
            invalid_identifiers,
        }]);
    }

    async fn add_payment(&self, payment: Payment) {
        let in_catalog = self.inner.catalog.iter().any(|p| p.id == payment.product_id);
        let final_state = if !in_catalog {
            TransactionState::Failed {
                reason: format!("Unknown product: {}", payment.product_id),
            }
        } else if self.inner.declined.contains(&payment.product_id) {
            TransactionState::Failed {
                reason: "Payment declined".to_string(),
            }
        } else {
            TransactionState::Purchased
        };

        let purchasing = self.next_transaction(payment.product_id.clone(), TransactionState::Purchasing);
        let mut done = purchasing.clone();
        done.state = final_state;
        if done.state == TransactionState::Purchased {
            self.inner.owned.lock().await.push(done.clone());
        }

        if !self.inner.observing.load(Ordering::SeqCst) {
            warn!(product_id = %payment.product_id, "Payment added without an observer");
            return;
        }
        self.deliver(vec![
            StoreEvent::TransactionsUpdated(vec![purchasing]),
            StoreEvent::TransactionsUpdated(vec![done]),
        ]);
    }

    async fn finish_transaction(&self, transaction: &Transaction) {
        self.inner.finished.lock().await.push(transaction.id.clone());
    }

    async fn restore_completed_transactions(&self) {
        let owned = self.inner.owned.lock().await.clone();
        let restored: Vec<Transaction> = owned
            .into_iter()
            .map(|original| {
                self.next_transaction(original.product_id.clone(), TransactionState::Restored)
                    .with_original(original.id)
            })
            .collect();

        let mut events = Vec::new();
        if !restored.is_empty() && self.inner.observing.load(Ordering::SeqCst) {
            events.push(StoreEvent::TransactionsUpdated(restored));
        }
        events.push(StoreEvent::RestoreFinished);
        self.deliver(events);
    }

    async fn refresh_receipt(&self, request: RequestId) {
        let event = match &self.inner.receipt_path {
            Some(path) => match self.write_receipt(path).await {
                Ok(()) => StoreEvent::RequestFinished { request },
                Err(e) => StoreEvent::RequestFailed {
                    request,
                    reason: e.to_string(),
                },
            },
            None => StoreEvent::RequestFailed {
                request,
                reason: "Receipt refresh is not available".to_string(),
            },
        };
        self.deliver(vec![event]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("coins.100", "100 Coins", 0.99, "USD"),
            Product::new("coins.500", "500 Coins", 3.99, "USD"),
        ]
    }

    #[tokio::test]
    async fn test_lookup_reports_invalid_ids() {
        let store = SandboxStore::new(catalog());
        let (sender, mut receiver) = mpsc::channel(8);
        store.attach(sender);

        let ids = ["coins.500", "coins.999"].into_iter().map(ProductId::from).collect();
        store.request_products(RequestId(1), ids).await;

        match receiver.recv().await {
            Some(StoreEvent::ProductsResponse {
                request,
                products,
                invalid_identifiers,
            }) => {
                assert_eq!(request, RequestId(1));
                assert_eq!(products.len(), 1);
                assert_eq!(products[0].id, ProductId::from("coins.500"));
                assert_eq!(invalid_identifiers, vec![ProductId::from("coins.999")]);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_declined_payment_fails() {
        let store = SandboxStore::new(catalog()).decline("coins.500");
        let (sender, mut receiver) = mpsc::channel(8);
        store.attach(sender);
        store.add_transaction_observer().await;

        store.add_payment(Payment::for_product("coins.500".into())).await;

        let Some(StoreEvent::TransactionsUpdated(first)) = receiver.recv().await else {
            panic!("Expected a transaction update");
        };
        assert_eq!(first[0].state, TransactionState::Purchasing);
        let Some(StoreEvent::TransactionsUpdated(second)) = receiver.recv().await else {
            panic!("Expected a transaction update");
        };
        assert!(matches!(second[0].state, TransactionState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_refresh_without_path_fails() {
        let store = SandboxStore::new(catalog());
        let (sender, mut receiver) = mpsc::channel(8);
        store.attach(sender);

        store.refresh_receipt(RequestId(3)).await;
        assert!(matches!(
            receiver.recv().await,
            Some(StoreEvent::RequestFailed { request: RequestId(3), .. })
        ));
    }
}
