//! # Mock Store & Testing Guide
//!
//! [`MockStore`] implements [`StoreService`] without doing any work: every
//! call is recorded and forwarded to a [`MockStoreHandle`] held by the test.
//! The test then plays the store's part by injecting [`StoreEvent`]s with
//! [`MockStoreHandle::emit`] at exactly the point it wants.
//!
//! ## When to use the Mock vs the Sandbox
//!
//! | Feature | MockStore | SandboxStore |
//! |---------|-----------|--------------|
//! | **Timing** | Test decides when events arrive | Store answers on its own |
//! | **Assertions** | Every call is recorded | Only final effects |
//! | **Use Case** | Adapter state handling, races | End-to-end flows |
//!
//! ## Example
//!
//! ```rust
//! use purchase_adapter::adapter;
//! use purchase_adapter::lifecycle::AdapterConfig;
//! use purchase_adapter::model::Outcome;
//! use purchase_adapter::store::mock::{create_mock_store, MockReceiptSource, StoreCall};
//! use purchase_adapter::store::StoreEvent;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (store, mut handle) = create_mock_store();
//!     let (actor, client) = adapter::new(&AdapterConfig::default(), store, MockReceiptSource::new());
//!     tokio::spawn(actor.run());
//!
//!     client.set_product_ids(["coins.100"]).await.unwrap();
//!     let pending = tokio::spawn({
//!         let client = client.clone();
//!         async move { client.fetch_available_products().await }
//!     });
//!
//!     // Play the store: answer the lookup with no products.
//!     let Some(StoreCall::RequestProducts { request, .. }) = handle.expect_call().await else {
//!         panic!("Expected a product lookup");
//!     };
//!     handle
//!         .emit(StoreEvent::ProductsResponse { request, products: vec![], invalid_identifiers: vec![] })
//!         .await;
//!
//!     assert_eq!(pending.await.unwrap().unwrap(), Outcome::EmptyProductList);
//! }
//! ```

use crate::model::{Payment, ProductId, Transaction, TransactionId};
use crate::store::{
    ReceiptError, ReceiptSource, RequestId, StoreEvent, StoreEventSender, StoreService,
};
use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A call the adapter made on the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    AddTransactionObserver,
    RequestProducts {
        request: RequestId,
        ids: BTreeSet<ProductId>,
    },
    AddPayment(Payment),
    FinishTransaction(TransactionId),
    RestoreCompletedTransactions,
    RefreshReceipt(RequestId),
}

/// The store half handed to the adapter.
#[derive(Clone)]
pub struct MockStore {
    can_pay: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    notify: mpsc::UnboundedSender<StoreCall>,
    events: Arc<Mutex<Option<StoreEventSender>>>,
}

/// The test half: observes calls and injects events.
pub struct MockStoreHandle {
    can_pay: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    receiver: mpsc::UnboundedReceiver<StoreCall>,
    events: Arc<Mutex<Option<StoreEventSender>>>,
}

/// Creates a mock store that allows payments, plus its test handle.
pub fn create_mock_store() -> (MockStore, MockStoreHandle) {
    let (notify, receiver) = mpsc::unbounded_channel();
    let can_pay = Arc::new(AtomicBool::new(true));
    let calls = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(None));

    let store = MockStore {
        can_pay: can_pay.clone(),
        calls: calls.clone(),
        notify,
        events: events.clone(),
    };
    let handle = MockStoreHandle {
        can_pay,
        calls,
        receiver,
        events,
    };
    (store, handle)
}

impl MockStore {
    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call.clone());
        let _ = self.notify.send(call);
    }
}

#[async_trait]
impl StoreService for MockStore {
    fn attach(&self, events: StoreEventSender) {
        *self.events.lock().unwrap() = Some(events);
    }

    fn can_make_payments(&self) -> bool {
        self.can_pay.load(Ordering::SeqCst)
    }

    async fn add_transaction_observer(&self) {
        self.record(StoreCall::AddTransactionObserver);
    }

    async fn request_products(&self, request: RequestId, ids: BTreeSet<ProductId>) {
        self.record(StoreCall::RequestProducts { request, ids });
    }

    async fn add_payment(&self, payment: Payment) {
        self.record(StoreCall::AddPayment(payment));
    }

    async fn finish_transaction(&self, transaction: &Transaction) {
        self.record(StoreCall::FinishTransaction(transaction.id.clone()));
    }

    async fn restore_completed_transactions(&self) {
        self.record(StoreCall::RestoreCompletedTransactions);
    }

    async fn refresh_receipt(&self, request: RequestId) {
        self.record(StoreCall::RefreshReceipt(request));
    }
}

impl MockStoreHandle {
    /// Waits for the next store call.
    pub async fn expect_call(&mut self) -> Option<StoreCall> {
        self.receiver.recv().await
    }

    /// Waits for the next call that is not an observer registration.
    pub async fn expect_work(&mut self) -> Option<StoreCall> {
        loop {
            match self.receiver.recv().await {
                Some(StoreCall::AddTransactionObserver) => continue,
                other => return other,
            }
        }
    }

    /// Delivers an event to the adapter as if the store had sent it.
    pub async fn emit(&self, event: StoreEvent) {
        let sender = self
            .events
            .lock()
            .unwrap()
            .clone()
            .expect("Store was never attached to an adapter");
        sender.send(event).await.expect("Adapter stopped listening");
    }

    pub fn set_can_make_payments(&self, allowed: bool) {
        self.can_pay.store(allowed, Ordering::SeqCst);
    }

    /// Snapshot of every call recorded so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&StoreCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    /// Asserts that no call arrived since the last `expect_*`.
    pub fn verify_quiet(&mut self) {
        if let Ok(call) = self.receiver.try_recv() {
            panic!("Unexpected store call: {:?}", call);
        }
    }
}

/// Receipt source returning scripted results in order, then `None`.
#[derive(Clone, Default)]
pub struct MockReceiptSource {
    responses: Arc<Mutex<VecDeque<Result<Option<Vec<u8>>, String>>>>,
    loads: Arc<AtomicUsize>,
}

impl MockReceiptSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_present(&self, receipt: impl Into<Vec<u8>>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(Some(receipt.into())));
        self
    }

    pub fn push_absent(&self) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(None));
        self
    }

    pub fn push_error(&self, message: impl Into<String>) -> &Self {
        self.responses.lock().unwrap().push_back(Err(message.into()));
        self
    }

    /// Number of times the adapter read the receipt.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReceiptSource for MockReceiptSource {
    async fn load(&self) -> Result<Option<Vec<u8>>, ReceiptError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(receipt)) => Ok(receipt),
            Some(Err(message)) => Err(ReceiptError::Io {
                path: "mock".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, message),
            }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_calls_are_recorded_and_forwarded() {
        let (store, mut handle) = create_mock_store();

        store.add_transaction_observer().await;
        store.refresh_receipt(RequestId(7)).await;

        assert_eq!(handle.expect_call().await, Some(StoreCall::AddTransactionObserver));
        assert_eq!(handle.expect_call().await, Some(StoreCall::RefreshReceipt(RequestId(7))));
        handle.verify_quiet();
        assert_eq!(handle.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_emit_reaches_attached_channel() {
        let (store, handle) = create_mock_store();
        let (sender, mut receiver) = mpsc::channel(4);
        store.attach(sender);

        handle.emit(StoreEvent::RestoreFinished).await;
        assert_eq!(receiver.recv().await, Some(StoreEvent::RestoreFinished));
    }

    #[tokio::test]
    async fn test_receipt_script() {
        let source = MockReceiptSource::new();
        source.push_absent().push_present("abc").push_error("denied");

        assert_eq!(source.load().await.unwrap(), None);
        assert_eq!(source.load().await.unwrap(), Some(b"abc".to_vec()));
        assert!(source.load().await.is_err());
        assert_eq!(source.load().await.unwrap(), None);
        assert_eq!(source.loads(), 4);
    }
}
