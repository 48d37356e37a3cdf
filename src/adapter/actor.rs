//! # Purchase Actor
//!
//! The `PurchaseActor` is the *server* side of the adapter. It owns the
//! session state and processes two inputs sequentially in one Tokio task:
//!
//! - [`AdapterRequest`]s from clients, and
//! - [`StoreEvent`]s from the store service.
//!
//! Because both are handled in the same loop, the session state needs no
//! locks.
//!
//! ## Session state
//!
//! | Field | Keyed by | Resolved by |
//! |-------|----------|-------------|
//! | `product_requests` | [`RequestId`] | `ProductsResponse` / `RequestFailed` |
//! | `purchases` | [`ProductId`] | `TransactionsUpdated` (final state) |
//! | `restore` | single slot | `RestoreFinished` / `RestoreFailed` |
//! | `receipt_requests` | [`RequestId`] | `RequestFinished` / `RequestFailed` |
//!
//! A second purchase of a product that is already pending, and a second
//! restore while one is running, are rejected with
//! [`AdapterError::AlreadyPending`]. Nothing is ever overwritten.

use super::dispatch::{dispatch, Disposition};
use super::error::AdapterError;
use super::message::{AdapterRequest, Response};
use crate::model::{Outcome, Payment, Product, ProductId, Transaction};
use crate::store::{ReceiptSource, RequestId, StoreEvent, StoreService};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

struct PendingPurchase {
    product: Product,
    respond_to: Response<Outcome>,
}

pub struct PurchaseActor<S: StoreService, R: ReceiptSource> {
    receiver: mpsc::Receiver<AdapterRequest>,
    events: mpsc::Receiver<StoreEvent>,
    feed: broadcast::Sender<Outcome>,
    store: S,
    receipts: R,
    product_ids: BTreeSet<ProductId>,
    product_requests: HashMap<RequestId, Response<Outcome>>,
    /// Keyed by product: the first final transaction for a product resolves
    /// its pending purchase, even an unfinished one left over from an earlier
    /// session. The later transaction then reaches the feed with no product.
    purchases: HashMap<ProductId, PendingPurchase>,
    restore: Option<Response<Outcome>>,
    receipt_requests: HashMap<RequestId, Response<Outcome>>,
    observing: bool,
    next_id: u64,
}

impl<S: StoreService, R: ReceiptSource> PurchaseActor<S, R> {
    /// Creates the actor. The store is attached to `events`' sender by the
    /// caller (see [`crate::adapter::new`]).
    pub(crate) fn new(
        receiver: mpsc::Receiver<AdapterRequest>,
        events: mpsc::Receiver<StoreEvent>,
        feed: broadcast::Sender<Outcome>,
        store: S,
        receipts: R,
    ) -> Self {
        Self {
            receiver,
            events,
            feed,
            store,
            receipts,
            product_ids: BTreeSet::new(),
            product_requests: HashMap::new(),
            purchases: HashMap::new(),
            restore: None,
            receipt_requests: HashMap::new(),
            observing: false,
            next_id: 1,
        }
    }

    /// Runs the event loop until every client is dropped.
    ///
    /// A caller awaiting a response holds a client clone, so the loop keeps
    /// running until every in-flight call has been answered. Responders left
    /// behind by abandoned calls are dropped on exit. Callers only observe
    /// [`AdapterError::ActorDropped`] when the task itself is aborted.
    pub async fn run(mut self) {
        info!("Purchase adapter started");

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(request) => self.handle_request(request).await,
                    None => break,
                },
                Some(event) = self.events.recv() => self.handle_event(event).await,
            }
        }

        info!(pending = self.pending_count(), "Shutdown");
    }

    fn pending_count(&self) -> usize {
        self.product_requests.len()
            + self.purchases.len()
            + self.receipt_requests.len()
            + usize::from(self.restore.is_some())
    }

    fn next_request_id(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        id
    }

    async fn ensure_observing(&mut self) {
        if !self.observing {
            self.store.add_transaction_observer().await;
            self.observing = true;
            debug!("Registered as transaction observer");
        }
    }

    // =========================================================================
    // Client requests
    // =========================================================================

    async fn handle_request(&mut self, request: AdapterRequest) {
        match request {
            AdapterRequest::SetProductIds { ids, respond_to } => {
                debug!(count = ids.len(), "SetProductIds");
                self.product_ids = ids;
                let _ = respond_to.send(Ok(()));
            }
            AdapterRequest::FetchProducts { respond_to } => {
                if self.product_ids.is_empty() {
                    warn!("Product ids not set");
                    let _ = respond_to.send(Ok(Outcome::NeedsProductIds));
                    return;
                }
                let request = self.next_request_id();
                debug!(%request, ids = ?self.product_ids, "FetchProducts");
                self.product_requests.insert(request, respond_to);
                self.store
                    .request_products(request, self.product_ids.clone())
                    .await;
            }
            AdapterRequest::Purchase {
                product,
                respond_to,
            } => {
                let product_id = product.id.clone();
                if !self.store.can_make_payments() {
                    info!(%product_id, "Purchasing disabled");
                    let _ = respond_to.send(Ok(Outcome::PurchasingDisabled));
                    return;
                }
                if self.purchases.contains_key(&product_id) {
                    warn!(%product_id, "Purchase already pending");
                    let _ = respond_to.send(Err(AdapterError::AlreadyPending(format!(
                        "purchase of {}",
                        product_id
                    ))));
                    return;
                }
                self.ensure_observing().await;
                debug!(%product_id, "Purchase");
                self.purchases.insert(
                    product_id.clone(),
                    PendingPurchase {
                        product,
                        respond_to,
                    },
                );
                self.store.add_payment(Payment::for_product(product_id)).await;
            }
            AdapterRequest::Restore { respond_to } => {
                if self.restore.is_some() {
                    warn!("Restore already pending");
                    let _ = respond_to.send(Err(AdapterError::AlreadyPending("restore".into())));
                    return;
                }
                self.ensure_observing().await;
                debug!("Restore");
                self.restore = Some(respond_to);
                self.store.restore_completed_transactions().await;
            }
            AdapterRequest::Receipt { respond_to } => {
                if let Some(receipt) = self.load_receipt().await {
                    debug!(size = receipt.len(), "Receipt served from cache");
                    let _ = respond_to.send(Ok(Outcome::ReceiptData { receipt }));
                    return;
                }
                let request = self.next_request_id();
                debug!(%request, "Receipt missing, refreshing");
                self.receipt_requests.insert(request, respond_to);
                self.store.refresh_receipt(request).await;
            }
        }
    }

    /// Reads and encodes the local receipt. Read errors count as "absent".
    async fn load_receipt(&self) -> Option<String> {
        match self.receipts.load().await {
            Ok(Some(bytes)) => Some(STANDARD.encode(bytes)),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Receipt read failed");
                None
            }
        }
    }

    // =========================================================================
    // Store notifications
    // =========================================================================

    async fn handle_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::ProductsResponse {
                request,
                products,
                invalid_identifiers,
            } => {
                if !invalid_identifiers.is_empty() {
                    warn!(%request, invalid = ?invalid_identifiers, "Store rejected product ids");
                }
                let Some(respond_to) = self.product_requests.remove(&request) else {
                    debug!(%request, "Products response for unknown request");
                    return;
                };
                let outcome = if products.is_empty() {
                    Outcome::EmptyProductList
                } else {
                    Outcome::ProductList { products }
                };
                info!(%request, "Products received");
                let _ = respond_to.send(Ok(outcome));
            }
            StoreEvent::TransactionsUpdated(transactions) => {
                for transaction in transactions {
                    self.handle_transaction(transaction).await;
                }
            }
            StoreEvent::RestoreFinished => match self.restore.take() {
                Some(respond_to) => {
                    info!("Restore finished");
                    let _ = respond_to.send(Ok(Outcome::Restored { transaction: None }));
                }
                None => debug!("Restore finished with no pending restore"),
            },
            StoreEvent::RestoreFailed { reason } => match self.restore.take() {
                Some(respond_to) => {
                    warn!(%reason, "Restore failed");
                    let _ = respond_to.send(Ok(Outcome::RestoreFailed { reason }));
                }
                None => debug!(%reason, "Restore failed with no pending restore"),
            },
            StoreEvent::RequestFinished { request } => {
                if let Some(respond_to) = self.receipt_requests.remove(&request) {
                    let outcome = match self.load_receipt().await {
                        Some(receipt) => Outcome::ReceiptData { receipt },
                        None => Outcome::ReceiptUnavailable,
                    };
                    let available = outcome != Outcome::ReceiptUnavailable;
                    info!(%request, available, "Receipt refreshed");
                    let _ = respond_to.send(Ok(outcome));
                } else {
                    debug!(%request, "Request finished");
                }
            }
            StoreEvent::RequestFailed { request, reason } => {
                if let Some(respond_to) = self.receipt_requests.remove(&request) {
                    warn!(%request, %reason, "Receipt refresh failed");
                    let _ = respond_to.send(Ok(Outcome::ReceiptRefreshFailed { reason }));
                } else if let Some(respond_to) = self.product_requests.remove(&request) {
                    warn!(%request, %reason, "Product lookup failed");
                    let _ = respond_to.send(Ok(Outcome::ProductRequestFailed { reason }));
                } else {
                    debug!(%request, %reason, "Unknown request failed");
                }
            }
        }
    }

    async fn handle_transaction(&mut self, transaction: Transaction) {
        let pending = if transaction.state.is_final() {
            self.purchases.remove(&transaction.product_id)
        } else {
            None
        };

        match dispatch(&transaction, pending.as_ref().map(|p| &p.product)) {
            Disposition::Finish(outcome) => {
                self.store.finish_transaction(&transaction).await;
                info!(
                    transaction_id = %transaction.id,
                    product_id = %transaction.product_id,
                    state = ?transaction.state,
                    "Transaction finished"
                );
                let _ = self.feed.send(outcome.clone());
                if let Some(pending) = pending {
                    let _ = pending.respond_to.send(Ok(outcome));
                }
            }
            Disposition::InFlight => {
                debug!(
                    transaction_id = %transaction.id,
                    state = ?transaction.state,
                    "Transaction in flight"
                );
            }
        }
    }
}
