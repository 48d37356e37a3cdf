use crate::adapter::{AdapterError, AdapterRequest, Response};
use crate::model::{Outcome, Product, ProductId};
use std::collections::BTreeSet;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, instrument};

/// Client for interacting with the purchase adapter.
///
/// Cheap to clone; every clone talks to the same adapter. Each call gets its
/// own response channel, so concurrent callers never share a completion.
#[derive(Clone)]
pub struct PurchaseClient {
    sender: mpsc::Sender<AdapterRequest>,
    feed: broadcast::Sender<Outcome>,
}

impl PurchaseClient {
    pub fn new(sender: mpsc::Sender<AdapterRequest>, feed: broadcast::Sender<Outcome>) -> Self {
        Self { sender, feed }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Response<T>) -> AdapterRequest,
    ) -> Result<T, AdapterError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| AdapterError::ActorClosed)?;
        response.await.map_err(|_| AdapterError::ActorDropped)?
    }

    /// Replaces the set of product identifiers used by
    /// [`fetch_available_products`](Self::fetch_available_products).
    #[instrument(skip(self, ids))]
    pub async fn set_product_ids<I>(&self, ids: I) -> Result<(), AdapterError>
    where
        I: IntoIterator,
        I::Item: Into<ProductId>,
    {
        let ids: BTreeSet<ProductId> = ids.into_iter().map(Into::into).collect();
        debug!("Sending request");
        self.request(|respond_to| AdapterRequest::SetProductIds { ids, respond_to })
            .await
    }

    /// Looks up the stored product identifiers.
    ///
    /// Resolves with `NeedsProductIds` when no identifiers were set,
    /// otherwise with `ProductList` or `EmptyProductList` once the store
    /// answers.
    #[instrument(skip(self))]
    pub async fn fetch_available_products(&self) -> Result<Outcome, AdapterError> {
        debug!("Sending request");
        self.request(|respond_to| AdapterRequest::FetchProducts { respond_to })
            .await
    }

    /// Buys `product`.
    ///
    /// Resolves immediately with `PurchasingDisabled` when the device may not
    /// pay; otherwise when the store reports the transaction's final state.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn purchase(&self, product: Product) -> Result<Outcome, AdapterError> {
        debug!("Sending request");
        self.request(|respond_to| AdapterRequest::Purchase {
            product,
            respond_to,
        })
        .await
    }

    /// Restores completed transactions. Resolves with `Restored` (no
    /// transaction) when the store has delivered all of them; the individual
    /// restored transactions are published on [`subscribe`](Self::subscribe).
    #[instrument(skip(self))]
    pub async fn restore_purchase(&self) -> Result<Outcome, AdapterError> {
        debug!("Sending request");
        self.request(|respond_to| AdapterRequest::Restore { respond_to })
            .await
    }

    /// Returns the base64 receipt, refreshing it from the store if needed.
    #[instrument(skip(self))]
    pub async fn get_purchase_receipt(&self) -> Result<Outcome, AdapterError> {
        debug!("Sending request");
        self.request(|respond_to| AdapterRequest::Receipt { respond_to })
            .await
    }

    /// Subscribes to the transaction feed: one outcome per finished
    /// transaction (`Purchased`, `Restored`, `PurchaseFailed`).
    pub fn subscribe(&self) -> broadcast::Receiver<Outcome> {
        self.feed.subscribe()
    }
}
