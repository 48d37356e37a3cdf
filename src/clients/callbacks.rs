//! Completion-callback facade over [`PurchaseClient`].
//!
//! For callers that prefer "call, then get notified" over awaiting a future.
//! Every call spawns its own task and owns its completion, so a second call of
//! the same kind never replaces the first caller's completion.

use super::PurchaseClient;
use crate::adapter::AdapterError;
use crate::model::{Outcome, Product};
use tokio::task::JoinHandle;
use tracing::warn;

/// Completion invoked exactly once with the result of an operation.
pub type Completion = Box<dyn FnOnce(Result<Outcome, AdapterError>) + Send + 'static>;

#[derive(Clone)]
pub struct PurchaseCallbacks {
    client: PurchaseClient,
}

impl PurchaseCallbacks {
    pub fn new(client: PurchaseClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PurchaseClient {
        &self.client
    }

    fn spawn<F>(&self, operation: &'static str, call: F, completion: Completion) -> JoinHandle<()>
    where
        F: std::future::Future<Output = Result<Outcome, AdapterError>> + Send + 'static,
    {
        tokio::spawn(async move {
            let result = call.await;
            if let Err(e) = &result {
                warn!(operation, error = %e, "Operation failed");
            }
            completion(result);
        })
    }

    /// Replaces the product identifiers. Fire-and-forget.
    pub fn set_product_ids(&self, ids: Vec<String>) -> JoinHandle<()> {
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = client.set_product_ids(ids).await {
                warn!(operation = "set_product_ids", error = %e, "Operation failed");
            }
        })
    }

    pub fn fetch_available_products(
        &self,
        completion: impl FnOnce(Result<Outcome, AdapterError>) + Send + 'static,
    ) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(
            "fetch_available_products",
            async move { client.fetch_available_products().await },
            Box::new(completion),
        )
    }

    pub fn purchase(
        &self,
        product: Product,
        completion: impl FnOnce(Result<Outcome, AdapterError>) + Send + 'static,
    ) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(
            "purchase",
            async move { client.purchase(product).await },
            Box::new(completion),
        )
    }

    pub fn restore_purchase(
        &self,
        completion: impl FnOnce(Result<Outcome, AdapterError>) + Send + 'static,
    ) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(
            "restore_purchase",
            async move { client.restore_purchase().await },
            Box::new(completion),
        )
    }

    pub fn get_purchase_receipt(
        &self,
        completion: impl FnOnce(Result<Outcome, AdapterError>) + Send + 'static,
    ) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(
            "get_purchase_receipt",
            async move { client.get_purchase_receipt().await },
            Box::new(completion),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter;
    use crate::lifecycle::AdapterConfig;
    use crate::store::mock::{create_mock_store, MockReceiptSource};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_each_call_keeps_its_completion() {
        let (store, _handle) = create_mock_store();
        let (actor, client) = adapter::new(&AdapterConfig::default(), store, MockReceiptSource::new());
        tokio::spawn(actor.run());

        let callbacks = PurchaseCallbacks::new(client);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let seen = seen.clone();
            callbacks.fetch_available_products(move |r| seen.lock().unwrap().push(("first", r)))
        };
        let second = {
            let seen = seen.clone();
            callbacks.fetch_available_products(move |r| seen.lock().unwrap().push(("second", r)))
        };
        first.await.unwrap();
        second.await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().any(|(who, _)| *who == "first"));
        assert!(seen.iter().any(|(who, _)| *who == "second"));
        assert!(seen
            .iter()
            .all(|(_, r)| *r == Ok(Outcome::NeedsProductIds)));
    }

    #[tokio::test]
    async fn test_disabled_purchase_completes() {
        let (store, handle) = create_mock_store();
        handle.set_can_make_payments(false);
        let (actor, client) = adapter::new(&AdapterConfig::default(), store, MockReceiptSource::new());
        tokio::spawn(actor.run());

        let callbacks = PurchaseCallbacks::new(client);
        let (tx, rx) = tokio::sync::oneshot::channel();
        callbacks.purchase(Product::new("coins.100", "100 Coins", 0.99, "USD"), move |r| {
            let _ = tx.send(r);
        });

        assert_eq!(rx.await.unwrap(), Ok(Outcome::PurchasingDisabled));
    }
}
