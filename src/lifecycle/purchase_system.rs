use crate::adapter;
use crate::clients::{PurchaseCallbacks, PurchaseClient};
use crate::lifecycle::AdapterConfig;
use crate::store::{FileReceiptSource, ReceiptSource, StoreService};
use tracing::{error, info};

/// Runtime orchestrator for the purchase adapter.
///
/// `PurchaseSystem` is responsible for:
/// - **Lifecycle Management**: spawning the adapter task and stopping it
/// - **Wiring**: attaching the store service and receipt source
///
/// # Example
///
/// ```ignore
/// let system = PurchaseSystem::new(&config, store);
///
/// system.client.set_product_ids(["coins.100"]).await?;
/// let products = system.client.fetch_available_products().await?;
///
/// system.shutdown().await?;
/// ```
pub struct PurchaseSystem {
    /// Client for interacting with the adapter
    pub client: PurchaseClient,

    /// Adapter task handle (used for graceful shutdown)
    handle: tokio::task::JoinHandle<()>,
}

impl PurchaseSystem {
    /// Starts an adapter that reads the receipt from `config.receipt_path`.
    pub fn new<S: StoreService>(config: &AdapterConfig, store: S) -> Self {
        let receipts = FileReceiptSource::new(config.receipt_path.clone());
        Self::with_receipts(config, store, receipts)
    }

    /// Starts an adapter with an explicit receipt source.
    pub fn with_receipts<S: StoreService, R: ReceiptSource>(
        config: &AdapterConfig,
        store: S,
        receipts: R,
    ) -> Self {
        let (actor, client) = adapter::new(config, store, receipts);
        let handle = tokio::spawn(actor.run());
        Self { client, handle }
    }

    /// Callback-style facade over this system's client.
    pub fn callbacks(&self) -> PurchaseCallbacks {
        PurchaseCallbacks::new(self.client.clone())
    }

    /// Gracefully shuts down the adapter.
    ///
    /// Drops this system's client, which closes the request channel once no
    /// other clone remains, then waits for the adapter task. In-flight calls
    /// hold their own clone, so this waits until the store has answered them.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the adapter stopped cleanly
    /// - `Err(String)` if the adapter task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down purchase adapter...");

        drop(self.client);

        if let Err(e) = self.handle.await {
            error!("Adapter task failed: {:?}", e);
            return Err(format!("Adapter task failed: {:?}", e));
        }

        info!("Purchase adapter shutdown complete.");
        Ok(())
    }
}
