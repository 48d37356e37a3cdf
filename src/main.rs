//! # Purchase Adapter Demo
//!
//! Drives the adapter against the [`SandboxStore`]: lists products, buys one,
//! restores, and fetches the receipt.
//!
//! Configuration comes from `PURCHASE_ADAPTER_*` variables (see
//! [`AdapterConfig`]); logging from `RUST_LOG`.

use purchase_adapter::lifecycle::{setup_tracing, AdapterConfig, PurchaseSystem};
use purchase_adapter::model::{Outcome, PeriodUnit, Product};
use purchase_adapter::store::sandbox::SandboxStore;
use tracing::{error, info, Instrument};

fn catalog() -> Vec<Product> {
    vec![
        Product::new("coins.100", "100 Coins", 0.99, "USD").with_description("A small bag of coins"),
        Product::new("pro.monthly", "Pro", 4.99, "USD")
            .with_description("All features, billed monthly")
            .with_subscription_period(PeriodUnit::Month, 1),
    ]
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = AdapterConfig::from_env().map_err(|e| e.to_string())?;
    info!(receipt_path = %config.receipt_path.display(), "Starting purchase adapter demo");

    let store = SandboxStore::new(catalog()).with_receipt_path(config.receipt_path.clone());
    store.seed_owned("pro.monthly").await;
    let system = PurchaseSystem::new(&config, store);

    let mut feed = system.client.subscribe();
    let feed_task = tokio::spawn(async move {
        while let Ok(outcome) = feed.recv().await {
            info!(
                tag = outcome.event_tag().map(|t| t.as_str()).unwrap_or(""),
                message = %outcome.message(),
                "Transaction event"
            );
        }
    });

    system
        .client
        .set_product_ids(["coins.100", "pro.monthly"])
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("catalog");
    let products = async {
        match system.client.fetch_available_products().await {
            Ok(Outcome::ProductList { products }) => Ok(products),
            Ok(other) => Err(other.message()),
            Err(e) => Err(e.to_string()),
        }
    }
    .instrument(span)
    .await?;

    for product in &products {
        info!(
            product_id = %product.id,
            price = %product.localized_price(),
            period = %product.period_label(),
            "Product available"
        );
    }

    if let Some(coins) = products.iter().find(|p| p.id.0 == "coins.100").cloned() {
        let span = tracing::info_span!("purchase");
        match system.client.purchase(coins).instrument(span).await {
            Ok(outcome) if outcome.is_failure() => error!(message = %outcome.message(), "Purchase failed"),
            Ok(outcome) => info!(message = %outcome.message(), "Purchase completed"),
            Err(e) => error!(error = %e, "Purchase failed"),
        }
    }

    match system.client.restore_purchase().await {
        Ok(outcome) => info!(message = %outcome.message(), "Restore completed"),
        Err(e) => error!(error = %e, "Restore failed"),
    }

    match system.client.get_purchase_receipt().await {
        Ok(Outcome::ReceiptData { receipt }) => info!(size = receipt.len(), "Receipt available"),
        Ok(other) => error!(message = %other.message(), "Receipt not available"),
        Err(e) => error!(error = %e, "Receipt request failed"),
    }

    system.shutdown().await?;
    let _ = feed_task.await;

    info!("Demo completed successfully");
    Ok(())
}
