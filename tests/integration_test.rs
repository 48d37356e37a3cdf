use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use purchase_adapter::lifecycle::{AdapterConfig, PurchaseSystem};
use purchase_adapter::model::{EventTag, Outcome, PeriodUnit, Product};
use purchase_adapter::store::sandbox::SandboxStore;
use tokio::sync::oneshot;

fn catalog() -> Vec<Product> {
    vec![
        Product::new("coins.100", "100 Coins", 0.99, "USD"),
        Product::new("pro.monthly", "Pro", 4.99, "USD").with_subscription_period(PeriodUnit::Month, 1),
        Product::new("gems.10", "10 Gems", 1.99, "USD"),
    ]
}

fn config_in(dir: &tempfile::TempDir) -> AdapterConfig {
    AdapterConfig {
        receipt_path: dir.path().join("StoreKit").join("sandboxReceipt"),
        ..AdapterConfig::default()
    }
}

/// Full end-to-end flow against the sandbox store: catalog, purchase,
/// restore and receipt.
#[tokio::test]
async fn test_full_purchase_flow() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let store = SandboxStore::new(catalog()).with_receipt_path(config.receipt_path.clone());
    store.seed_owned("pro.monthly").await;
    let system = PurchaseSystem::new(&config, store.clone());
    let mut feed = system.client.subscribe();

    // Catalog
    system
        .client
        .set_product_ids(["pro.monthly", "coins.100", "coins.999"])
        .await
        .expect("Failed to set product ids");
    let Outcome::ProductList { products } = system.client.fetch_available_products().await.unwrap() else {
        panic!("Expected a product list");
    };
    let ids: Vec<&str> = products.iter().map(|p| p.id.0.as_str()).collect();
    assert_eq!(ids, vec!["coins.100", "pro.monthly"], "Unknown ids are dropped, catalog order kept");
    assert_eq!(products[1].localized_price(), "USD 4.99");
    assert_eq!(products[1].period_label(), "1 month");

    // Purchase
    let coins = products[0].clone();
    let outcome = system.client.purchase(coins.clone()).await.unwrap();
    let Outcome::Purchased {
        product: Some(product),
        transaction,
    } = outcome.clone()
    else {
        panic!("Expected a completed purchase, got {:?}", outcome);
    };
    assert_eq!(product, coins);
    assert_eq!(outcome.event_tag(), Some(EventTag::NewPurchase));
    assert_eq!(feed.recv().await.unwrap(), outcome);
    assert_eq!(store.finished().await, vec![transaction.id.clone()]);

    // Restore: the seeded subscription and the coins just bought
    let outcome = system.client.restore_purchase().await.unwrap();
    assert_eq!(outcome, Outcome::Restored { transaction: None });
    let mut restored = Vec::new();
    for _ in 0..2 {
        match feed.recv().await.unwrap() {
            Outcome::Restored {
                transaction: Some(tx),
            } => restored.push(tx.product_id.0),
            other => panic!("Unexpected feed outcome: {:?}", other),
        }
    }
    restored.sort();
    assert_eq!(restored, vec!["coins.100", "pro.monthly"]);
    assert_eq!(store.finished().await.len(), 3);

    // Receipt: missing on disk, refreshed by the store, then cached
    let Outcome::ReceiptData { receipt } = system.client.get_purchase_receipt().await.unwrap() else {
        panic!("Expected receipt data");
    };
    let decoded = String::from_utf8(STANDARD.decode(&receipt).unwrap()).unwrap();
    assert!(decoded.starts_with("sandbox-receipt"));
    assert!(decoded.contains("coins.100"));
    assert!(config.receipt_path.exists());

    let again = system.client.get_purchase_receipt().await.unwrap();
    assert_eq!(again, Outcome::ReceiptData { receipt });

    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_declined_and_disabled_purchases() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let system = PurchaseSystem::new(&config, SandboxStore::new(catalog()).decline("gems.10"));
    let gems = Product::new("gems.10", "10 Gems", 1.99, "USD");
    let outcome = system.client.purchase(gems).await.unwrap();
    assert!(matches!(outcome, Outcome::PurchaseFailed { product: Some(_), .. }));
    assert_eq!(outcome.event_tag(), None);
    system.shutdown().await.unwrap();

    let system = PurchaseSystem::new(&config, SandboxStore::new(catalog()).with_payments_enabled(false));
    let coins = Product::new("coins.100", "100 Coins", 0.99, "USD");
    assert_eq!(system.client.purchase(coins).await.unwrap(), Outcome::PurchasingDisabled);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_receipt_refresh_without_store_support() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let system = PurchaseSystem::new(&config, SandboxStore::new(catalog()));

    let outcome = system.client.get_purchase_receipt().await.unwrap();
    assert!(matches!(outcome, Outcome::ReceiptRefreshFailed { .. }));
    assert!(outcome.is_failure());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_callbacks_complete_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let store = SandboxStore::new(catalog());
    let system = PurchaseSystem::new(&config, store.clone());
    let callbacks = system.callbacks();

    let (tx, rx) = oneshot::channel();
    callbacks
        .fetch_available_products(move |result| {
            let _ = tx.send(result);
        })
        .await
        .unwrap();
    assert_eq!(rx.await.unwrap(), Ok(Outcome::NeedsProductIds));

    callbacks
        .set_product_ids(vec!["gems.10".to_string()])
        .await
        .unwrap();
    let (tx, rx) = oneshot::channel();
    callbacks
        .purchase(Product::new("gems.10", "10 Gems", 1.99, "USD"), move |result| {
            let _ = tx.send(result);
        })
        .await
        .unwrap();
    let Ok(Outcome::Purchased { transaction, .. }) = rx.await.unwrap() else {
        panic!("Expected a completed purchase");
    };
    assert_eq!(store.finished().await, vec![transaction.id]);

    drop(callbacks);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_clone_delays_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let system = PurchaseSystem::new(&config, SandboxStore::new(catalog()));
    let client = system.client.clone();

    // A surviving clone keeps the adapter running
    let shutdown = tokio::spawn(system.shutdown());
    assert_eq!(
        client.fetch_available_products().await,
        Ok(Outcome::NeedsProductIds)
    );

    drop(client);
    shutdown.await.unwrap().unwrap();
}
