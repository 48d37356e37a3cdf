//! The purchase adapter: an actor mediating between client calls and store
//! notifications.

mod actor;
pub mod dispatch;
pub mod error;
pub mod message;

pub use actor::PurchaseActor;
pub use error::*;
pub use message::*;

use crate::clients::PurchaseClient;
use crate::lifecycle::AdapterConfig;
use crate::store::{ReceiptSource, StoreService};
use tokio::sync::{broadcast, mpsc};

/// Creates a purchase actor and its client, and attaches `store` to the
/// actor's notification channel.
pub fn new<S: StoreService, R: ReceiptSource>(
    config: &AdapterConfig,
    store: S,
    receipts: R,
) -> (PurchaseActor<S, R>, PurchaseClient) {
    let (sender, receiver) = mpsc::channel(config.request_buffer);
    let (event_sender, events) = mpsc::channel(config.event_buffer);
    let (feed, _) = broadcast::channel(config.feed_capacity);

    store.attach(event_sender);

    let actor = PurchaseActor::new(receiver, events, feed.clone(), store, receipts);
    let client = PurchaseClient::new(sender, feed);
    (actor, client)
}
