//! # Adapter Messages
//!
//! Requests sent from a [`PurchaseClient`](crate::clients::PurchaseClient) to
//! the [`PurchaseActor`](super::PurchaseActor). Each carries its own one-shot
//! responder, so every caller is answered independently and at most once.

use super::error::AdapterError;
use crate::model::{Outcome, Product, ProductId};
use std::collections::BTreeSet;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the adapter.
pub type Response<T> = oneshot::Sender<Result<T, AdapterError>>;

#[derive(Debug)]
pub enum AdapterRequest {
    SetProductIds {
        ids: BTreeSet<ProductId>,
        respond_to: Response<()>,
    },
    FetchProducts {
        respond_to: Response<Outcome>,
    },
    Purchase {
        product: Product,
        respond_to: Response<Outcome>,
    },
    Restore {
        respond_to: Response<Outcome>,
    },
    Receipt {
        respond_to: Response<Outcome>,
    },
}
