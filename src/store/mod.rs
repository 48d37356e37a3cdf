//! # Store Service Boundary
//!
//! The store service (catalog lookup, payment authorization, transaction
//! persistence) is a black box. The adapter reaches it only through the
//! [`StoreService`] trait and hears back only through [`StoreEvent`]s pushed
//! into the channel handed over by [`StoreService::attach`].
//!
//! ## Implementations
//!
//! - [`sandbox::SandboxStore`]: in-process store with a fixed catalog that
//!   answers asynchronously. Used by the demo binary and end-to-end tests.
//! - [`mock::MockStore`]: records every call and lets tests inject events at
//!   chosen points.
//!
//! The local receipt lives outside the store proper and is read through
//! [`ReceiptSource`] (see [`receipt`]).

pub mod mock;
pub mod receipt;
pub mod sandbox;

pub use receipt::{FileReceiptSource, ReceiptError, ReceiptSource};

use crate::model::{Payment, Product, ProductId, Transaction};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt::Display;
use tokio::sync::mpsc;

/// Identifier the adapter attaches to every store request that completes
/// through its own notification (product lookups, receipt refreshes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "request_{}", self.0)
    }
}

/// Asynchronous notifications from the store service.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Answer to [`StoreService::request_products`].
    ProductsResponse {
        request: RequestId,
        products: Vec<Product>,
        invalid_identifiers: Vec<ProductId>,
    },
    /// One or more transactions on the payment queue changed state.
    TransactionsUpdated(Vec<Transaction>),
    /// All transactions requested by a restore have been delivered.
    RestoreFinished,
    RestoreFailed { reason: String },
    /// A keyed request (receipt refresh, product lookup) completed.
    RequestFinished { request: RequestId },
    RequestFailed { request: RequestId, reason: String },
}

pub type StoreEventSender = mpsc::Sender<StoreEvent>;

/// The store service client library, as seen by the adapter.
///
/// Calls only submit work; results come back later as [`StoreEvent`]s.
#[async_trait]
pub trait StoreService: Send + Sync + 'static {
    /// Hands the store the channel it must deliver notifications to.
    fn attach(&self, events: StoreEventSender);

    /// Whether the device/account is allowed to make payments.
    fn can_make_payments(&self) -> bool;

    /// Starts delivering [`StoreEvent::TransactionsUpdated`] notifications.
    async fn add_transaction_observer(&self);

    async fn request_products(&self, request: RequestId, ids: BTreeSet<ProductId>);

    async fn add_payment(&self, payment: Payment);

    /// Removes a transaction in a final state from the payment queue.
    async fn finish_transaction(&self, transaction: &Transaction);

    async fn restore_completed_transactions(&self);

    async fn refresh_receipt(&self, request: RequestId);
}
