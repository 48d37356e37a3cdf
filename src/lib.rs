//! # Purchase Adapter
//!
//! > **An actor-based facade over a platform purchasing service.**
//!
//! This crate wraps an in-app purchase store (catalog lookup, payment
//! authorization, transaction persistence, receipts) behind a small async
//! API: list products, buy one, restore prior purchases, fetch the receipt.
//! The store itself is a black box reached through the [`StoreService`]
//! trait; everything interesting about payments happens on its side.
//!
//! ## 🏗️ Design
//!
//! ### One actor, two inputs
//! The adapter is a single Tokio task ([`PurchaseActor`]) that owns all session
//! state. It reads client requests and store notifications from two channels
//! and handles them one at a time, so its maps need no locks.
//!
//! ### One responder per request
//! Every call carries its own `oneshot` responder, keyed in the actor by a
//! generated [`RequestId`](store::RequestId) or by product id. A responder is
//! used exactly once. Calls that would collide with one already in flight
//! (a second purchase of the same product, a second restore) are rejected
//! with [`AdapterError::AlreadyPending`](adapter::AdapterError::AlreadyPending)
//! instead of replacing the first caller.
//!
//! ### Failures are outcomes
//! Unmet preconditions and store-reported failures resolve to
//! [`Outcome`](model::Outcome) variants (`NeedsProductIds`,
//! `PurchaseFailed`, `ReceiptRefreshFailed`, ...). Nothing panics and nothing
//! is dropped silently. There are no timeouts: a store that never answers
//! leaves the call pending.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Adapter ([`adapter`])
//! - **Role**: The actor loop, its messages, and transaction state dispatch.
//! - **Key items**: [`PurchaseActor`], [`adapter::new`].
//!
//! ### 2. The Interface ([`clients`])
//! - **Role**: [`PurchaseClient`](clients::PurchaseClient) (async) and
//!   [`PurchaseCallbacks`](clients::PurchaseCallbacks) (completion callbacks).
//!
//! ### 3. The Boundary ([`store`])
//! - **Role**: [`StoreService`], [`StoreEvent`](store::StoreEvent), receipt
//!   access, plus the sandbox and mock stores.
//!
//! ### 4. The Data ([`model`])
//! - **Role**: Products, transactions and outcomes.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! - **Role**: [`PurchaseSystem`](lifecycle::PurchaseSystem), configuration
//!   and tracing setup.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the sandbox demo with info logs
//! RUST_LOG=info cargo run
//!
//! cargo test
//! ```
//!
//! [`PurchaseActor`]: adapter::PurchaseActor
//! [`StoreService`]: store::StoreService

pub mod adapter;
pub mod clients;
pub mod lifecycle;
pub mod model;
pub mod store;
