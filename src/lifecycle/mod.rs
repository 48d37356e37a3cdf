//! # Lifecycle & Orchestration
//!
//! Starting, wiring and stopping the purchase adapter, plus the ambient
//! pieces every binary needs once: configuration and tracing.
//!
//! ## Wiring
//!
//! [`adapter::new`](crate::adapter::new) creates the actor and its client and
//! attaches the store to the actor's notification channel. [`PurchaseSystem`]
//! then spawns the actor's `run` loop in its own Tokio task.
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all clients** - closes the request channel
//! 2. **Actor detects closure** - `receiver.recv()` returns `None`
//! 3. **Await completion** - [`PurchaseSystem::shutdown`] joins the task
//!
//! Clones of the client held elsewhere keep the adapter alive, and so does
//! every in-flight call, since the caller holds a clone while it waits.
//! Shutdown therefore waits for those calls to be answered by the store.

pub mod config;
pub mod purchase_system;
pub mod tracing;

pub use self::config::*;
pub use self::purchase_system::*;
pub use self::tracing::*;
