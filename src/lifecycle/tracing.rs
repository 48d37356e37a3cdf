//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//! The format is compact and hides the module prefix (`with_target(false)`);
//! the structured fields (`request`, `product_id`, `transaction_id`) carry the
//! context instead.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Adapter lifecycle and finished transactions
//! RUST_LOG=info cargo run
//!
//! # Every request, lookup and in-flight transaction
//! RUST_LOG=debug cargo run
//!
//! # Only the adapter internals
//! RUST_LOG=purchase_adapter::adapter=debug cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Purchase adapter started
//! INFO Products received request=request_1
//! INFO Transaction observer added
//! INFO Transaction finished transaction_id=sandbox_tx_1001 product_id=coins.100 state=Purchased
//! INFO Restore finished
//! INFO Receipt refreshed request=request_2 available=true
//! INFO Shutdown pending=0
//! ```
//!
//! **With `RUST_LOG=debug`** the client spans show up inline, e.g.
//! `purchase{product_id=coins.100}: Sending request`, followed by the
//! adapter's `Purchase` and `Transaction in flight` lines.

/// Installs the global subscriber. Call once, at program start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
