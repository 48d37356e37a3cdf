//! Type-safe interfaces to the purchase adapter.

pub mod callbacks;
pub mod purchase_client;

pub use callbacks::*;
pub use purchase_client::*;
