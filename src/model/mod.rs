//! Plain data exchanged between the adapter, its callers and the store service.

pub mod outcome;
pub mod product;
pub mod transaction;

pub use outcome::*;
pub use product::*;
pub use transaction::*;
