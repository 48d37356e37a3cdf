//! # Adapter Errors
//!
//! Infrastructure failures of the adapter itself. Domain results, including
//! store-reported failures, travel as [`Outcome`](crate::model::Outcome)s.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdapterError {
    /// The adapter task is gone; the request was never delivered.
    #[error("Adapter closed")]
    ActorClosed,

    /// The adapter stopped before answering.
    #[error("Adapter dropped response channel")]
    ActorDropped,

    /// A request of the same kind is already in flight.
    #[error("Request already pending: {0}")]
    AlreadyPending(String),
}
