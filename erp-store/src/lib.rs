//! Read-only keyed dataset answering the assistant's business queries.
//!
//! A [`LookupStore`] is built once from a [`Dataset`] and never mutated
//! afterwards, so it can be shared behind an `Arc` by any number of
//! concurrent callers without locking.

#![warn(missing_docs, clippy::pedantic)]

mod dataset;
mod error;
mod store;

pub use dataset::Dataset;
pub use error::{StoreError, StoreResult};
pub use store::LookupStore;
