//! Core types and trait definitions for the tally attendance tracker.
//!
//! No HTTP, no database: the other crates all depend on this one, and this
//! one depends only on hashing and serialization primitives.

// Backends implement the store trait with native `async fn`; suppress the
// advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cycle;
pub mod digest;
pub mod error;
pub mod record;
pub mod register;
pub mod scan;
pub mod store;

pub use error::{Error, Result};
