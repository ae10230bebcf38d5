//! Core types, traits, and the rotation engine for the Lexis vocabulary
//! service.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::VocabStore`]; word-generation backends
//! implement [`oracle::WordOracle`]. The [`engine::Engine`] ties the two
//! together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod engine;
pub mod error;
pub mod ledger;
pub mod matcher;
pub mod memory;
pub mod oracle;
pub mod parse;
pub mod record;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
