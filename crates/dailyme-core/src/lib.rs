//! Core types, storage trait and state containers for the dailyme hydration
//! tracker.
//!
//! This crate is free of database dependencies. Storage backends implement
//! [`store::HydrationStore`]; front ends drive [`state::LogState`] and
//! [`state::SettingsState`] and subscribe to their snapshots.

// Native `async fn` in traits; see `store.rs` for the `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod date;
pub mod entry;
pub mod error;
pub mod export;
pub mod memory;
pub mod progress;
pub mod settings;
pub mod state;
pub mod store;
pub mod summary;

pub use error::{Error, Result};
