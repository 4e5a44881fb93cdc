//! # proppixapp
//!
//! Photo collections of real-estate listings: an editing session that mixes stored
//! photos with freshly picked files, and a reconciler that applies the session to a
//! blob store and a record store.
//!
//! ## Layering
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  API (api.rs)        gate, boundary validation, *_now ops │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌───────────────────────────────────────────────────────────┐
//! │  Editor (editor.rs)  single-flight save                   │
//! │  Session (session.rs) ordered items + pending deletions   │
//! │  Reconciler (sync.rs) drain, walk, release                │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌───────────────────────────────────────────────────────────┐
//! │  Stores (store/)     BlobStore, PhotoRecords, SessionGate │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is UI agnostic: no terminal I/O, no process exits. Clients render
//! the returned values themselves.

pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;
pub mod session;
pub mod store;
pub mod sync;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
