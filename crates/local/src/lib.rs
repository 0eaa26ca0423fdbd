//! preview-comments-local: a storage adapter over a pluggable
//! key-value store, for working on threads without a remote backend.
//!
//! All threads live under a single key as one JSON document. A failing
//! store degrades to an in-memory fallback so a review session keeps
//! working even when persistence does not.

pub mod adapter;
pub mod store;

pub use adapter::{LocalAdapter, DEFAULT_STORAGE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreUnavailable};
