//! Storage adapter capability contract.
//!
//! Implemented by the issue-comment-backed remote adapter and the
//! local key-value-backed adapter; consumed by the presentation layer
//! through this trait alone.

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::types::{Comment, PinAnchor, Thread};

/// CRUD over threads and comments.
///
/// All operations may suspend on I/O and return an error rather than
/// failing silently. A thread is created atomically with its first
/// comment; removing the last comment removes the thread.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// All threads in the backing store, unrelated records filtered out.
    async fn get_threads(&self) -> Result<Vec<Thread>, AdapterError>;

    /// Create a thread with its first comment.
    async fn create_thread(&self, anchor: PinAnchor, body: &str)
        -> Result<Thread, AdapterError>;

    /// Toggle a thread's resolved flag.
    async fn resolve_thread(&self, thread_id: &str) -> Result<(), AdapterError>;

    async fn delete_thread(&self, thread_id: &str) -> Result<(), AdapterError>;

    /// Append a reply to an existing thread.
    async fn add_comment(&self, thread_id: &str, body: &str) -> Result<Comment, AdapterError>;

    /// Replace a comment's body in place.
    async fn edit_comment(&self, comment_id: &str, body: &str) -> Result<Comment, AdapterError>;

    /// Remove a comment; removing the last one deletes the thread.
    async fn delete_comment(&self, comment_id: &str) -> Result<(), AdapterError>;
}
