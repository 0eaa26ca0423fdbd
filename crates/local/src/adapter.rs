//! Local storage adapter.
//!
//! Threads are kept as one JSON document under a single key. Every
//! operation does a full load-modify-save; the document doubles as an
//! in-memory fallback, so a broken store degrades to a working
//! session-scoped adapter instead of failing review outright.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use preview_comments_core::adapter::Adapter;
use preview_comments_core::error::AdapterError;
use preview_comments_core::types::{Author, Comment, PinAnchor, Thread};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::KeyValueStore;

pub const DEFAULT_STORAGE_KEY: &str = "preview-comments:local-threads";

const DEFAULT_AUTHOR: &str = "Local Reviewer";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedState {
    threads: Vec<Thread>,
}

pub struct LocalAdapter {
    store: Box<dyn KeyValueStore>,
    key: String,
    author: String,
    fallback: Mutex<PersistedState>,
}

impl LocalAdapter {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: DEFAULT_STORAGE_KEY.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            fallback: Mutex::new(PersistedState::default()),
        }
    }

    /// Use a different key, so several preview sessions can share one
    /// store without seeing each other's threads.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Display name stamped on comments this adapter creates.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    fn fallback_lock(&self) -> std::sync::MutexGuard<'_, PersistedState> {
        match self.fallback.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn load_state(&self) -> PersistedState {
        let raw = match self.store.load(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.fallback_lock().clone(),
            Err(err) => {
                debug!(key = %self.key, error = %err, "store unreadable, using fallback");
                return self.fallback_lock().clone();
            }
        };
        match serde_json::from_str::<PersistedState>(&raw) {
            Ok(state) => {
                *self.fallback_lock() = state.clone();
                state
            }
            Err(err) => {
                debug!(key = %self.key, error = %err, "stored document corrupt, using fallback");
                self.fallback_lock().clone()
            }
        }
    }

    fn save_state(&self, state: &PersistedState) {
        *self.fallback_lock() = state.clone();
        let raw = match serde_json::to_string(state) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "could not serialize threads");
                return;
            }
        };
        if let Err(err) = self.store.store(&self.key, &raw) {
            // Fallback already holds the new state; the session goes on.
            warn!(key = %self.key, error = %err, "could not persist threads");
        }
    }

    fn with_state<T>(
        &self,
        update: impl FnOnce(&mut PersistedState) -> Result<T, AdapterError>,
    ) -> Result<T, AdapterError> {
        let mut state = self.load_state();
        let result = update(&mut state)?;
        self.save_state(&state);
        Ok(result)
    }

    fn author(&self) -> Author {
        Author {
            name: self.author.clone(),
            avatar_url: String::new(),
        }
    }
}

fn generate_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4())
}

fn thread_mut<'a>(
    state: &'a mut PersistedState,
    thread_id: &str,
) -> Result<&'a mut Thread, AdapterError> {
    state
        .threads
        .iter_mut()
        .find(|thread| thread.id == thread_id)
        .ok_or_else(|| AdapterError::ThreadNotFound {
            id: thread_id.to_string(),
        })
}

#[async_trait]
impl Adapter for LocalAdapter {
    async fn get_threads(&self) -> Result<Vec<Thread>, AdapterError> {
        Ok(self.load_state().threads)
    }

    async fn create_thread(
        &self,
        anchor: PinAnchor,
        body: &str,
    ) -> Result<Thread, AdapterError> {
        let thread_id = generate_id("thread");
        let thread = Thread {
            id: thread_id.clone(),
            anchor,
            comments: vec![Comment {
                id: generate_id("comment"),
                thread_id,
                author: self.author(),
                body: body.to_string(),
                created_at: Utc::now(),
                resolved: false,
            }],
            resolved: false,
            created_at: Utc::now(),
        };
        self.with_state(|state| {
            state.threads.push(thread.clone());
            Ok(thread)
        })
    }

    async fn resolve_thread(&self, thread_id: &str) -> Result<(), AdapterError> {
        self.with_state(|state| {
            let thread = thread_mut(state, thread_id)?;
            thread.resolved = !thread.resolved;
            Ok(())
        })
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), AdapterError> {
        self.with_state(|state| {
            let before = state.threads.len();
            state.threads.retain(|thread| thread.id != thread_id);
            if state.threads.len() == before {
                return Err(AdapterError::ThreadNotFound {
                    id: thread_id.to_string(),
                });
            }
            Ok(())
        })
    }

    async fn add_comment(&self, thread_id: &str, body: &str) -> Result<Comment, AdapterError> {
        let comment = Comment {
            id: generate_id("comment"),
            thread_id: thread_id.to_string(),
            author: self.author(),
            body: body.to_string(),
            created_at: Utc::now(),
            resolved: false,
        };
        self.with_state(|state| {
            let thread = thread_mut(state, thread_id)?;
            thread.comments.push(comment.clone());
            Ok(comment)
        })
    }

    async fn edit_comment(&self, comment_id: &str, body: &str) -> Result<Comment, AdapterError> {
        self.with_state(|state| {
            let comment = state
                .threads
                .iter_mut()
                .flat_map(|thread| thread.comments.iter_mut())
                .find(|comment| comment.id == comment_id)
                .ok_or_else(|| AdapterError::CommentNotFound {
                    id: comment_id.to_string(),
                })?;
            comment.body = body.to_string();
            Ok(comment.clone())
        })
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<(), AdapterError> {
        self.with_state(|state| {
            let thread = state
                .threads
                .iter_mut()
                .find(|thread| thread.comments.iter().any(|c| c.id == comment_id))
                .ok_or_else(|| AdapterError::CommentNotFound {
                    id: comment_id.to_string(),
                })?;
            thread.comments.retain(|c| c.id != comment_id);
            // A thread with no comments is gone, not empty.
            state.threads.retain(|thread| !thread.comments.is_empty());
            Ok(())
        })
    }
}
