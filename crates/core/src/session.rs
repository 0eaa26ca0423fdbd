//! Observable session state shared with the presentation layer.
//!
//! Synchronous notification: `update` applies the mutation, snapshots
//! the new state, then invokes every listener outside the lock.
//! Listeners must not call `update` from their own callback; no
//! re-entrancy guard is provided.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::Thread;

/// What the widget is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Commenting,
}

/// The authenticated reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub avatar_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub threads: Vec<Thread>,
    pub mode: Mode,
    pub user: Option<User>,
    pub active_thread_id: Option<String>,
}

/// Handle returned by [`SessionStore::subscribe`]; pass it back to
/// [`SessionStore::unsubscribe`] to release the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&State) + Send + Sync>;

#[derive(Default)]
struct Inner {
    state: State,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

/// Small observable state container.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<Inner>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> State {
        self.lock().state.clone()
    }

    /// Apply a mutation, then notify every listener with the new state.
    pub fn update(&self, apply: impl FnOnce(&mut State)) {
        let (snapshot, listeners) = {
            let mut inner = self.lock();
            apply(&mut inner.state);
            let listeners: Vec<Listener> = inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (inner.state.clone(), listeners)
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&State) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push((id, Arc::new(listener)));
        SubscriptionId(id)
    }

    /// Release a listener. Idempotent: a second call with the same id
    /// is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.lock();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id.0);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
