//! Session store: key-value lookup of sessions by code.
//!
//! The engine only needs get/insert/remove by code; the trait keeps the
//! core testable without a process-wide singleton and leaves room for a
//! cache- or database-backed implementation. Each session is handed out
//! behind its own `Mutex`, which is the per-session exclusivity discipline:
//! at most one mutating operation per code runs at a time, while distinct
//! codes proceed fully in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::state::game::Session;

/// Shared handle to one session's state, serialized by its own lock.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Key-value storage of sessions by code.
pub trait SessionStore: Send + Sync {
    /// Look up a session handle by code.
    fn get(&self, code: &str) -> Option<SessionHandle>;

    /// Insert a freshly created session. Returns `false` (and leaves the
    /// store untouched) if the code is already taken.
    fn insert(&self, session: Session) -> bool;

    /// Drop a session entirely.
    fn remove(&self, code: &str);

    /// Number of live sessions.
    fn len(&self) -> usize;

    /// Whether the store holds no sessions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryStore {
    sessions: DashMap<String, SessionHandle>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, code: &str) -> Option<SessionHandle> {
        self.sessions.get(code).map(|entry| entry.value().clone())
    }

    fn insert(&self, session: Session) -> bool {
        let code = session.code.clone();
        match self.sessions.entry(code) {
            dashmap::Entry::Occupied(_) => false,
            dashmap::Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(session)));
                true
            }
        }
    }

    fn remove(&self, code: &str) {
        self.sessions.remove(code);
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}
