//! Session store
//!
//! Keyed, in-memory conversation state. Each session key owns exactly one
//! conversation, created on first access and never evicted by the core.
//!
//! Every session carries a turn guard: a turn acquires it with `try_lock`,
//! so a second turn submitted while one is in flight is rejected immediately
//! instead of interleaving writes to the same conversation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::agent::conversation::Conversation;
use crate::core::{Result, SavantError};

/// Keyed in-memory store of conversations
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<AsyncMutex<Conversation>>>>,
}

/// Exclusive hold on one session for the duration of a turn
///
/// Dropping the guard without calling [`TurnGuard::commit`] leaves the
/// stored conversation untouched, which is how failed or cancelled turns
/// discard their partial state.
pub struct TurnGuard {
    guard: OwnedMutexGuard<Conversation>,
}

impl TurnGuard {
    /// Snapshot of the conversation at turn start
    pub fn snapshot(&self) -> Conversation {
        self.guard.clone()
    }

    /// Replace the stored conversation with the completed turn's history
    pub fn commit(mut self, conversation: Conversation) {
        *self.guard = conversation;
    }
}

impl SessionStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, session_key: &str) -> Arc<AsyncMutex<Conversation>> {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions.entry(session_key.to_string()).or_default().clone()
    }

    /// Get a snapshot of a session's conversation, creating an empty one on
    /// first access. Reads are idempotent: they never mutate stored state
    /// beyond materializing the empty conversation.
    pub async fn get(&self, session_key: &str) -> Conversation {
        self.slot(session_key).lock().await.clone()
    }

    /// Replace a session's conversation
    pub async fn save(&self, session_key: &str, conversation: Conversation) {
        *self.slot(session_key).lock().await = conversation;
    }

    /// Acquire the session's turn guard, or fail fast if a turn is already
    /// in flight for this key
    pub fn begin_turn(&self, session_key: &str) -> Result<TurnGuard> {
        self.slot(session_key)
            .try_lock_owned()
            .map(|guard| TurnGuard { guard })
            .map_err(|_| SavantError::SessionBusy(session_key.to_string()))
    }

    /// Number of sessions created so far
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session store lock poisoned").len()
    }

    /// Check if no session has been created yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
