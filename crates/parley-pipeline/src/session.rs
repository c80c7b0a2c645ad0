//! In-memory conversation history keyed by session id.

use parley_types::ConversationTurn;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

/// Shared handle to one session's turns.
///
/// Holding the lock serializes every mutation of that session; other
/// sessions are unaffected.
pub type SessionHandle = Arc<Mutex<Vec<ConversationTurn>>>;

/// Process-lifetime store of conversation histories.
///
/// The map uses `std::sync::RwLock` because its critical sections are brief
/// HashMap operations that never span `.await`. Each session's turns sit
/// behind a `tokio::sync::Mutex` so a caller can hold it across a provider
/// call.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `session_id`, creating an empty session on
    /// first reference.
    pub fn session(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
        {
            return handle.clone();
        }

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Appends a turn, creating the session if needed.
    pub async fn append(&self, session_id: &str, turn: ConversationTurn) {
        let handle = self.session(session_id);
        handle.lock().await.push(turn);
    }

    /// Returns a snapshot of the session's turns in insertion order.
    ///
    /// An unknown session yields an empty history and is not created.
    pub async fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        let handle = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned();

        match handle {
            Some(handle) => handle.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// Number of sessions referenced so far.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
