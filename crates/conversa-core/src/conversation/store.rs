//! In-memory conversation store with bounded, session-scoped history.
//!
//! Each session maps to an ordered message list behind its own mutex, so
//! operations on distinct sessions never block one another while operations
//! on the same session serialize. Two retention policies apply:
//!
//! - **Window bound:** at most `memory_window` most-recent messages per
//!   conversation; oldest evicted first.
//! - **Idle expiry:** conversations untouched for longer than `idle_expiry`
//!   are dropped, checked on access and by [`ConversationStore::sweep`].
//!   Beyond `max_sessions` tracked conversations, the least-recently-accessed
//!   ones are evicted first.
//!
//! Timestamps use `tokio::time::Instant` so eviction can be exercised under
//! a paused test clock. Process exit discards everything; persistence is
//! out of scope.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use conversa_types::llm::{Message, MessageRole};

/// One session's retained history plus its access timestamp.
struct Conversation {
    messages: VecDeque<Message>,
    last_access: Instant,
}

impl Conversation {
    fn new() -> Self {
        Self {
            messages: VecDeque::new(),
            last_access: Instant::now(),
        }
    }
}

/// Session-keyed conversation store.
///
/// Owns all conversation data exclusively. Cheap to share via `Arc`.
pub struct ConversationStore {
    conversations: DashMap<Uuid, Arc<Mutex<Conversation>>>,
    memory_window: usize,
    idle_expiry: Duration,
    max_sessions: usize,
}

impl ConversationStore {
    /// Create a store with the given retention settings.
    pub fn new(memory_window: usize, idle_expiry: Duration, max_sessions: usize) -> Self {
        Self {
            conversations: DashMap::new(),
            memory_window,
            idle_expiry,
            max_sessions,
        }
    }

    /// Append a single message, creating the conversation if absent.
    ///
    /// Always succeeds. The window bound is enforced after the append.
    pub async fn append(&self, session_id: Uuid, message: Message) {
        let entry = self.entry(session_id);
        let mut conv = entry.lock().await;
        conv.messages.push_back(message);
        conv.last_access = Instant::now();
        Self::enforce_window(&mut conv.messages, self.memory_window);
    }

    /// Append a full user/assistant exchange under one lock.
    ///
    /// This is the commit path the orchestrator uses: holding the
    /// per-session lock across both pushes means concurrent turns can never
    /// interleave into a non-alternating sequence.
    pub async fn append_exchange(&self, session_id: Uuid, user: Message, assistant: Message) {
        let entry = self.entry(session_id);
        let mut conv = entry.lock().await;
        conv.messages.push_back(user);
        conv.messages.push_back(assistant);
        conv.last_access = Instant::now();
        Self::enforce_window(&mut conv.messages, self.memory_window);
    }

    /// Ordered retained messages for a session; empty if unknown or expired.
    ///
    /// Reading refreshes the access time used for idle eviction.
    pub async fn history(&self, session_id: &Uuid) -> Vec<Message> {
        let Some(entry) = self.conversations.get(session_id).map(|e| e.value().clone()) else {
            return Vec::new();
        };

        let mut conv = entry.lock().await;
        if conv.last_access.elapsed() > self.idle_expiry {
            drop(conv);
            self.conversations.remove(session_id);
            debug!(session_id = %session_id, "conversation expired on read");
            return Vec::new();
        }
        conv.last_access = Instant::now();
        conv.messages.iter().cloned().collect()
    }

    /// Remove all messages for a session. No-op for unknown identifiers.
    pub async fn clear(&self, session_id: &Uuid) {
        if self.conversations.remove(session_id).is_some() {
            debug!(session_id = %session_id, "conversation cleared");
        }
    }

    /// Number of currently tracked sessions.
    pub fn session_count(&self) -> usize {
        self.conversations.len()
    }

    /// Drop idle conversations and enforce the tracked-session cap.
    ///
    /// Called periodically by the sweeper task spawned at startup, and safe
    /// to call from anywhere. Beyond `max_sessions`, the least-recently
    /// accessed conversations go first.
    pub async fn sweep(&self) {
        // Snapshot the entries before locking: map guards must not be held
        // across an await.
        let entries: Vec<(Uuid, Arc<Mutex<Conversation>>)> = self
            .conversations
            .iter()
            .map(|item| (*item.key(), item.value().clone()))
            .collect();

        let mut survivors: Vec<(Uuid, Instant)> = Vec::new();
        let mut expired: Vec<Uuid> = Vec::new();

        for (id, entry) in entries {
            let conv = entry.lock().await;
            if conv.last_access.elapsed() > self.idle_expiry {
                expired.push(id);
            } else {
                survivors.push((id, conv.last_access));
            }
        }

        for id in &expired {
            self.conversations.remove(id);
        }

        if survivors.len() > self.max_sessions {
            survivors.sort_by_key(|(_, last_access)| *last_access);
            let excess = survivors.len() - self.max_sessions;
            for (id, _) in survivors.iter().take(excess) {
                self.conversations.remove(id);
            }
            debug!(evicted = excess, "session cap enforced");
        }

        if !expired.is_empty() {
            debug!(expired = expired.len(), "idle conversations swept");
        }
    }

    /// Spawn a background task that sweeps at the given interval.
    pub fn start_sweeper(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                store.sweep().await;
            }
        })
    }

    fn entry(&self, session_id: Uuid) -> Arc<Mutex<Conversation>> {
        self.conversations
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(Conversation::new())))
            .value()
            .clone()
    }

    /// Drop oldest messages beyond the window, then realign the front to a
    /// user turn so the retained sequence still starts at `user`.
    fn enforce_window(messages: &mut VecDeque<Message>, window: usize) {
        while messages.len() > window {
            messages.pop_front();
        }
        while matches!(
            messages.front(),
            Some(m) if m.role == MessageRole::Assistant
        ) {
            messages.pop_front();
        }
    }
}
