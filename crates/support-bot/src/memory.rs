//! Conversation sessions with bounded capacity and TTL eviction.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Sessions idle longer than this are dropped.
const DEFAULT_TTL_SECS: i64 = 30 * 60;

/// Maximum number of live sessions; the least recently active one is evicted
/// when a new session would exceed it.
const DEFAULT_CAPACITY: usize = 1024;

/// One question/answer exchange within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A conversation session and its turn history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub turns: Vec<ConversationTurn>,
}

/// In-process session store.
///
/// Bounded two ways: sessions idle past the TTL expire, and when the store is
/// full the least recently active session is evicted. Expired sessions are
/// pruned lazily on access rather than by a background task.
pub struct SessionStore {
    inner: Mutex<HashMap<Uuid, Session>>,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_limits(Duration::seconds(DEFAULT_TTL_SECS), DEFAULT_CAPACITY)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Create a new session and return its id.
    pub fn create(&self, user_id: Option<String>) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            last_active: now,
            turns: Vec::new(),
        };

        let mut sessions = self.lock();
        Self::prune_expired(&mut sessions, self.ttl);

        if sessions.len() >= self.capacity {
            if let Some(oldest) = sessions
                .values()
                .min_by_key(|s| s.last_active)
                .map(|s| s.id)
            {
                sessions.remove(&oldest);
                debug!("Session store full, evicted least recently active session");
            }
        }

        sessions.insert(session.id, session.clone());
        session
    }

    /// Look up a live session. Expired sessions read as absent.
    pub fn get(&self, id: Uuid) -> Option<Session> {
        let mut sessions = self.lock();
        Self::prune_expired(&mut sessions, self.ttl);
        sessions.get(&id).cloned()
    }

    /// Append a turn to a session, refreshing its activity time.
    ///
    /// Returns false when the session does not exist (or has expired).
    pub fn record_turn(&self, id: Uuid, turn: ConversationTurn) -> bool {
        let mut sessions = self.lock();
        Self::prune_expired(&mut sessions, self.ttl);

        match sessions.get_mut(&id) {
            Some(session) => {
                session.last_active = Utc::now();
                session.turns.push(turn);
                true
            }
            None => false,
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        let mut sessions = self.lock();
        Self::prune_expired(&mut sessions, self.ttl);
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Session>> {
        // The map holds only conversation history; recover from poisoning.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn prune_expired(sessions: &mut HashMap<Uuid, Session>, ttl: Duration) {
        let now = Utc::now();
        sessions.retain(|_, s| now.signed_duration_since(s.last_active) <= ttl);
    }

    #[cfg(test)]
    fn backdate(&self, id: Uuid, by: Duration) {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(&id) {
            session.last_active = session.last_active - by;
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new();
        let session = store.create(Some("user-1".to_string()));

        let fetched = store.get(session.id).unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.user_id.as_deref(), Some("user-1"));
        assert!(fetched.turns.is_empty());
    }

    #[test]
    fn test_unknown_session_is_absent() {
        let store = SessionStore::new();
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_record_turn_appends_history() {
        let store = SessionStore::new();
        let session = store.create(None);

        assert!(store.record_turn(
            session.id,
            ConversationTurn::new("What are the fees?", "Transfers are free."),
        ));
        assert!(store.record_turn(
            session.id,
            ConversationTurn::new("And limits?", "5000 EUR per day."),
        ));

        let fetched = store.get(session.id).unwrap();
        assert_eq!(fetched.turns.len(), 2);
        assert_eq!(fetched.turns[0].query, "What are the fees?");
        assert_eq!(fetched.turns[1].response, "5000 EUR per day.");
    }

    #[test]
    fn test_record_turn_on_unknown_session_fails() {
        let store = SessionStore::new();
        assert!(!store.record_turn(Uuid::new_v4(), ConversationTurn::new("q", "a")));
    }

    #[test]
    fn test_record_turn_on_expired_session_fails() {
        let store = SessionStore::with_limits(Duration::seconds(60), 16);
        let session = store.create(None);

        store.backdate(session.id, Duration::seconds(120));

        assert!(!store.record_turn(session.id, ConversationTurn::new("q", "a")));
    }

    #[test]
    fn test_idle_session_expires() {
        let store = SessionStore::with_limits(Duration::seconds(60), 16);
        let session = store.create(None);

        store.backdate(session.id, Duration::seconds(120));

        assert!(store.get(session.id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recently_active() {
        let store = SessionStore::with_limits(Duration::seconds(3600), 2);
        let first = store.create(None);
        let second = store.create(None);

        // Make `first` the stalest session, then overflow the store.
        store.backdate(first.id, Duration::seconds(30));
        let third = store.create(None);

        assert!(store.get(first.id).is_none());
        assert!(store.get(second.id).is_some());
        assert!(store.get(third.id).is_some());
        assert_eq!(store.len(), 2);
    }
}
