//! MCP session ids issued on `initialize`.
//!
//! Hosts often re-initialize without sending `DELETE /mcp`, so ids expire
//! after a period without use and the table is capped; the least recently
//! used id is dropped first.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

pub struct SessionStore {
    ttl: Duration,
    capacity: usize,
    /// Session id -> last time it was issued or used
    sessions: RwLock<HashMap<String, Instant>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a fresh session id.
    pub async fn issue(&self) -> String {
        self.issue_at(Instant::now()).await
    }

    /// Mark a session as used. Returns `false` if it is unknown or expired.
    pub async fn touch(&self, id: &str) -> bool {
        self.touch_at(id, Instant::now()).await
    }

    /// End a session. Returns `false` if it was not live.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn issue_at(&self, now: Instant) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, last_seen| now.saturating_duration_since(*last_seen) < self.ttl);

        while sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, last_seen)| **last_seen)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} stale MCP sessions", evicted);
        }

        sessions.insert(id.clone(), now);
        id
    }

    async fn touch_at(&self, id: &str, now: Instant) -> bool {
        let mut sessions = self.sessions.write().await;
        let live = match sessions.get(id) {
            Some(last_seen) => now.saturating_duration_since(*last_seen) < self.ttl,
            None => return false,
        };
        if live {
            sessions.insert(id.to_string(), now);
        } else {
            sessions.remove(id);
        }
        live
    }
}
