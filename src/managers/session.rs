use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Sessions slide forward on every touch and lapse after this many hours.
const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            last_active: now,
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn extend(&mut self) {
        self.last_active = Utc::now();
        self.expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);
    }
}

#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn create_session(&self) -> Session {
        let session_id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(session_id);

        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        session
    }

    /// Returns the session if it is still live, sliding its expiry forward.
    /// Expired sessions are dropped on lookup.
    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.get_mut(session_id) {
            if session.is_expired() {
                sessions.remove(session_id);
                return None;
            }

            session.extend();
            Some(session.clone())
        } else {
            None
        }
    }

    pub async fn validate_session(&self, session_id: &str) -> bool {
        self.get_session(session_id).await.is_some()
    }

    /// Removes a session outright (logout). Returns whether it existed.
    pub async fn remove_session(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Drops lapsed sessions and returns their ids so the caller can tear
    /// down the trainer state that belonged to them.
    pub async fn cleanup_expired_sessions(&self) -> Vec<String> {
        let mut sessions = self.sessions.write().await;
        let mut removed = Vec::new();

        sessions.retain(|session_id, session| {
            if session.is_expired() {
                removed.push(session_id.clone());
                false
            } else {
                true
            }
        });

        removed
    }

    pub async fn get_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_created_session_validates() {
        let manager = SessionManager::new();
        let session = manager.create_session().await;

        assert!(manager.validate_session(&session.id).await);
        assert_eq!(manager.get_session_count().await, 1);
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped_on_lookup() {
        let manager = SessionManager::new();
        let session = manager.create_session().await;

        if let Some(s) = manager.sessions.write().await.get_mut(&session.id) {
            s.expires_at = Utc::now() - Duration::hours(1);
        }

        assert!(manager.get_session(&session.id).await.is_none());
        assert_eq!(manager.get_session_count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_session_is_logout() {
        let manager = SessionManager::new();
        let session = manager.create_session().await;

        assert!(manager.remove_session(&session.id).await);
        assert!(!manager.remove_session(&session.id).await);
        assert!(!manager.validate_session(&session.id).await);
    }

    #[tokio::test]
    async fn test_cleanup_returns_removed_ids() {
        let manager = SessionManager::new();
        let stale = manager.create_session().await;
        let live = manager.create_session().await;

        if let Some(s) = manager.sessions.write().await.get_mut(&stale.id) {
            s.expires_at = Utc::now() - Duration::minutes(1);
        }

        let removed = manager.cleanup_expired_sessions().await;
        assert_eq!(removed, vec![stale.id]);
        assert!(manager.validate_session(&live.id).await);
    }
}
