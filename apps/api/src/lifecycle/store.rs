use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::lifecycle::orchestrator::ScanSession;

/// In-memory registry of visitor sessions. Nothing is persisted: a restart
/// forgets every session, as a page reload would.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<ScanSession>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn create(&self) -> Arc<ScanSession> {
        self.prune_idle(Utc::now()).await;

        let session = Arc::new(ScanSession::new());
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id(), Arc::clone(&session));
        info!("Created session {} ({} live)", session.id(), sessions.len());
        session
    }

    /// Looks a session up and marks it active.
    pub async fn get(&self, id: Uuid) -> Option<Arc<ScanSession>> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        session.touch();
        Some(session)
    }

    /// Drops sessions idle longer than the TTL. A session with an upload or
    /// analysis in flight is never dropped.
    pub async fn prune_idle(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_busy() || now - session.last_active() <= self.ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!("Pruned {pruned} idle sessions");
        }
        pruned
    }
}
