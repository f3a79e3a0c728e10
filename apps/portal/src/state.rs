use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::gateway::ApiGateway;
use crate::navigation::PageController;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: ApiGateway,
    pub sessions: Arc<SessionRegistry>,
    /// Page registry with a view per page.
    pub pages: Arc<PageController>,
}

impl AppState {
    pub fn new(config: Config, gateway: ApiGateway, pages: PageController) -> Self {
        Self {
            config,
            gateway,
            sessions: Arc::new(SessionRegistry::new()),
            pages: Arc::new(pages),
        }
    }
}

/// One isolated `SessionStore` per browser, keyed by the session cookie.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, Arc<SessionStore>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `id`, or a fresh one under a new id when `id`
    /// is absent or unknown (e.g. pruned). The flag is true for new sessions.
    pub fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, Arc<SessionStore>, bool) {
        if let Some(id) = id {
            if let Some(store) = self.sessions.get(&id) {
                return (id, Arc::clone(store.value()), false);
            }
        }
        let id = Uuid::new_v4();
        let store = Arc::new(SessionStore::new());
        self.sessions.insert(id, Arc::clone(&store));
        debug!("Created session {id}");
        (id, store, true)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Drops sessions idle for longer than `ttl`. Returns how many were removed.
    pub fn prune_idle(&self, ttl: Duration) -> usize {
        let ttl_seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let before = self.sessions.len();
        self.sessions.retain(|_, store| {
            if store.is_idle(ttl_seconds) {
                // A request still holding this store must not act on it.
                store.expire();
                false
            } else {
                true
            }
        });
        before.saturating_sub(self.sessions.len())
    }
}

/// Periodically prunes idle sessions.
pub fn spawn_session_sweeper(
    registry: Arc<SessionRegistry>,
    every: Duration,
    ttl: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let pruned = registry.prune_idle(ttl);
            if pruned > 0 {
                info!("Pruned {pruned} idle sessions ({} active)", registry.len());
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, UserId};

    #[test]
    fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        let (a, store_a, new_a) = registry.get_or_create(None);
        let (b, store_b, _) = registry.get_or_create(None);
        assert!(new_a);
        assert_ne!(a, b);

        store_a.login("ta".into(), UserId::Int(1), Role::Admin).unwrap();
        assert_eq!(store_b.get().role(), Role::Guest);

        let (again, store_again, new_again) = registry.get_or_create(Some(a));
        assert_eq!(again, a);
        assert!(!new_again);
        assert_eq!(store_again.get().role(), Role::Admin);
    }

    #[test]
    fn test_unknown_id_gets_fresh_session() {
        let registry = SessionRegistry::new();
        let stale = Uuid::new_v4();
        let (id, _, created) = registry.get_or_create(Some(stale));
        assert!(created);
        assert_ne!(id, stale);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_prune_idle() {
        let registry = SessionRegistry::new();
        registry.get_or_create(None);
        registry.get_or_create(None);
        assert_eq!(registry.prune_idle(Duration::from_secs(3600)), 0);
        assert_eq!(registry.len(), 2);

        let (_, held, _) = registry.get_or_create(None);
        let ticket = held.begin_action();
        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(registry.prune_idle(Duration::ZERO), 3);
        assert_eq!(registry.len(), 0);
        assert!(!held.is_current(ticket));
    }
}
