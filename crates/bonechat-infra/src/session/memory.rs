//! In-memory session backend keyed by a cookie-carried UUID.
//!
//! Each request loads a private copy of its session bag into a
//! [`SessionHandle`], mutates it, and saves the whole bag back. Saves are
//! last-write-wins: two overlapping requests on the same session each start
//! from the same snapshot and the later save replaces the earlier one.
//! Sessions idle for longer than the TTL are dropped on load and by the
//! background purge loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use bonechat_core::session::store::{MapSession, SessionStore};

struct SessionRecord {
    data: HashMap<String, Value>,
    last_accessed: Instant,
}

impl SessionRecord {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_accessed.elapsed() >= ttl
    }
}

/// Process-local session storage.
pub struct InMemorySessionBackend {
    records: DashMap<Uuid, SessionRecord>,
    ttl: Duration,
}

impl InMemorySessionBackend {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored sessions, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load the session named by a cookie value.
    ///
    /// A missing, malformed, unknown or expired id yields a fresh session
    /// with a new v7 id. Loading a live session refreshes its idle timer.
    pub fn load(&self, cookie_value: Option<&str>) -> SessionHandle {
        let Some(id) = cookie_value.and_then(|v| Uuid::parse_str(v.trim()).ok()) else {
            return SessionHandle::fresh();
        };

        if let Some(mut record) = self.records.get_mut(&id) {
            if !record.is_expired(self.ttl) {
                record.last_accessed = Instant::now();
                return SessionHandle {
                    id,
                    is_new: false,
                    inner: MapSession::from_data(record.data.clone()),
                };
            }
        }

        let ttl = self.ttl;
        if self.records.remove_if(&id, |_, r| r.is_expired(ttl)).is_some() {
            debug!(session_id = %id, "Session expired");
        }
        SessionHandle::fresh()
    }

    /// Persist a handle if it was modified. A clean session, new or not,
    /// leaves the map untouched.
    ///
    /// Returns whether anything was written.
    pub fn save(&self, handle: SessionHandle) -> bool {
        if !handle.is_dirty() {
            return false;
        }
        self.records.insert(
            handle.id,
            SessionRecord {
                data: handle.inner.into_data(),
                last_accessed: Instant::now(),
            },
        );
        true
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut purged = 0;
        self.records.retain(|_, record| {
            let keep = !record.is_expired(ttl);
            if !keep {
                purged += 1;
            }
            keep
        });
        purged
    }
}

/// A request's private copy of one session bag.
#[derive(Debug)]
pub struct SessionHandle {
    id: Uuid,
    is_new: bool,
    inner: MapSession,
}

impl SessionHandle {
    fn fresh() -> Self {
        Self {
            id: Uuid::now_v7(),
            is_new: true,
            inner: MapSession::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the id was minted for this request (the client needs a cookie).
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }
}

impl SessionStore for SessionHandle {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.inner.set(key, value);
    }

    fn mark_dirty(&mut self) {
        self.inner.mark_dirty();
    }
}

/// Periodically purge expired sessions until `cancel` fires.
pub async fn run_purge_loop(
    backend: Arc<InMemorySessionBackend>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Session purge loop stopped");
                break;
            }
            _ = ticker.tick() => {
                let purged = backend.purge_expired();
                if purged > 0 {
                    info!(purged, remaining = backend.len(), "Purged expired sessions");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonechat_core::chat::turn_store::TurnStore;
    use bonechat_types::chat::{Role, Turn};

    const HOUR: Duration = Duration::from_secs(3600);

    fn saved_session(backend: &InMemorySessionBackend, store: &TurnStore) -> Uuid {
        let mut handle = backend.load(None);
        store.append(&mut handle, Role::User, "Hello");
        store.append(&mut handle, Role::Model, "Hi");
        let id = handle.id();
        assert!(backend.save(handle));
        id
    }

    #[test]
    fn test_load_without_cookie_is_new() {
        let backend = InMemorySessionBackend::new(HOUR);
        let handle = backend.load(None);
        assert!(handle.is_new());
        assert!(!handle.is_dirty());
        assert_eq!(handle.id().get_version_num(), 7);
    }

    #[test]
    fn test_load_malformed_or_unknown_cookie_is_new() {
        let backend = InMemorySessionBackend::new(HOUR);
        assert!(backend.load(Some("not-a-uuid")).is_new());

        let unknown = Uuid::now_v7().to_string();
        let handle = backend.load(Some(&unknown));
        assert!(handle.is_new());
        assert_ne!(handle.id().to_string(), unknown);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let backend = InMemorySessionBackend::new(HOUR);
        let store = TurnStore::default();
        let id = saved_session(&backend, &store);

        let handle = backend.load(Some(&id.to_string()));
        assert!(!handle.is_new());
        assert_eq!(handle.id(), id);
        assert_eq!(store.get(&handle), vec![Turn::user("Hello"), Turn::model("Hi")]);
    }

    #[test]
    fn test_clean_existing_session_is_not_written() {
        let backend = InMemorySessionBackend::new(HOUR);
        let id = saved_session(&backend, &TurnStore::default());

        let handle = backend.load(Some(&id.to_string()));
        assert!(!backend.save(handle));
    }

    #[test]
    fn test_clean_new_sessions_are_not_stored() {
        let backend = InMemorySessionBackend::new(HOUR);
        for _ in 0..100 {
            let handle = backend.load(None);
            assert!(!backend.save(handle));
        }
        assert!(backend.is_empty());
    }

    #[test]
    fn test_reset_new_session_is_stored() {
        let backend = InMemorySessionBackend::new(HOUR);
        let mut handle = backend.load(None);
        TurnStore::default().reset(&mut handle);
        let id = handle.id();
        assert!(backend.save(handle));
        assert!(!backend.load(Some(&id.to_string())).is_new());
    }

    #[test]
    fn test_expired_session_is_replaced() {
        let backend = InMemorySessionBackend::new(Duration::ZERO);
        let id = saved_session(&backend, &TurnStore::default());
        assert_eq!(backend.len(), 1);

        let handle = backend.load(Some(&id.to_string()));
        assert!(handle.is_new());
        assert_ne!(handle.id(), id);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let backend = InMemorySessionBackend::new(Duration::ZERO);
        let store = TurnStore::default();
        saved_session(&backend, &store);
        saved_session(&backend, &store);

        assert_eq!(backend.purge_expired(), 2);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_purge_keeps_live_sessions() {
        let backend = InMemorySessionBackend::new(HOUR);
        saved_session(&backend, &TurnStore::default());
        assert_eq!(backend.purge_expired(), 0);
        assert_eq!(backend.len(), 1);
    }

    /// Overlapping requests on one session lose an update: both read the
    /// same snapshot and the later save wins.
    #[test]
    fn test_overlapping_requests_last_write_wins() {
        let backend = InMemorySessionBackend::new(HOUR);
        let store = TurnStore::default();
        let id = saved_session(&backend, &store).to_string();

        let mut first = backend.load(Some(&id));
        let mut second = backend.load(Some(&id));
        store.append(&mut first, Role::User, "from first");
        store.append(&mut second, Role::User, "from second");
        backend.save(first);
        backend.save(second);

        let log = store.get(&backend.load(Some(&id)));
        assert_eq!(log.len(), 3);
        assert_eq!(log[2], Turn::user("from second"));
        assert!(!log.contains(&Turn::user("from first")));
    }

    #[tokio::test]
    async fn test_purge_loop_stops_on_cancel() {
        let backend = Arc::new(InMemorySessionBackend::new(Duration::ZERO));
        saved_session(&backend, &TurnStore::default());

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_purge_loop(
            Arc::clone(&backend),
            Duration::from_secs(60),
            cancel.clone(),
        ));

        // First tick fires immediately.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(backend.is_empty());

        cancel.cancel();
        task.await.unwrap();
    }
}
