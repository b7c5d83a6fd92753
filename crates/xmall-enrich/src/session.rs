//! In-memory, TTL-bounded store for scrape sessions.
//!
//! Entries are keyed by random UUIDs and expire after sitting untouched for
//! longer than the configured TTL. Reads refresh the timestamp.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;
use xmall_core::AppConfig;

#[derive(Debug)]
struct Slot<T> {
    value: T,
    touched_at: Instant,
}

/// Thread-safe session map. Share it behind an `Arc`.
#[derive(Debug)]
pub struct SessionStore<T> {
    ttl: Duration,
    slots: Mutex<HashMap<Uuid, Slot<T>>>,
}

impl<T> SessionStore<T> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Store whose TTL is `session_ttl_secs`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Duration::from_secs(config.session_ttl_secs))
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Slot<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, slot: &Slot<T>, now: Instant) -> bool {
        now.duration_since(slot.touched_at) >= self.ttl
    }

    /// Stores `value` under a fresh id.
    pub fn insert(&self, value: T) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            Slot {
                value,
                touched_at: Instant::now(),
            },
        );
        tracing::debug!(session_id = %id, "session created");
        id
    }

    /// Removes and returns the session, expired or not.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.lock().remove(id).map(|slot| slot.value)
    }

    /// Drops every expired session and returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.lock();
        let before = slots.len();
        slots.retain(|_, slot| !self.is_expired(slot, now));
        let removed = before - slots.len();
        if removed > 0 {
            tracing::debug!(removed, "expired sessions swept");
        }
        removed
    }

    /// Number of stored sessions, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<T: Clone> SessionStore<T> {
    /// Returns a copy of the session and refreshes its timestamp.
    ///
    /// An expired session is removed and reported as missing.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        let now = Instant::now();
        let mut slots = self.lock();
        let expired = self.is_expired(slots.get(id)?, now);
        if expired {
            slots.remove(id);
            tracing::debug!(session_id = %id, "session expired");
            return None;
        }
        let slot = slots.get_mut(id)?;
        slot.touched_at = now;
        Some(slot.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_returns_value() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.insert(vec!["https://example.com/p/1".to_string()]);
        assert_eq!(
            store.get(&id),
            Some(vec!["https://example.com/p/1".to_string()])
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.insert(1);
        let b = store.insert(2);
        assert_ne!(a, b);
        assert_eq!(store.get(&a), Some(1));
        assert_eq!(store.get(&b), Some(2));
    }

    #[test]
    fn unknown_id_is_missing() {
        let store: SessionStore<u8> = SessionStore::new(Duration::from_secs(60));
        assert_eq!(store.get(&Uuid::new_v4()), None);
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.insert("state");
        assert_eq!(store.get(&id), None);
        assert!(store.is_empty(), "expired entry is dropped on read");
    }

    #[test]
    fn sweep_removes_only_expired() {
        let expired = SessionStore::new(Duration::ZERO);
        expired.insert(1);
        expired.insert(2);
        assert_eq!(expired.sweep_expired(), 2);
        assert!(expired.is_empty());

        let live = SessionStore::new(Duration::from_secs(3600));
        live.insert(1);
        assert_eq!(live.sweep_expired(), 0);
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn remove_returns_value_once() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.insert("x");
        assert_eq!(store.remove(&id), Some("x"));
        assert_eq!(store.remove(&id), None);
    }
}
