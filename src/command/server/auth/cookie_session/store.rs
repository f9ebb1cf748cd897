use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::command::server::auth::Error;

/// Live sessions, keyed by session id.
///
/// Expired entries are dropped lazily: by `check` when it meets one, and by the sweep
/// that runs on every insert.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // every operation leaves the map consistent, so a poisoned lock is still usable
    fn sessions(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a new session and evicts every session expired at `now`.
    pub fn insert(&self, id: String, expires_at: DateTime<Utc>, now: DateTime<Utc>) {
        let mut sessions = self.sessions();
        sessions.insert(id, expires_at);
        sessions.retain(|_, expires_at| now <= *expires_at);
    }

    pub fn check(&self, id: &str, now: DateTime<Utc>) -> Result<(), Error> {
        let mut sessions = self.sessions();

        match sessions.get(id) {
            None => Err(Error::Unauthorized),
            Some(expires_at) if now > *expires_at => {
                sessions.remove(id);
                Err(Error::SessionExpired)
            }
            Some(_) => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_check_unknown_session() {
        let store = SessionStore::new();
        assert_eq!(store.check("nope", Utc::now()), Err(Error::Unauthorized));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let store = SessionStore::new();
        let now = Utc::now();
        let expires_at = now + Duration::hours(48);
        store.insert("abc".to_string(), expires_at, now);

        assert_eq!(store.check("abc", expires_at), Ok(()));
        assert_eq!(
            store.check("abc", expires_at + Duration::milliseconds(1)),
            Err(Error::SessionExpired)
        );
    }

    #[test]
    fn test_expired_session_is_removed_on_check() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.insert("abc".to_string(), now + Duration::seconds(1), now);

        let later = now + Duration::seconds(2);
        assert_eq!(store.check("abc", later), Err(Error::SessionExpired));
        assert_eq!(store.check("abc", later), Err(Error::Unauthorized));
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_sweeps_expired_sessions() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.insert("old-1".to_string(), now + Duration::seconds(1), now);
        store.insert("old-2".to_string(), now + Duration::seconds(5), now);
        store.insert("live".to_string(), now + Duration::hours(1), now);
        assert_eq!(store.len(), 3);

        let later = now + Duration::seconds(10);
        store.insert("new".to_string(), later + Duration::hours(48), later);

        assert_eq!(store.len(), 2);
        assert_eq!(store.check("live", later), Ok(()));
        assert_eq!(store.check("new", later), Ok(()));
        assert_eq!(store.check("old-1", later), Err(Error::Unauthorized));
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.insert("abc".to_string(), now + Duration::hours(1), now);

        let result = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = store.sessions();
                    panic!("poison the session lock");
                })
                .join()
        });
        assert!(result.is_err());

        assert_eq!(store.check("abc", now), Ok(()));
    }
}
