use std::time::Duration;

use moka::sync::Cache;
use uuid::Uuid;

pub const DEFAULT_PKCE_TTL: Duration = Duration::from_secs(10 * 60);

const MAX_PENDING_AUTHORIZATIONS: u64 = 1000;

/// Short-lived store of PKCE verifiers keyed by authorization session id.
/// Entries expire a fixed time after insertion whether or not they were read;
/// a successful `take` consumes the verifier so a code can be exchanged at
/// most once per session.
#[derive(Clone)]
pub struct PkceCache {
    inner: Cache<Uuid, String>,
}

impl PkceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(MAX_PENDING_AUTHORIZATIONS)
                .build(),
        }
    }

    pub fn insert(&self, session_id: Uuid, verifier: String) {
        self.inner.insert(session_id, verifier);
    }

    pub fn get(&self, session_id: &Uuid) -> Option<String> {
        self.inner.get(session_id)
    }

    pub fn take(&self, session_id: &Uuid) -> Option<String> {
        self.inner.remove(session_id)
    }
}

impl Default for PkceCache {
    fn default() -> Self {
        Self::new(DEFAULT_PKCE_TTL)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_take_consumes_verifier() {
        let cache = PkceCache::default();
        let id = Uuid::new_v4();

        cache.insert(id, "verifier".to_string());

        assert_eq!(cache.take(&id), Some("verifier".to_string()));
        assert_eq!(cache.take(&id), None);
    }

    #[test]
    fn test_unknown_session_is_absent() {
        let cache = PkceCache::default();

        assert_eq!(cache.get(&Uuid::new_v4()), None);
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = PkceCache::new(Duration::from_millis(50));
        let id = Uuid::new_v4();

        cache.insert(id, "verifier".to_string());
        assert!(cache.get(&id).is_some());

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.take(&id), None);
    }
}
