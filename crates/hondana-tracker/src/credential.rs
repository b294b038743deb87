use std::sync::RwLock;

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Token};

/// A tracker credential as persisted to the settings store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl OAuthData {
    pub fn from_token(token: Token) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Durable side of the credential store. Implementations write the credential
/// to settings storage; the in-memory copy is updated only after the write
/// succeeds.
pub trait CredentialSink: Send + Sync {
    fn persist(&self, data: &OAuthData) -> Result<(), anyhow::Error>;
}

/// No-op sink for trackers without durable storage.
pub struct DiscardCredentials;

impl CredentialSink for DiscardCredentials {
    fn persist(&self, _data: &OAuthData) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

/// Holder of the one live credential per tracker. All writers go through
/// `swap`, so concurrent logins or refreshes both succeed and the last swap
/// wins; readers clone the credential out and never observe a partial write.
pub struct CredentialStore {
    sink: Box<dyn CredentialSink>,
    inner: RwLock<Option<OAuthData>>,
}

impl CredentialStore {
    pub fn new(initial: Option<OAuthData>, sink: Box<dyn CredentialSink>) -> Self {
        Self {
            sink,
            inner: RwLock::new(initial),
        }
    }

    pub fn current(&self) -> Option<OAuthData> {
        self.inner.read().ok().and_then(|data| data.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .map(|data| data.is_some())
            .unwrap_or(false)
    }

    pub fn swap(&self, data: OAuthData) -> Result<(), Error> {
        self.sink.persist(&data).map_err(Error::Other)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| anyhow!("credential store poisoned"))?;
        *inner = Some(data);

        Ok(())
    }

    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            *inner = None;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn data(access_token: &str, expires_at: DateTime<Utc>) -> OAuthData {
        OAuthData {
            access_token: access_token.to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_swap_replaces_credential() {
        let store = CredentialStore::new(None, Box::new(DiscardCredentials));
        assert!(!store.is_authenticated());

        store
            .swap(data("first", Utc::now() + Duration::hours(1)))
            .unwrap();
        store
            .swap(data("second", Utc::now() + Duration::hours(1)))
            .unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.current().unwrap().access_token, "second");
    }

    #[test]
    fn test_clear_leaves_unauthenticated() {
        let store = CredentialStore::new(
            Some(data("token", Utc::now() + Duration::hours(1))),
            Box::new(DiscardCredentials),
        );

        store.clear();

        assert!(!store.is_authenticated());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_expiry() {
        assert!(data("token", Utc::now() - Duration::seconds(1)).is_expired());
        assert!(!data("token", Utc::now() + Duration::hours(1)).is_expired());
    }

    #[test]
    fn test_from_token_computes_expiry() {
        let token = Token {
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        };

        let data = OAuthData::from_token(token);

        assert!(!data.is_expired());
        assert!(data.expires_at > Utc::now() + Duration::minutes(59));
    }
}
