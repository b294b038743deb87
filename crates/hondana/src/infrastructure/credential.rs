use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use hondana_tracker::{CredentialSink, OAuthData};
use serde::{Deserialize, Serialize};

use crate::domain::entities::tracker::TrackerType;

/// On-disk shape of the persisted tracker credentials.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct TokenFile {
    myanimelist: Option<OAuthData>,
    anilist: Option<OAuthData>,
}

/// File-backed settings store for tracker credentials. Read once at startup,
/// written through on every login or refresh.
pub struct TokenFileStore {
    path: PathBuf,
    tokens: Mutex<TokenFile>,
}

impl TokenFileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = PathBuf::new().join(path);

        let tokens = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(tokens) => tokens,
                Err(e) => {
                    warn!("failed to parse token file {path:?}: {e}");
                    TokenFile::default()
                }
            },
            Err(_) => TokenFile::default(),
        };

        Self {
            path,
            tokens: Mutex::new(tokens),
        }
    }

    pub fn get(&self, tracker: TrackerType) -> Option<OAuthData> {
        let tokens = self.tokens.lock().ok()?;
        match tracker {
            TrackerType::MyAnimeList => tokens.myanimelist.clone(),
            TrackerType::AniList => tokens.anilist.clone(),
        }
    }

    pub fn set(&self, tracker: TrackerType, data: OAuthData) -> Result<(), anyhow::Error> {
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| anyhow!("token store poisoned"))?;

        match tracker {
            TrackerType::MyAnimeList => tokens.myanimelist = Some(data),
            TrackerType::AniList => tokens.anilist = Some(data),
        }

        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&*tokens)?)?;

        Ok(())
    }

    /// Write-through sink for one tracker's credential store.
    pub fn sink(self: &Arc<Self>, tracker: TrackerType) -> TokenFileSink {
        TokenFileSink {
            store: self.clone(),
            tracker,
        }
    }
}

pub struct TokenFileSink {
    store: Arc<TokenFileStore>,
    tracker: TrackerType,
}

impl CredentialSink for TokenFileSink {
    fn persist(&self, data: &OAuthData) -> Result<(), anyhow::Error> {
        self.store.set(self.tracker, data.clone())
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};

    use super::*;

    fn data(access_token: &str) -> OAuthData {
        OAuthData {
            access_token: access_token.to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hondana-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_round_trip() {
        let path = temp_path("round-trip");
        let _ = std::fs::remove_file(&path);

        let store = Arc::new(TokenFileStore::open(&path));
        assert!(store.get(TrackerType::MyAnimeList).is_none());

        store.sink(TrackerType::MyAnimeList).persist(&data("mal")).unwrap();
        store.sink(TrackerType::AniList).persist(&data("anilist")).unwrap();

        let reopened = TokenFileStore::open(&path);
        assert_eq!(
            reopened.get(TrackerType::MyAnimeList).unwrap().access_token,
            "mal"
        );
        assert_eq!(
            reopened.get(TrackerType::AniList).unwrap().access_token,
            "anilist"
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "not json").unwrap();

        let store = TokenFileStore::open(&path);

        assert!(store.get(TrackerType::MyAnimeList).is_none());
        assert!(store.get(TrackerType::AniList).is_none());

        let _ = std::fs::remove_file(&path);
    }
}
