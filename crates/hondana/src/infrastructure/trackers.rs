use std::collections::HashMap;
use std::sync::Arc;

use hondana_tracker::{AniList, MyAnimeList, Tracker};

use crate::domain::entities::tracker::TrackerType;

/// Lookup table from tracker identity to the configured OAuth client.
/// Trackers without credentials in the config simply have no entry.
pub struct TrackerRegistry {
    mal: Option<Arc<MyAnimeList>>,
    anilist: Option<Arc<AniList>>,
    clients: HashMap<TrackerType, Arc<dyn Tracker>>,
}

impl TrackerRegistry {
    pub fn new(mal: Option<Arc<MyAnimeList>>, anilist: Option<Arc<AniList>>) -> Self {
        let mut clients: HashMap<TrackerType, Arc<dyn Tracker>> = HashMap::new();
        if let Some(mal) = &mal {
            clients.insert(TrackerType::MyAnimeList, mal.clone() as Arc<dyn Tracker>);
        }
        if let Some(anilist) = &anilist {
            clients.insert(TrackerType::AniList, anilist.clone() as Arc<dyn Tracker>);
        }

        Self {
            mal,
            anilist,
            clients,
        }
    }

    pub fn get(&self, tracker: TrackerType) -> Option<&Arc<dyn Tracker>> {
        self.clients.get(&tracker)
    }

    pub fn by_id(&self, tracker_id: i64) -> Option<&Arc<dyn Tracker>> {
        TrackerType::from_id(tracker_id).and_then(|tracker| self.get(tracker))
    }

    pub fn myanimelist(&self) -> Option<&Arc<MyAnimeList>> {
        self.mal.as_ref()
    }

    pub fn anilist(&self) -> Option<&Arc<AniList>> {
        self.anilist.as_ref()
    }

    /// Eagerly refresh expired persisted credentials before serving.
    pub async fn init(&self) {
        for client in self.clients.values() {
            client.init().await;
        }
    }
}

#[cfg(test)]
mod test {
    use hondana_tracker::credential::DiscardCredentials;
    use hondana_tracker::{CredentialStore, myanimelist};

    use super::*;

    fn registry() -> TrackerRegistry {
        let mal_store = Arc::new(CredentialStore::new(None, Box::new(DiscardCredentials)));
        let mal = MyAnimeList::new(
            "http://localhost:8080",
            "id".to_string(),
            "".to_string(),
            mal_store,
        )
        .unwrap();

        TrackerRegistry::new(Some(Arc::new(mal)), None)
    }

    #[test]
    fn test_lookup_by_id() {
        let registry = registry();

        assert_eq!(registry.by_id(1).unwrap().name(), myanimelist::NAME);
        assert!(registry.by_id(2).is_none());
        assert!(registry.by_id(99).is_none());
    }

    #[test]
    fn test_unconfigured_tracker_is_absent() {
        let registry = registry();

        assert!(registry.get(TrackerType::AniList).is_none());
        assert!(registry.anilist().is_none());
        assert!(registry.myanimelist().is_some());
    }
}
